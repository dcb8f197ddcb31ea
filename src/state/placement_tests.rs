//! Tests for placement policies.

use super::*;
use crate::model::{Conversation, ConversationName, Rect};

// ===== Test Helpers =====

fn account(s: &str) -> AccountId {
    AccountId::new(s).expect("valid account")
}

fn direct(acct: &str, name: &str) -> Conversation {
    Conversation::direct(account(acct), ConversationName::new(name).expect("valid name"))
}

fn room(acct: &str, name: &str) -> Conversation {
    Conversation::group(account(acct), ConversationName::new(name).expect("valid name"), true)
}

fn candidate(kind: ConversationKind, acct: &str, group: Option<&str>) -> PlacementCandidate {
    PlacementCandidate {
        kind,
        account: account(acct),
        group: group.map(|g| GroupId::new(g).expect("valid group")),
    }
}

fn window_with(reg: &mut WindowRegistry, conversations: Vec<Conversation>) -> WindowId {
    let w = reg.create_window(Rect::new(0, 0, 300, 200));
    for c in conversations {
        reg.open_tab(w, c, usize::MAX).expect("tab opened");
    }
    w
}

// ===== Individual policies =====

#[test]
fn last_window_with_no_windows_asks_for_new() {
    let reg = WindowRegistry::new();
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(LastWindow.place(&c, &reg), Placement::NewWindow);
}

#[test]
fn last_window_picks_newest_shown_window() {
    let mut reg = WindowRegistry::new();
    window_with(&mut reg, vec![direct("me", "a")]);
    let w2 = window_with(&mut reg, vec![direct("me", "b")]);
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(LastWindow.place(&c, &reg), Placement::Existing(w2));
}

#[test]
fn last_window_ignores_hidden_window() {
    let mut reg = WindowRegistry::new();
    let hidden = reg.hidden_window();
    reg.open_tab(hidden, direct("me", "parked"), 0);
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(LastWindow.place(&c, &reg), Placement::NewWindow);
}

#[test]
fn same_kind_separates_direct_and_group() {
    let mut reg = WindowRegistry::new();
    let ims = window_with(&mut reg, vec![direct("me", "a")]);
    let chats = window_with(&mut reg, vec![room("me", "#rust")]);

    let im = candidate(ConversationKind::Direct, "me", None);
    let chat = candidate(ConversationKind::Group, "me", None);
    assert_eq!(LastWindowOfSameKind.place(&im, &reg), Placement::Existing(ims));
    assert_eq!(LastWindowOfSameKind.place(&chat, &reg), Placement::Existing(chats));
}

#[test]
fn same_kind_skips_mixed_windows() {
    let mut reg = WindowRegistry::new();
    window_with(&mut reg, vec![direct("me", "a"), room("me", "#rust")]);
    let im = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(LastWindowOfSameKind.place(&im, &reg), Placement::NewWindow);
}

#[test]
fn always_new_ignores_existing_windows() {
    let mut reg = WindowRegistry::new();
    window_with(&mut reg, vec![direct("me", "a")]);
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(AlwaysNewWindow.place(&c, &reg), Placement::NewWindow);
}

#[test]
fn by_group_matches_roster_group() {
    let mut reg = WindowRegistry::new();
    let w1 = window_with(&mut reg, vec![direct("me", "a")]);
    let w2 = window_with(&mut reg, vec![direct("me", "b")]);
    let b = reg.tab_for(direct("me", "b").key()).expect("bound");
    reg.tab_mut(b).expect("tab").group = Some(GroupId::new("Work").expect("valid group"));

    let work = candidate(ConversationKind::Direct, "me", Some("Work"));
    let family = candidate(ConversationKind::Direct, "me", Some("Family"));
    let none = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(ByGroup.place(&work, &reg), Placement::Existing(w2));
    assert_eq!(ByGroup.place(&family, &reg), Placement::NewWindow);
    assert_eq!(ByGroup.place(&none, &reg), Placement::NewWindow);
    assert_ne!(ByGroup.place(&work, &reg), Placement::Existing(w1));
}

#[test]
fn by_account_matches_first_window_on_account() {
    let mut reg = WindowRegistry::new();
    let work = window_with(&mut reg, vec![direct("work", "a")]);
    window_with(&mut reg, vec![direct("home", "b")]);
    window_with(&mut reg, vec![direct("work", "c")]);

    let c = candidate(ConversationKind::Direct, "work", None);
    assert_eq!(ByAccount.place(&c, &reg), Placement::Existing(work));
    let other = candidate(ConversationKind::Direct, "school", None);
    assert_eq!(ByAccount.place(&other, &reg), Placement::NewWindow);
}

#[test]
fn by_number_fills_last_window_up_to_limit() {
    let mut reg = WindowRegistry::new();
    let w = window_with(&mut reg, vec![direct("me", "a")]);
    let policy = ByNumber::new(2);
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(policy.place(&c, &reg), Placement::Existing(w));
    reg.open_tab(w, direct("me", "b"), usize::MAX);
    assert_eq!(policy.place(&c, &reg), Placement::NewWindow);
}

// ===== Registry =====

#[test]
fn defaults_register_every_policy() {
    let policies = PolicyRegistry::with_defaults(DEFAULT_CONVERSATIONS_PER_WINDOW);
    assert_eq!(
        policies.names(),
        vec!["account", "group", "im_chat", "last", "new", "number"]
    );
    assert_eq!(policies.active_name(), "last");
}

#[test]
fn unknown_policy_name_keeps_previous_selection() {
    let mut policies = PolicyRegistry::with_defaults(4);
    policies.set_active("new").expect("known policy");
    let err = policies.set_active("nonsense").expect_err("unknown policy");
    assert_eq!(err, EngineError::UnknownPlacementPolicy("nonsense".to_string()));
    assert_eq!(policies.active_name(), "new");
}

#[test]
fn registry_delegates_to_active_policy() {
    let mut reg = WindowRegistry::new();
    let w = window_with(&mut reg, vec![direct("me", "a")]);
    let mut policies = PolicyRegistry::with_defaults(4);
    let c = candidate(ConversationKind::Direct, "me", None);
    assert_eq!(policies.place(&c, &reg), Placement::Existing(w));
    policies.set_active("new").expect("known policy");
    assert_eq!(policies.place(&c, &reg), Placement::NewWindow);
}
