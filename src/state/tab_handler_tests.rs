//! Tests for tab navigation handler.
//!
//! Tests verify that tab actions resolve to the right command:
//! - Next/Prev move with wrapping
//! - Select(n) selects by 1-indexed position
//! - NextUnseen skips clean tabs, falling back to Next
//! - All actions handle edge cases (unknown window, out of bounds)

use super::*;
use crate::model::{AccountId, Conversation, ConversationName, Rect};

// ===== Test Helpers =====

fn window_with_tabs(count: usize) -> (WindowRegistry, WindowId, Vec<TabId>) {
    let mut reg = WindowRegistry::new();
    let w = reg.create_window(Rect::new(0, 0, 300, 200));
    let tabs = (0..count)
        .map(|i| {
            let conv = Conversation::direct(
                AccountId::new("me").expect("valid account"),
                ConversationName::new(format!("buddy-{i}")).expect("valid name"),
            );
            reg.open_tab(w, conv, usize::MAX).expect("tab opened")
        })
        .collect();
    (reg, w, tabs)
}

// ===== Next / Prev =====

#[test]
fn next_tab_moves_to_next_tab() {
    let (reg, w, tabs) = window_with_tabs(3);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::Next),
        Some(TabCommand::Activate(tabs[1]))
    );
}

#[test]
fn next_tab_wraps_to_first() {
    let (mut reg, w, tabs) = window_with_tabs(3);
    reg.set_active_tab(tabs[2]);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::Next),
        Some(TabCommand::Activate(tabs[0]))
    );
}

#[test]
fn prev_tab_wraps_to_last() {
    let (reg, w, tabs) = window_with_tabs(3);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::Prev),
        Some(TabCommand::Activate(tabs[2]))
    );
}

// ===== Select =====

#[test]
fn select_tab_is_one_indexed() {
    let (reg, w, tabs) = window_with_tabs(3);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::Select(2)),
        Some(TabCommand::Activate(tabs[1]))
    );
}

#[test]
fn select_tab_out_of_bounds_does_nothing() {
    let (reg, w, _) = window_with_tabs(3);
    assert_eq!(resolve_tab_action(&reg, w, TabAction::Select(0)), None);
    assert_eq!(resolve_tab_action(&reg, w, TabAction::Select(4)), None);
}

// ===== NextUnseen =====

#[test]
fn next_unseen_skips_clean_tabs() {
    let (mut reg, w, tabs) = window_with_tabs(4);
    if let Some(tab) = reg.tab_mut(tabs[3]) {
        tab.unseen.mark(UnseenState::Text, false);
    }
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::NextUnseen),
        Some(TabCommand::Activate(tabs[3]))
    );
}

#[test]
fn next_unseen_with_nothing_unseen_falls_back_to_next() {
    let (reg, w, tabs) = window_with_tabs(2);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::NextUnseen),
        Some(TabCommand::Activate(tabs[1]))
    );
}

// ===== Close and edge cases =====

#[test]
fn close_targets_active_tab() {
    let (mut reg, w, tabs) = window_with_tabs(2);
    reg.set_active_tab(tabs[1]);
    assert_eq!(
        resolve_tab_action(&reg, w, TabAction::Close),
        Some(TabCommand::Close(tabs[1]))
    );
}

#[test]
fn empty_or_unknown_window_does_nothing() {
    let (reg, _, _) = window_with_tabs(1);
    let hidden = reg.hidden_window();
    assert_eq!(resolve_tab_action(&reg, hidden, TabAction::Next), None);
}

#[test]
fn action_names_parse_and_display() {
    for name in ["next", "prev", "next_unseen", "close", "select:3"] {
        let action: TabAction = name.parse().expect("known action");
        assert_eq!(action.to_string(), name);
    }
    assert!("select:x".parse::<TabAction>().is_err());
    assert!("jump".parse::<TabAction>().is_err());
}
