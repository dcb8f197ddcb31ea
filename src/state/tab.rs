//! A tab: one slot in a window's tab strip.
//!
//! A tab is bound to one or more conversations. Several direct conversations
//! with the same contact share a tab; a group conversation always has a tab to
//! itself. Exactly one bound conversation is active and shown.
//!
//! Tabs are owned by the [`WindowRegistry`](super::WindowRegistry); windows
//! refer to them by [`TabId`] and a tab records the [`WindowId`] it sits in.

use crate::model::{
    AccountId, BuddyIdentity, Conversation, ConversationKey, ConversationKind, GroupId, TabId,
    TypingState, UnseenTracker, WindowId,
};
use crate::scheduler::TaskId;
use crate::state::icon_animator::IconAnimator;
use crate::state::replay::HistoryReplay;
use crate::state::view::ConversationView;

/// One tab and its per-tab engine state.
#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    pub(crate) window: WindowId,
    conversations: Vec<Conversation>,
    active: usize,
    pub(crate) unseen: UnseenTracker,
    pub(crate) visible: bool,
    pub(crate) group: Option<GroupId>,
    pub(crate) view: ConversationView,
    pub(crate) replay: Option<HistoryReplay>,
    pub(crate) replay_task: Option<TaskId>,
    pub(crate) icon: Option<IconAnimator>,
    pub(crate) close_timer: Option<TaskId>,
}

impl Tab {
    pub(crate) fn new(id: TabId, window: WindowId, conversation: Conversation) -> Self {
        Self {
            id,
            window,
            conversations: vec![conversation],
            active: 0,
            unseen: UnseenTracker::new(),
            visible: false,
            group: None,
            view: ConversationView::new(),
            replay: None,
            replay_task: None,
            icon: None,
            close_timer: None,
        }
    }

    /// Handle of this tab.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Window this tab sits in.
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Kind shared by every bound conversation.
    pub fn kind(&self) -> ConversationKind {
        self.active_conversation().kind()
    }

    /// Account of the active conversation.
    pub fn account(&self) -> &AccountId {
        self.active_conversation().account()
    }

    /// Roster group of the tab's contact, if known.
    pub fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }

    /// All bound conversations, in binding order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The conversation currently shown.
    pub fn active_conversation(&self) -> &Conversation {
        // `conversations` is never empty and `active` is kept in range.
        &self.conversations[self.active.min(self.conversations.len() - 1)]
    }

    /// Key of the conversation currently shown.
    pub fn active_key(&self) -> &ConversationKey {
        self.active_conversation().key()
    }

    /// Label shown in the tab strip.
    pub fn title(&self) -> &str {
        self.active_conversation().title()
    }

    /// Typing indicator of the active conversation.
    pub fn typing(&self) -> TypingState {
        self.active_conversation().typing()
    }

    /// Unseen-activity tracker.
    pub fn unseen(&self) -> &UnseenTracker {
        &self.unseen
    }

    /// Whether the tab is the active tab of a shown window.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Display log of the tab.
    pub fn view(&self) -> &ConversationView {
        &self.view
    }

    /// Backlog replay in progress, if any.
    pub fn replay(&self) -> Option<&HistoryReplay> {
        self.replay.as_ref()
    }

    /// Buddy icon state, if the tab has an icon.
    pub fn icon(&self) -> Option<&IconAnimator> {
        self.icon.as_ref()
    }

    /// Whether a close timer is armed (the tab is parked).
    pub fn close_pending(&self) -> bool {
        self.close_timer.is_some()
    }

    /// Whether `key` is bound here.
    pub fn has(&self, key: &ConversationKey) -> bool {
        self.conversations.iter().any(|c| c.key() == key)
    }

    /// Merge identity of the tab, for direct tabs.
    pub fn identity(&self) -> Option<BuddyIdentity> {
        self.conversations.first().and_then(Conversation::buddy_identity)
    }

    /// Whether a new conversation should merge into this tab.
    pub fn accepts(&self, conversation: &Conversation) -> bool {
        match (self.identity(), conversation.buddy_identity()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    /// Whether closing should park the tab instead of destroying it.
    pub fn lingers_after_close(&self, close_immediately: bool) -> bool {
        match self.kind() {
            ConversationKind::Direct => !close_immediately,
            ConversationKind::Group => self.conversations.iter().all(Conversation::lingers_after_close),
        }
    }

    pub(crate) fn bind(&mut self, conversation: Conversation) {
        if let Some(existing) = self
            .conversations
            .iter_mut()
            .find(|c| c.key() == conversation.key())
        {
            *existing = conversation;
            return;
        }
        self.conversations.push(conversation);
    }

    /// Replace the descriptor of an already-bound conversation.
    pub(crate) fn update(&mut self, conversation: Conversation) -> bool {
        match self
            .conversations
            .iter_mut()
            .find(|c| c.key() == conversation.key())
        {
            Some(existing) => {
                *existing = conversation;
                true
            }
            None => false,
        }
    }

    /// Unbind `key`. The active conversation moves to the first remaining one
    /// if it was the one removed. Returns whether `key` was bound.
    pub(crate) fn unbind(&mut self, key: &ConversationKey) -> bool {
        let Some(index) = self.conversations.iter().position(|c| c.key() == key) else {
            return false;
        };
        self.conversations.remove(index);
        if index == self.active {
            self.active = 0;
        } else if index < self.active {
            self.active -= 1;
        }
        true
    }

    /// Whether every conversation has been unbound.
    pub(crate) fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Make `key` the shown conversation. Returns whether it is bound.
    pub(crate) fn set_active(&mut self, key: &ConversationKey) -> bool {
        match self.conversations.iter().position(|c| c.key() == key) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Whether the active index points at a bound conversation.
    pub(crate) fn active_in_range(&self) -> bool {
        self.active < self.conversations.len()
    }
}
