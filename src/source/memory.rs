//! In-memory collaborators.
//!
//! [`InMemoryCore`] stands in for the messaging core and [`MemoryPreferences`]
//! for the preference store. The scenario driver feeds them from script
//! events; tests set them up directly.

use crate::engine::{GeometryKind, MessagingCore, PreferenceStore};
use crate::model::{
    AccountId, BuddyIcon, ConversationKey, GroupId, HistoryEntry, Rect, ReplayIoError,
};
use std::collections::{HashMap, HashSet};

/// Messaging core backed by maps.
///
/// Accounts are connected unless marked otherwise.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCore {
    histories: HashMap<ConversationKey, Vec<HistoryEntry>>,
    offline: HashSet<AccountId>,
    groups: HashMap<ConversationKey, GroupId>,
    icons: HashMap<ConversationKey, BuddyIcon>,
}

impl InMemoryCore {
    /// An empty core.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored backlog of a conversation.
    pub fn set_history(&mut self, conversation: ConversationKey, entries: Vec<HistoryEntry>) {
        self.histories.insert(conversation, entries);
    }

    /// Append one readable record to a conversation's backlog.
    pub fn push_history(&mut self, conversation: ConversationKey, message: crate::model::Message) {
        self.histories.entry(conversation).or_default().push(Ok(message));
    }

    /// Append an unreadable record to a conversation's backlog.
    pub fn push_unreadable(&mut self, conversation: ConversationKey, reason: impl Into<String>) {
        let err = ReplayIoError::new(&conversation, reason);
        self.histories.entry(conversation).or_default().push(Err(err));
    }

    /// Mark an account online or offline.
    pub fn set_connected(&mut self, account: AccountId, connected: bool) {
        if connected {
            self.offline.remove(&account);
        } else {
            self.offline.insert(account);
        }
    }

    /// Put a conversation's buddy in a roster group, or take it out.
    pub fn set_roster_group(&mut self, conversation: ConversationKey, group: Option<GroupId>) {
        match group {
            Some(group) => {
                self.groups.insert(conversation, group);
            }
            None => {
                self.groups.remove(&conversation);
            }
        }
    }

    /// Set or remove a conversation's buddy icon.
    pub fn set_icon(&mut self, conversation: ConversationKey, icon: Option<BuddyIcon>) {
        match icon {
            Some(icon) => {
                self.icons.insert(conversation, icon);
            }
            None => {
                self.icons.remove(&conversation);
            }
        }
    }
}

impl MessagingCore for InMemoryCore {
    fn message_history(&self, conversation: &ConversationKey) -> Vec<HistoryEntry> {
        self.histories.get(conversation).cloned().unwrap_or_default()
    }

    fn is_account_connected(&self, account: &AccountId) -> bool {
        !self.offline.contains(account)
    }

    fn roster_group(&self, conversation: &ConversationKey) -> Option<GroupId> {
        self.groups.get(conversation).cloned()
    }

    fn buddy_icon(&self, conversation: &ConversationKey) -> Option<BuddyIcon> {
        self.icons.get(conversation).cloned()
    }
}

/// Preference store backed by a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    geometry: HashMap<GeometryKind, Rect>,
}

impl MemoryPreferences {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn window_geometry(&self, kind: GeometryKind) -> Option<Rect> {
        self.geometry.get(&kind).copied()
    }

    fn set_window_geometry(&mut self, kind: GeometryKind, geometry: Rect) {
        self.geometry.insert(kind, geometry);
    }
}
