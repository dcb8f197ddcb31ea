//! Conversation descriptors as seen by the window engine.
//!
//! Conversations are owned by the messaging core; the engine only keeps a
//! descriptor copy per bound conversation and refreshes it on update
//! notifications. Direct vs Group behavior is carried by a tagged payload so
//! every decision point matches exhaustively.

use crate::model::identifiers::{AccountId, ContactId, ConversationName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a conversation is one-to-one or a multi-user room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// One-to-one instant messaging.
    Direct,
    /// Multi-user chat room.
    Group,
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationKind::Direct => f.write_str("direct"),
            ConversationKind::Group => f.write_str("group"),
        }
    }
}

/// Identity of a conversation: `(account, canonical_name, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    /// Owning account.
    pub account: AccountId,
    /// Remote buddy or room name.
    pub name: ConversationName,
    /// Direct or group.
    pub kind: ConversationKind,
}

impl ConversationKey {
    /// Build a key from its parts.
    pub fn new(account: AccountId, name: ConversationName, kind: ConversationKind) -> Self {
        Self {
            account,
            name,
            kind,
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.account, self.name)
    }
}

/// Kind-specific payload of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationInfo {
    /// One-to-one conversation.
    Direct {
        /// Roster contact the buddy belongs to, if any. Conversations sharing
        /// a contact collapse onto one tab.
        contact: Option<ContactId>,
    },
    /// Multi-user room.
    Group {
        /// Whether the room is a known, persisted room. Only persisted rooms
        /// linger in the hidden holding window after close.
        persistent: bool,
        /// Current room topic.
        topic: Option<String>,
    },
}

impl ConversationInfo {
    /// Kind tag of this payload.
    pub fn kind(&self) -> ConversationKind {
        match self {
            ConversationInfo::Direct { .. } => ConversationKind::Direct,
            ConversationInfo::Group { .. } => ConversationKind::Group,
        }
    }
}

/// Typing notification state of the remote party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingState {
    /// Nothing in progress.
    #[default]
    NotTyping,
    /// The remote party is actively typing.
    Typing,
    /// The remote party typed something and paused.
    Typed,
}

/// What changed about a conversation, as reported by the messaging core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Display title changed.
    Title,
    /// Buddy icon changed.
    Icon,
    /// Room topic changed.
    Topic,
    /// Menu sensitivity must be recomputed.
    MenuState,
    /// Logging was toggled.
    LoggingState,
    /// Protocol feature flags changed.
    Features,
    /// Remote typing state changed.
    Typing,
}

/// Identity used to merge direct conversations onto one tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuddyIdentity {
    /// Buddies grouped under the same roster contact.
    Contact(ContactId),
    /// A lone buddy: account plus normalized name.
    Buddy {
        /// Owning account.
        account: AccountId,
        /// Normalized buddy name.
        normalized: String,
    },
}

/// Engine-side descriptor of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    key: ConversationKey,
    title: String,
    info: ConversationInfo,
    logging: bool,
    typing: TypingState,
}

impl Conversation {
    /// Describe a direct conversation with `name` on `account`.
    pub fn direct(account: AccountId, name: ConversationName) -> Self {
        let title = name.as_str().to_string();
        Self {
            key: ConversationKey::new(account, name, ConversationKind::Direct),
            title,
            info: ConversationInfo::Direct { contact: None },
            logging: true,
            typing: TypingState::NotTyping,
        }
    }

    /// Describe a group conversation in room `name` on `account`.
    pub fn group(account: AccountId, name: ConversationName, persistent: bool) -> Self {
        let title = name.as_str().to_string();
        Self {
            key: ConversationKey::new(account, name, ConversationKind::Group),
            title,
            info: ConversationInfo::Group {
                persistent,
                topic: None,
            },
            logging: true,
            typing: TypingState::NotTyping,
        }
    }

    /// Attach a roster contact. No effect on group conversations.
    pub fn with_contact(mut self, contact: ContactId) -> Self {
        if let ConversationInfo::Direct { contact: slot } = &mut self.info {
            *slot = Some(contact);
        }
        self
    }

    /// Override the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the room topic. No effect on direct conversations.
    pub fn with_topic(mut self, new_topic: impl Into<String>) -> Self {
        if let ConversationInfo::Group { topic, .. } = &mut self.info {
            *topic = Some(new_topic.into());
        }
        self
    }

    /// Set whether the conversation is being logged.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Set the remote typing state.
    pub fn with_typing(mut self, typing: TypingState) -> Self {
        self.typing = typing;
        self
    }

    /// Identity of the conversation.
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// Direct or group.
    pub fn kind(&self) -> ConversationKind {
        self.info.kind()
    }

    /// Owning account.
    pub fn account(&self) -> &AccountId {
        &self.key.account
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Kind-specific payload.
    pub fn info(&self) -> &ConversationInfo {
        &self.info
    }

    /// Whether messages are being logged.
    pub fn logging(&self) -> bool {
        self.logging
    }

    /// Remote typing state.
    pub fn typing(&self) -> TypingState {
        self.typing
    }

    /// Room topic, for group conversations.
    pub fn topic(&self) -> Option<&str> {
        match &self.info {
            ConversationInfo::Direct { .. } => None,
            ConversationInfo::Group { topic, .. } => topic.as_deref(),
        }
    }

    /// Whether closing should park the conversation instead of destroying it.
    /// Always true for direct conversations (subject to configuration), only
    /// for persisted rooms otherwise.
    pub fn lingers_after_close(&self) -> bool {
        match &self.info {
            ConversationInfo::Direct { .. } => true,
            ConversationInfo::Group { persistent, .. } => *persistent,
        }
    }

    /// Merge identity for direct conversations; `None` for rooms, which never merge.
    pub fn buddy_identity(&self) -> Option<BuddyIdentity> {
        match &self.info {
            ConversationInfo::Direct {
                contact: Some(contact),
            } => Some(BuddyIdentity::Contact(contact.clone())),
            ConversationInfo::Direct { contact: None } => Some(BuddyIdentity::Buddy {
                account: self.key.account.clone(),
                normalized: self.key.name.normalized(),
            }),
            ConversationInfo::Group { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).expect("valid account")
    }

    fn name(s: &str) -> ConversationName {
        ConversationName::new(s).expect("valid name")
    }

    #[test]
    fn direct_conversation_has_direct_kind_and_name_title() {
        let conv = Conversation::direct(account("me"), name("Bob"));
        assert_eq!(conv.kind(), ConversationKind::Direct);
        assert_eq!(conv.key().kind, ConversationKind::Direct);
        assert_eq!(conv.title(), "Bob");
    }

    #[test]
    fn buddy_identity_merges_case_and_resource_variants() {
        let a = Conversation::direct(account("me"), name("bob@x.org/home"));
        let b = Conversation::direct(account("me"), name("Bob@X.org/work"));
        assert_eq!(a.buddy_identity(), b.buddy_identity());
    }

    #[test]
    fn buddy_identity_differs_across_accounts_without_contact() {
        let a = Conversation::direct(account("me"), name("bob"));
        let b = Conversation::direct(account("other"), name("bob"));
        assert_ne!(a.buddy_identity(), b.buddy_identity());
    }

    #[test]
    fn contact_merges_across_accounts() {
        let contact = ContactId::new("bob-contact").expect("valid contact");
        let a = Conversation::direct(account("me"), name("bob")).with_contact(contact.clone());
        let b = Conversation::direct(account("other"), name("robert")).with_contact(contact);
        assert_eq!(a.buddy_identity(), b.buddy_identity());
    }

    #[test]
    fn group_conversation_has_no_buddy_identity() {
        let conv = Conversation::group(account("me"), name("#rust"), true);
        assert_eq!(conv.buddy_identity(), None);
    }

    #[test]
    fn only_persistent_rooms_linger() {
        let known = Conversation::group(account("me"), name("#known"), true);
        let adhoc = Conversation::group(account("me"), name("#adhoc"), false);
        assert!(known.lingers_after_close());
        assert!(!adhoc.lingers_after_close());
        assert!(Conversation::direct(account("me"), name("bob")).lingers_after_close());
    }

    #[test]
    fn topic_only_applies_to_rooms() {
        let room = Conversation::group(account("me"), name("#rust"), false).with_topic("hello");
        let im = Conversation::direct(account("me"), name("bob")).with_topic("ignored");
        assert_eq!(room.topic(), Some("hello"));
        assert_eq!(im.topic(), None);
    }

    #[test]
    fn key_display_includes_kind_account_and_name() {
        let conv = Conversation::group(account("me"), name("#rust"), false);
        assert_eq!(conv.key().to_string(), "group:me:#rust");
    }
}
