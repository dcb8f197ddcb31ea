//! Core identifier newtypes with smart constructors.
//!
//! String identifiers validate non-empty input at construction time.
//! Raw constructors are never exported - use smart constructors only.
//! Window and tab handles are opaque integers issued by the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account that owns a conversation (e.g. "alice@example.org/XMPP").
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Smart constructor: validates non-empty account ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidAccountId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidAccountId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the account ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

/// Canonical name of a conversation: the remote buddy for direct
/// conversations, the room name for group conversations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationName(String);

impl ConversationName {
    /// Smart constructor: validates non-empty name
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidConversationName> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidConversationName::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalized form used to decide whether two direct conversations
    /// refer to the same buddy: case-folded, whitespace removed, and any
    /// resource suffix after `/` dropped.
    pub fn normalized(&self) -> String {
        let bare = self.0.split('/').next().unwrap_or(&self.0);
        bare.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl fmt::Display for ConversationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConversationName {
    type Error = InvalidConversationName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversationName> for String {
    fn from(value: ConversationName) -> Self {
        value.0
    }
}

/// Roster group a buddy or room is filed under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(String);

impl GroupId {
    /// Smart constructor: validates non-empty group ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidGroupId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidGroupId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the group ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GroupId {
    type Error = InvalidGroupId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.0
    }
}

/// Roster contact grouping several buddies (possibly on different accounts)
/// that represent one person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactId(String);

impl ContactId {
    /// Smart constructor: validates non-empty contact ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidContactId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidContactId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the contact ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContactId {
    type Error = InvalidContactId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContactId> for String {
    fn from(value: ContactId) -> Self {
        value.0
    }
}

/// Handle of a live window in the registry.
///
/// Issued monotonically, so ordering by `WindowId` is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    /// Wrap a raw handle value.
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Handle of a live tab in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TabId(u64);

impl TabId {
    /// Wrap a raw handle value.
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

// ===== Error Types =====

/// Rejected account ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAccountId {
    /// The account ID was empty.
    #[error("Account ID cannot be empty")]
    Empty,
}

/// Rejected conversation name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConversationName {
    /// The name was empty or whitespace only.
    #[error("Conversation name cannot be empty")]
    Empty,
}

/// Rejected group ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGroupId {
    /// The group ID was empty.
    #[error("Group ID cannot be empty")]
    Empty,
}

/// Rejected contact ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidContactId {
    /// The contact ID was empty.
    #[error("Contact ID cannot be empty")]
    Empty,
}

// ===== Tests =====
