//! Messages delivered to conversation views, live or from stored history.

use crate::model::error::ReplayIoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Bit set of per-message flags reported by the messaging core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MessageFlags(u16);

impl MessageFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Outgoing message sent by the local user.
    pub const SEND: Self = Self(1 << 0);
    /// Incoming message.
    pub const RECV: Self = Self(1 << 1);
    /// System notice (joins, parts, status changes).
    pub const SYSTEM: Self = Self(1 << 2);
    /// Automatic response.
    pub const AUTO_RESP: Self = Self(1 << 3);
    /// The local user's nick was mentioned.
    pub const NICK: Self = Self(1 << 4);
    /// Message must not be logged.
    pub const NO_LOG: Self = Self(1 << 5);
    /// Error notice.
    pub const ERROR: Self = Self(1 << 6);
    /// Delivered late (offline storage).
    pub const DELAYED: Self = Self(1 << 7);

    const NAMES: [(&'static str, MessageFlags); 8] = [
        ("send", Self::SEND),
        ("recv", Self::RECV),
        ("system", Self::SYSTEM),
        ("auto_resp", Self::AUTO_RESP),
        ("nick", Self::NICK),
        ("no_log", Self::NO_LOG),
        ("error", Self::ERROR),
        ("delayed", Self::DELAYED),
    ];

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MessageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Unknown flag name in serialized input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown message flag: {0}")]
pub struct UnknownMessageFlag(pub String);

impl TryFrom<Vec<String>> for MessageFlags {
    type Error = UnknownMessageFlag;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.into_iter().try_fold(Self::NONE, |acc, name| {
            Self::NAMES
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, flag)| acc | *flag)
                .ok_or(UnknownMessageFlag(name))
        })
    }
}

impl From<MessageFlags> for Vec<String> {
    fn from(flags: MessageFlags) -> Self {
        MessageFlags::NAMES
            .iter()
            .filter(|(_, flag)| flags.contains(*flag))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }
}

/// A single message: `{sender, body, flags, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the sender.
    pub sender: String,
    /// Message body (markup is opaque to the engine).
    pub body: String,
    /// Delivery flags.
    #[serde(default)]
    pub flags: MessageFlags,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message.
    pub fn new(
        sender: impl Into<String>,
        body: impl Into<String>,
        flags: MessageFlags,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            flags,
            timestamp,
        }
    }
}

/// One stored backlog record as returned by the history collaborator.
/// Unreadable records are reported in place and skipped during replay.
pub type HistoryEntry = Result<Message, ReplayIoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_union_contains_both() {
        let flags = MessageFlags::RECV | MessageFlags::NICK;
        assert!(flags.contains(MessageFlags::RECV));
        assert!(flags.contains(MessageFlags::NICK));
        assert!(!flags.contains(MessageFlags::SEND));
    }

    #[test]
    fn empty_flags_report_empty() {
        assert!(MessageFlags::NONE.is_empty());
        assert!(!MessageFlags::SYSTEM.is_empty());
    }

    #[test]
    fn flags_parse_from_names() {
        let flags: MessageFlags =
            serde_json::from_str(r#"["recv","no_log"]"#).expect("known flag names");
        assert_eq!(flags, MessageFlags::RECV | MessageFlags::NO_LOG);
    }

    #[test]
    fn unknown_flag_name_is_rejected() {
        let result: Result<MessageFlags, _> = serde_json::from_str(r#"["shouting"]"#);
        assert!(result.is_err(), "Unknown flag must be rejected");
    }

    #[test]
    fn message_deserializes_without_flags() {
        let msg: Message = serde_json::from_str(
            r#"{"sender":"bob","body":"hi","timestamp":"2025-01-01T10:00:00Z"}"#,
        )
        .expect("valid message");
        assert!(msg.flags.is_empty());
        assert_eq!(msg.sender, "bob");
    }
}
