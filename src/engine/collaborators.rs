//! Narrow interfaces to the systems the engine does not own.

use crate::model::{AccountId, BuddyIcon, ConversationKey, ConversationKind, GroupId, HistoryEntry, Rect};
use std::fmt;

/// Read access to the messaging core.
pub trait MessagingCore {
    /// Stored backlog of a conversation, oldest first. Unreadable records are
    /// reported in place as errors.
    fn message_history(&self, conversation: &ConversationKey) -> Vec<HistoryEntry>;

    /// Whether an account is online.
    fn is_account_connected(&self, account: &AccountId) -> bool;

    /// Roster group of the remote party of a conversation.
    fn roster_group(&self, conversation: &ConversationKey) -> Option<GroupId>;

    /// Buddy icon of the remote party, if any.
    fn buddy_icon(&self, _conversation: &ConversationKey) -> Option<BuddyIcon> {
        None
    }
}

/// Key under which window geometry is remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    /// Windows holding only direct conversations.
    Direct,
    /// Windows holding only group conversations.
    Group,
    /// Windows holding both.
    Mixed,
}

impl From<ConversationKind> for GeometryKind {
    fn from(kind: ConversationKind) -> Self {
        match kind {
            ConversationKind::Direct => Self::Direct,
            ConversationKind::Group => Self::Group,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Group => write!(f, "group"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// Persisted window geometry, one opaque entry per [`GeometryKind`].
pub trait PreferenceStore {
    /// Remembered frame for new windows of this kind.
    fn window_geometry(&self, kind: GeometryKind) -> Option<Rect>;

    /// Remember a frame after a resize.
    fn set_window_geometry(&mut self, kind: GeometryKind, geometry: Rect);
}
