//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod conversation;
pub mod error;
pub mod geometry;
pub mod icon;
pub mod identifiers;
pub mod message;
pub mod unseen;

// Re-export for convenience
pub use conversation::{
    BuddyIdentity, Conversation, ConversationInfo, ConversationKey, ConversationKind,
    TypingState, UpdateKind,
};
pub use error::{EngineError, InvariantViolation, ReplayIoError};
pub use geometry::{Point, Rect};
pub use icon::{BuddyIcon, IconFrame};
pub use identifiers::{
    AccountId, ContactId, ConversationName, GroupId, InvalidAccountId, InvalidContactId,
    InvalidConversationName, InvalidGroupId, TabId, WindowId,
};
pub use message::{HistoryEntry, Message, MessageFlags};
pub use unseen::{UnseenState, UnseenTracker};
