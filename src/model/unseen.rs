//! Unseen-activity tracking for tabs that are not on screen.
//!
//! Two axes are tracked independently: a severity state used to colour the tab
//! label (max-aggregated) and a counter used for badges (incremented only for
//! text-like activity).

use crate::model::conversation::ConversationKind;
use crate::model::message::MessageFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate notification level of a tab.
///
/// Aggregation order: `None < NoLog < Text < Event < Nick`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UnseenState {
    /// Nothing pending.
    #[default]
    None,
    /// Activity that is not logged (e.g. transient notices).
    NoLog,
    /// Ordinary unseen text.
    Text,
    /// System event (join/part/status/error).
    Event,
    /// The local user's nick was mentioned.
    Nick,
}

impl UnseenState {
    /// Unseen level produced by an incoming message, or `None` when the message
    /// should not mark the tab at all (messages the local user sent).
    pub fn for_message(flags: MessageFlags, kind: ConversationKind) -> Option<Self> {
        if flags.contains(MessageFlags::SEND) {
            return None;
        }
        let state = match kind {
            ConversationKind::Group if flags.contains(MessageFlags::NICK) => UnseenState::Nick,
            ConversationKind::Direct | ConversationKind::Group => {
                if flags.contains(MessageFlags::SYSTEM) || flags.contains(MessageFlags::ERROR) {
                    UnseenState::Event
                } else if flags.contains(MessageFlags::NO_LOG) {
                    UnseenState::NoLog
                } else {
                    UnseenState::Text
                }
            }
        };
        Some(state)
    }

    /// Whether marking with this kind bumps the unseen counter.
    pub fn increments_count(self) -> bool {
        matches!(self, UnseenState::Text | UnseenState::Nick)
    }

    /// Lowercase name for logs and dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            UnseenState::None => "none",
            UnseenState::NoLog => "no_log",
            UnseenState::Text => "text",
            UnseenState::Event => "event",
            UnseenState::Nick => "nick",
        }
    }
}

impl fmt::Display for UnseenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tab unseen state and counter.
///
/// Invariant: `count() == 0 ⇔ state() == UnseenState::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnseenTracker {
    state: UnseenState,
    count: u32,
}

impl UnseenTracker {
    /// A clean tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregate state.
    pub fn state(&self) -> UnseenState {
        self.state
    }

    /// Current unseen counter.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record unseen activity of `kind` unless the tab has focus.
    ///
    /// The state becomes `max(state, kind)`. `Text` and `Nick` bump the counter;
    /// `NoLog` and `Event` only do so when the tab was clean, so that a marked
    /// tab always carries a non-zero count. Returns whether anything changed.
    pub fn mark(&mut self, kind: UnseenState, focused: bool) -> bool {
        if focused || kind == UnseenState::None {
            return false;
        }
        let before = *self;
        if kind > self.state {
            self.state = kind;
        }
        if kind.increments_count() || self.count == 0 {
            self.count = self.count.saturating_add(1);
        }
        *self != before
    }

    /// Reset to `None`/0. Returns whether anything changed.
    pub fn clear(&mut self) -> bool {
        let changed = self.count != 0 || self.state != UnseenState::None;
        self.state = UnseenState::None;
        self.count = 0;
        changed
    }

    /// Whether the tracker satisfies `count == 0 ⇔ state == None`.
    pub fn is_consistent(&self) -> bool {
        (self.count == 0) == (self.state == UnseenState::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_order_is_total() {
        assert!(UnseenState::None < UnseenState::NoLog);
        assert!(UnseenState::NoLog < UnseenState::Text);
        assert!(UnseenState::Text < UnseenState::Event);
        assert!(UnseenState::Event < UnseenState::Nick);
    }

    #[test]
    fn mark_text_raises_state_and_counts() {
        let mut tracker = UnseenTracker::new();
        assert!(tracker.mark(UnseenState::Text, false));
        assert_eq!(tracker.state(), UnseenState::Text);
        assert_eq!(tracker.count(), 1);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn mark_is_noop_when_focused() {
        let mut tracker = UnseenTracker::new();
        assert!(!tracker.mark(UnseenState::Nick, true));
        assert_eq!(tracker.state(), UnseenState::None);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn lower_kind_keeps_existing_state() {
        let mut tracker = UnseenTracker::new();
        tracker.mark(UnseenState::Nick, false);
        tracker.mark(UnseenState::Text, false);
        assert_eq!(tracker.state(), UnseenState::Nick);
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn event_does_not_bump_nonzero_count() {
        let mut tracker = UnseenTracker::new();
        tracker.mark(UnseenState::Text, false);
        tracker.mark(UnseenState::Event, false);
        assert_eq!(tracker.state(), UnseenState::Event);
        assert_eq!(tracker.count(), 1, "Event only raises severity");
    }

    #[test]
    fn event_on_clean_tracker_keeps_invariant() {
        let mut tracker = UnseenTracker::new();
        tracker.mark(UnseenState::Event, false);
        assert_eq!(tracker.state(), UnseenState::Event);
        assert_eq!(tracker.count(), 1);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn no_log_then_no_log_counts_once() {
        let mut tracker = UnseenTracker::new();
        tracker.mark(UnseenState::NoLog, false);
        assert!(!tracker.mark(UnseenState::NoLog, false));
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn clear_resets_state_and_count() {
        let mut tracker = UnseenTracker::new();
        tracker.mark(UnseenState::Text, false);
        assert!(tracker.clear());
        assert_eq!(tracker.state(), UnseenState::None);
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.clear(), "Second clear changes nothing");
    }

    #[test]
    fn sent_messages_never_mark() {
        let flags = MessageFlags::SEND;
        assert_eq!(UnseenState::for_message(flags, ConversationKind::Direct), None);
    }

    #[test]
    fn nick_flag_only_counts_in_rooms() {
        let flags = MessageFlags::RECV | MessageFlags::NICK;
        assert_eq!(
            UnseenState::for_message(flags, ConversationKind::Group),
            Some(UnseenState::Nick)
        );
        assert_eq!(
            UnseenState::for_message(flags, ConversationKind::Direct),
            Some(UnseenState::Text)
        );
    }

    #[test]
    fn system_and_error_are_events() {
        assert_eq!(
            UnseenState::for_message(MessageFlags::SYSTEM, ConversationKind::Group),
            Some(UnseenState::Event)
        );
        assert_eq!(
            UnseenState::for_message(MessageFlags::ERROR, ConversationKind::Direct),
            Some(UnseenState::Event)
        );
    }

    #[test]
    fn no_log_flag_maps_to_no_log() {
        assert_eq!(
            UnseenState::for_message(MessageFlags::NO_LOG, ConversationKind::Direct),
            Some(UnseenState::NoLog)
        );
    }
}
