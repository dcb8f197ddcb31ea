//! Backlog replay for freshly bound tabs.
//!
//! A [`HistoryReplay`] is a resumable cursor over a snapshot of stored history.
//! Each scheduler turn injects at most `batch_size` records and yields. Live
//! messages that arrive meanwhile are buffered; when the backlog is exhausted
//! they are merge-sorted by timestamp and flushed after a single separator.
//!
//! # State Machine
//!
//! `Running → Finished` when the last batch is injected,
//! `Running → Cancelled` when the owning tab goes away. Both end states are
//! absorbing: further steps and cancels are no-ops.

use crate::model::{ConversationKey, HistoryEntry, Message};
use crate::state::view::ConversationView;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Default number of records injected per scheduler turn.
pub const DEFAULT_REPLAY_BATCH: usize = 100;

/// Lifecycle of a replay cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Backlog remains; live traffic is buffered.
    Running,
    /// Backlog exhausted and buffered live traffic flushed.
    Finished,
    /// Abandoned before completion.
    Cancelled,
}

/// Result of one replay turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// More backlog remains; schedule another turn.
    Continue,
    /// Replay completed this turn and flushed `flushed` buffered live messages.
    Finished {
        /// Number of live messages flushed after the separator.
        flushed: usize,
    },
    /// The cursor was already finished or cancelled; nothing happened.
    Inactive,
}

/// Resumable backlog cursor attached to a tab.
#[derive(Debug, Clone)]
pub struct HistoryReplay {
    remaining: VecDeque<(ConversationKey, HistoryEntry)>,
    cutover: Option<DateTime<Utc>>,
    buffered: Vec<(ConversationKey, Message)>,
    batch_size: usize,
    state: ReplayState,
    injected: usize,
    skipped: usize,
    turns: usize,
}

/// Order key for a stream of entries: unreadable records inherit the
/// timestamp of the readable record before them so they keep their place.
fn keyed(
    conversation: ConversationKey,
    entries: Vec<HistoryEntry>,
) -> Vec<(DateTime<Utc>, ConversationKey, HistoryEntry)> {
    let mut last = DateTime::<Utc>::MIN_UTC;
    entries
        .into_iter()
        .map(|entry| {
            if let Ok(message) = &entry {
                last = message.timestamp;
            }
            (last, conversation.clone(), entry)
        })
        .collect()
}

impl HistoryReplay {
    /// Snapshot the backlogs of one or more conversations, ordered by timestamp.
    ///
    /// Returns `None` when there is nothing to replay.
    pub fn start(sources: Vec<(ConversationKey, Vec<HistoryEntry>)>, batch_size: usize) -> Option<Self> {
        let mut replay = Self {
            remaining: VecDeque::new(),
            cutover: None,
            buffered: Vec::new(),
            batch_size: batch_size.max(1),
            state: ReplayState::Running,
            injected: 0,
            skipped: 0,
            turns: 0,
        };
        for (conversation, entries) in sources {
            replay.merge_backlog(conversation, entries);
        }
        if replay.remaining.is_empty() {
            return None;
        }
        Some(replay)
    }

    /// Merge another conversation's backlog into the remaining records.
    /// Ignored unless the replay is still running.
    pub fn merge_backlog(&mut self, conversation: ConversationKey, entries: Vec<HistoryEntry>) {
        if self.state != ReplayState::Running || entries.is_empty() {
            return;
        }
        let mut merged: Vec<(DateTime<Utc>, ConversationKey, HistoryEntry)> = Vec::new();
        let mut last = DateTime::<Utc>::MIN_UTC;
        for (conv, entry) in self.remaining.drain(..) {
            if let Ok(message) = &entry {
                last = message.timestamp;
            }
            merged.push((last, conv, entry));
        }
        merged.extend(keyed(conversation, entries));
        merged.sort_by_key(|(ts, _, _)| *ts);

        self.cutover = merged
            .iter()
            .filter_map(|(_, _, entry)| entry.as_ref().ok().map(|m| m.timestamp))
            .max()
            .max(self.cutover);
        self.remaining = merged
            .into_iter()
            .map(|(_, conv, entry)| (conv, entry))
            .collect();
    }

    /// Timestamp of the newest backlog record at snapshot time.
    pub fn cutover(&self) -> Option<DateTime<Utc>> {
        self.cutover
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Whether live messages must be buffered.
    pub fn is_running(&self) -> bool {
        self.state == ReplayState::Running
    }

    /// Records not yet injected.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Live messages waiting for the flush.
    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }

    /// Records injected so far.
    pub fn injected(&self) -> usize {
        self.injected
    }

    /// Unreadable records skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Turns taken so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Hold back a live message until the backlog is done.
    pub fn buffer_live(&mut self, conversation: ConversationKey, message: Message) {
        self.buffered.push((conversation, message));
    }

    /// Inject the next batch into `view`.
    pub fn step(&mut self, view: &mut ConversationView) -> ReplayStep {
        if self.state != ReplayState::Running {
            return ReplayStep::Inactive;
        }
        self.turns += 1;
        let take = self.batch_size.min(self.remaining.len());
        for (conversation, entry) in self.remaining.drain(..take) {
            match entry {
                Ok(message) => {
                    view.push_backlog(conversation, message);
                    self.injected += 1;
                }
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable backlog record");
                    self.skipped += 1;
                }
            }
        }
        if !self.remaining.is_empty() {
            debug!(
                turn = self.turns,
                remaining = self.remaining.len(),
                "Backlog replay yielding"
            );
            return ReplayStep::Continue;
        }

        let mut live = std::mem::take(&mut self.buffered);
        live.sort_by_key(|(_, message)| message.timestamp);
        let flushed = live.len();
        view.push_separator();
        for (conversation, message) in live {
            view.push_live(conversation, message);
        }
        self.state = ReplayState::Finished;
        debug!(
            turns = self.turns,
            injected = self.injected,
            skipped = self.skipped,
            flushed,
            "Backlog replay finished"
        );
        ReplayStep::Finished { flushed }
    }

    /// Abandon the replay, handing back buffered live messages so they are not
    /// lost. Returns `None` if the replay had already ended.
    pub fn cancel(&mut self) -> Option<Vec<(ConversationKey, Message)>> {
        if self.state != ReplayState::Running {
            return None;
        }
        self.state = ReplayState::Cancelled;
        self.remaining.clear();
        Some(std::mem::take(&mut self.buffered))
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
