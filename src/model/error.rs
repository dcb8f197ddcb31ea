//! Error types for the conversation window engine.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions at the outer layers (script
//! driver, configuration, logging), while the engine itself handles its own failures locally.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error of the scenario driver binary
//!   - [`InputError`] - Script file/stdin reading failures
//!   - [`ScriptError`] - Malformed script lines (non-fatal, skipped)
//!   - [`crate::config::ConfigError`] / [`crate::logging::LoggingError`]
//! - [`EngineError`] - Failures inside the engine, all handled locally
//!   - [`ReplayIoError`] - Unreadable backlog record
//!   - [`InvariantViolation`] - Registry or unseen bookkeeping went inconsistent
//!
//! # Error Recovery Strategy
//!
//! Nothing in the engine surfaces a user-visible error. Placement failures fall back to a
//! fresh window, unreadable backlog records are skipped, ambiguous drag targets resolve to
//! the most recently focused window, and invariant violations abort in debug builds but
//! self-heal in release builds.

use crate::model::conversation::ConversationKey;
use crate::model::identifiers::{TabId, WindowId};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error of the scenario driver.
///
/// Input and configuration errors are fatal for the driver; script line errors are not
/// and never reach this type unless the caller chooses to escalate them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the scenario script.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Failed to load configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Failed to initialize logging.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Output could not be written.
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Errors encountered when reading scenario scripts from files or stdin.
///
/// # Recovery Patterns
///
/// - **FileNotFound**: Display error and exit (user provided invalid path)
/// - **NoInput**: Display usage help - user must provide a path or pipe stdin
/// - **Io**: Generic I/O failures - display and exit
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified script file does not exist.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use convwin::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// No script was provided and stdin is an interactive terminal.
    #[error("No input source: provide a script path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading the script.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A malformed line in a scenario script.
///
/// Script errors are **non-fatal**: the line is logged and skipped, and the remaining
/// lines still run against the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The line is not valid JSON or does not match any known event.
    ///
    /// ```
    /// use convwin::model::error::ScriptError;
    ///
    /// let err = ScriptError::InvalidEvent {
    ///     line: 42,
    ///     message: "unknown variant `explode`".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid event at line {line}: {message}")]
    InvalidEvent {
        /// 1-based line number in the script.
        line: usize,
        /// Parser error message.
        message: String,
    },

    /// The event references a conversation the script never created.
    #[error("Unknown conversation at line {line}: {key}")]
    UnknownConversation {
        /// 1-based line number in the script.
        line: usize,
        /// Display form of the conversation key.
        key: String,
    },

    /// The engine refused the event (unknown window, unknown policy, bad action).
    #[error("Event rejected at line {line}: {reason}")]
    Rejected {
        /// 1-based line number in the script.
        line: usize,
        /// Why it was refused.
        reason: String,
    },
}

/// A backlog record could not be read from the history store.
///
/// Returned in place of a record by the history collaborator. The replay task logs it,
/// skips the record, and continues with the next one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unreadable backlog record for {conversation}: {reason}")]
pub struct ReplayIoError {
    /// Conversation whose history was being read.
    pub conversation: String,
    /// Underlying storage failure.
    pub reason: String,
}

impl ReplayIoError {
    /// Build an error for `conversation`.
    pub fn new(conversation: &ConversationKey, reason: impl Into<String>) -> Self {
        Self {
            conversation: conversation.to_string(),
            reason: reason.into(),
        }
    }
}

/// Broken engine bookkeeping. A programming error, never caused by input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A tab is listed by no window.
    #[error("Tab {tab} belongs to no window")]
    TabInNoWindow {
        /// Offending tab.
        tab: TabId,
    },

    /// A tab is listed by more than one window (or twice by one window).
    #[error("Tab {tab} is listed {count} times across windows")]
    TabInManyWindows {
        /// Offending tab.
        tab: TabId,
        /// Number of listings found.
        count: usize,
    },

    /// A window lists a tab the registry does not own.
    #[error("Window {window} lists unknown tab {tab}")]
    DanglingTabEntry {
        /// Window holding the entry.
        window: WindowId,
        /// Missing tab.
        tab: TabId,
    },

    /// `unseen_count == 0` disagrees with `state == None`.
    #[error("Tab {tab} has unseen count {count} but state {state}")]
    UnseenMismatch {
        /// Offending tab.
        tab: TabId,
        /// Stored count.
        count: u32,
        /// Stored state name.
        state: String,
    },

    /// A visible window has no tabs.
    #[error("Window {window} is visible but empty")]
    EmptyVisibleWindow {
        /// Offending window.
        window: WindowId,
    },

    /// A window's active tab is not one of its tabs.
    #[error("Window {window} has an active tab it does not contain")]
    ActiveTabMissing {
        /// Offending window.
        window: WindowId,
    },

    /// A tab's active conversation is not bound to it.
    #[error("Tab {tab} has an unbound active conversation")]
    ActiveConversationUnbound {
        /// Offending tab.
        tab: TabId,
    },
}

/// Failures inside the engine.
///
/// All variants are handled where they occur; the facade only returns them from
/// configuration-style calls such as selecting a placement policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The active policy picked a window that cannot take the tab. Recovered by
    /// creating a new window.
    #[error("Placement failed: {reason}")]
    PlacementFailure {
        /// Why the chosen target was rejected.
        reason: String,
    },

    /// A backlog record could not be read. Recovered by skipping it.
    #[error(transparent)]
    ReplayIo(#[from] ReplayIoError),

    /// Several windows overlap under the pointer. Recovered by picking the most
    /// recently focused one.
    #[error("Drop target ambiguous between {candidates} windows")]
    DragResolutionAmbiguous {
        /// Number of overlapping windows.
        candidates: usize,
    },

    /// Engine bookkeeping is inconsistent.
    #[error("Invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    /// No placement policy is registered under this name.
    #[error("Unknown placement policy: {0}")]
    UnknownPlacementPolicy(String),

    /// The conversation is not bound to any tab.
    #[error("Unknown conversation: {0}")]
    UnknownConversation(ConversationKey),

    /// The window does not exist.
    #[error("Unknown window: {0}")]
    UnknownWindow(WindowId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_io_error_mentions_reason() {
        let err = ReplayIoError {
            conversation: "direct:me:bob".to_string(),
            reason: "checksum mismatch".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("direct:me:bob"));
        assert!(msg.contains("checksum mismatch"));
    }

    #[test]
    fn replay_io_error_converts_into_engine_error() {
        let err = ReplayIoError {
            conversation: "c".to_string(),
            reason: "r".to_string(),
        };
        let engine: EngineError = err.clone().into();
        assert_eq!(engine, EngineError::ReplayIo(err));
    }

    #[test]
    fn invariant_violation_wraps_into_engine_error() {
        let violation = InvariantViolation::TabInNoWindow {
            tab: TabId::from_raw(3),
        };
        let engine: EngineError = violation.into();
        assert!(engine.to_string().contains("t3"));
    }

    #[test]
    fn unknown_policy_names_the_policy() {
        let err = EngineError::UnknownPlacementPolicy("spiral".to_string());
        assert_eq!(err.to_string(), "Unknown placement policy: spiral");
    }

    #[test]
    fn input_error_no_input_message() {
        let msg = InputError::NoInput.to_string();
        assert!(msg.contains("pipe data to stdin"));
    }

    #[test]
    fn script_error_unknown_conversation_mentions_line() {
        let err = ScriptError::UnknownConversation {
            line: 7,
            key: "direct:me:ghost".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("ghost"));
    }
}
