//! JSONL scenario scripts.
//!
//! One event per line, tagged by `"event"`:
//!
//! ```text
//! {"event":"create","conversation":{"account":"me","name":"bob"}}
//! {"event":"message","conversation":{"account":"me","name":"bob"},"sender":"bob","body":"hi","flags":["recv"],"timestamp":"2024-01-01T12:00:00Z"}
//! {"event":"idle","turns":3}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Malformed lines are
//! reported with their line number and skipped; the rest of the script still
//! runs.

use crate::model::error::ScriptError;
use crate::model::{
    AccountId, BuddyIcon, ContactId, Conversation, ConversationKey, ConversationKind,
    ConversationName, GroupId, HistoryEntry, Message, MessageFlags, Point, Rect, ReplayIoError,
    TypingState, UpdateKind, WindowId,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tracing::warn;

fn direct_kind() -> ConversationKind {
    ConversationKind::Direct
}

fn one() -> usize {
    1
}

fn default_frame_delay() -> u32 {
    100
}

fn default_spacing() -> u64 {
    1
}

fn focused_default() -> bool {
    true
}

/// Reference to an existing conversation. `kind` defaults to direct.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationRef {
    /// Owning account.
    pub account: AccountId,
    /// Buddy or room name.
    pub name: ConversationName,
    /// Direct or group.
    #[serde(default = "direct_kind")]
    pub kind: ConversationKind,
}

impl ConversationRef {
    /// Key of the referenced conversation.
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.account.clone(), self.name.clone(), self.kind)
    }
}

/// Full description of a conversation, for creation and updates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationSpec {
    /// Owning account.
    pub account: AccountId,
    /// Buddy or room name.
    pub name: ConversationName,
    /// Direct or group.
    #[serde(default = "direct_kind")]
    pub kind: ConversationKind,
    /// Persisted room (group only).
    #[serde(default)]
    pub persistent: bool,
    /// Roster contact (direct only).
    #[serde(default)]
    pub contact: Option<ContactId>,
    /// Display title; defaults to the name.
    #[serde(default)]
    pub title: Option<String>,
    /// Room topic (group only).
    #[serde(default)]
    pub topic: Option<String>,
    /// Whether the conversation is logged.
    #[serde(default)]
    pub logging: Option<bool>,
    /// Remote typing state.
    #[serde(default)]
    pub typing: Option<TypingState>,
}

impl ConversationSpec {
    /// Key of the described conversation.
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.account.clone(), self.name.clone(), self.kind)
    }

    /// Build the engine descriptor.
    pub fn to_conversation(&self) -> Conversation {
        let mut conversation = match self.kind {
            ConversationKind::Direct => {
                let conversation = Conversation::direct(self.account.clone(), self.name.clone());
                match &self.contact {
                    Some(contact) => conversation.with_contact(contact.clone()),
                    None => conversation,
                }
            }
            ConversationKind::Group => {
                let conversation =
                    Conversation::group(self.account.clone(), self.name.clone(), self.persistent);
                match &self.topic {
                    Some(topic) => conversation.with_topic(topic.clone()),
                    None => conversation,
                }
            }
        };
        if let Some(title) = &self.title {
            conversation = conversation.with_title(title.clone());
        }
        if let Some(logging) = self.logging {
            conversation = conversation.with_logging(logging);
        }
        if let Some(typing) = self.typing {
            conversation = conversation.with_typing(typing);
        }
        conversation
    }
}

/// One stored backlog record in a script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HistoryRecord {
    /// A record the store fails to read.
    Unreadable {
        /// Failure reason.
        unreadable: String,
    },
    /// A readable message.
    Message(Message),
}

/// A run of synthetic backlog messages, one every `spacing_secs` from `start`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedHistory {
    /// Number of messages.
    pub count: usize,
    /// Timestamp of the first message.
    pub start: DateTime<Utc>,
    /// Seconds between messages.
    #[serde(default = "default_spacing")]
    pub spacing_secs: u64,
}

/// One scenario event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// The core created a conversation.
    Create {
        /// The conversation.
        conversation: ConversationSpec,
    },
    /// The core destroyed a conversation.
    Destroy {
        /// The conversation.
        conversation: ConversationRef,
    },
    /// The core updated a conversation.
    Update {
        /// New descriptor.
        conversation: ConversationSpec,
        /// What changed.
        what: UpdateKind,
    },
    /// A live message arrived.
    Message {
        /// Target conversation.
        conversation: ConversationRef,
        /// Sender display name.
        sender: String,
        /// Message body.
        body: String,
        /// Delivery flags.
        #[serde(default)]
        flags: MessageFlags,
        /// Send time.
        timestamp: DateTime<Utc>,
    },
    /// Set a conversation's stored backlog.
    History {
        /// The conversation.
        conversation: ConversationRef,
        /// Explicit records, oldest first.
        #[serde(default)]
        records: Vec<HistoryRecord>,
        /// Synthetic records appended after the explicit ones.
        #[serde(default)]
        generate: Option<GeneratedHistory>,
    },
    /// Set a conversation's buddy icon.
    Icon {
        /// The conversation.
        conversation: ConversationRef,
        /// Native width.
        width: u32,
        /// Native height.
        height: u32,
        /// Frame count; `0` removes the icon.
        #[serde(default = "one")]
        frames: usize,
        /// Per-frame delay in milliseconds.
        #[serde(default = "default_frame_delay")]
        delay_ms: u32,
    },
    /// Connect or disconnect an account.
    Connection {
        /// The account.
        account: AccountId,
        /// Whether it is online.
        connected: bool,
    },
    /// Put a conversation's buddy in a roster group.
    RosterGroup {
        /// The conversation.
        conversation: ConversationRef,
        /// The group, or none.
        #[serde(default)]
        group: Option<GroupId>,
    },
    /// Present a conversation to the user.
    Present {
        /// The conversation.
        conversation: ConversationSpec,
    },
    /// The user closed a conversation's tab.
    Close {
        /// The conversation.
        conversation: ConversationRef,
    },
    /// Show a conversation in its window.
    Switch {
        /// The conversation.
        conversation: ConversationRef,
    },
    /// Button pressed.
    PointerDown {
        /// Screen x.
        x: i32,
        /// Screen y.
        y: i32,
    },
    /// Pointer moved.
    PointerMove {
        /// Screen x.
        x: i32,
        /// Screen y.
        y: i32,
    },
    /// Button released.
    PointerUp {
        /// Screen x.
        x: i32,
        /// Screen y.
        y: i32,
    },
    /// Escape pressed during a drag.
    CancelDrag,
    /// A window gained or lost focus.
    Focus {
        /// The window.
        window: WindowId,
        /// Gained (default) or lost.
        #[serde(default = "focused_default")]
        focused: bool,
    },
    /// A window was moved or resized.
    Resize {
        /// The window.
        window: WindowId,
        /// New frame.
        geometry: Rect,
    },
    /// A tab navigation action (`next`, `prev`, `select:N`, `next_unseen`, `close`).
    Tab {
        /// The window.
        window: WindowId,
        /// Action name.
        action: String,
    },
    /// Select the placement policy.
    Placement {
        /// Policy name.
        name: String,
    },
    /// Run idle turns.
    Idle {
        /// Number of turns.
        #[serde(default = "one")]
        turns: usize,
    },
    /// Advance the clock.
    Advance {
        /// Milliseconds.
        ms: u64,
    },
}

impl ScriptEvent {
    /// Point carried by a pointer event.
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Point::new(*x, *y))
            }
            _ => None,
        }
    }
}

/// Backlog entries described by a `history` event.
pub fn history_entries(
    conversation: &ConversationKey,
    records: &[HistoryRecord],
    generate: Option<&GeneratedHistory>,
) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = records
        .iter()
        .map(|record| match record {
            HistoryRecord::Unreadable { unreadable } => {
                Err(ReplayIoError::new(conversation, unreadable.clone()))
            }
            HistoryRecord::Message(message) => Ok(message.clone()),
        })
        .collect();
    if let Some(generated) = generate {
        let spacing = i64::try_from(generated.spacing_secs).unwrap_or(i64::MAX);
        entries.extend((0..generated.count).map(|i| {
            let offset = ChronoDuration::seconds(spacing.saturating_mul(i as i64));
            Ok(Message::new(
                conversation.name.as_str(),
                format!("backlog {}", i + 1),
                MessageFlags::RECV,
                generated.start + offset,
            ))
        }));
    }
    entries
}

/// Icon described by an `icon` event.
pub fn script_icon(width: u32, height: u32, frames: usize, delay_ms: u32) -> Option<BuddyIcon> {
    match frames {
        0 => None,
        1 => Some(BuddyIcon::still(width, height)),
        n => Some(BuddyIcon::animated(width, height, n, delay_ms)),
    }
}

/// A parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based line number.
    pub line: usize,
    /// The event.
    pub event: ScriptEvent,
}

/// Result of parsing a whole script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    /// Valid events in script order.
    pub events: Vec<ScriptLine>,
    /// Lines that failed to parse.
    pub errors: Vec<ScriptError>,
}

/// Parse one script line.
///
/// # Errors
///
/// Returns `ScriptError::InvalidEvent` if the line is not a known event.
pub fn parse_line(raw: &str, line: usize) -> Result<ScriptEvent, ScriptError> {
    serde_json::from_str(raw).map_err(|e| ScriptError::InvalidEvent {
        line,
        message: e.to_string(),
    })
}

/// Parse a whole script. Bad lines are logged and collected, never fatal.
pub fn parse_script(input: &str) -> ParsedScript {
    let mut parsed = ParsedScript::default();
    for (index, raw) in input.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = index + 1;
        match parse_line(trimmed, line) {
            Ok(event) => parsed.events.push(ScriptLine { line, event }),
            Err(err) => {
                warn!(error = %err, "Skipping malformed script line");
                parsed.errors.push(err);
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_with_defaults() {
        let event = parse_line(
            r#"{"event":"create","conversation":{"account":"me","name":"bob"}}"#,
            1,
        )
        .expect("valid event");
        let ScriptEvent::Create { conversation } = event else {
            panic!("expected create, got {event:?}");
        };
        assert_eq!(conversation.kind, ConversationKind::Direct);
        let built = conversation.to_conversation();
        assert_eq!(built.title(), "bob");
        assert!(built.logging());
    }

    #[test]
    fn parses_group_spec_with_topic() {
        let event = parse_line(
            r#"{"event":"create","conversation":{"account":"me","name":"rust","kind":"group","persistent":true,"topic":"borrowck"}}"#,
            1,
        )
        .expect("valid event");
        let ScriptEvent::Create { conversation } = event else {
            panic!("expected create");
        };
        let built = conversation.to_conversation();
        assert_eq!(built.kind(), ConversationKind::Group);
        assert_eq!(built.topic(), Some("borrowck"));
        assert!(built.lingers_after_close());
    }

    #[test]
    fn parses_message_flags() {
        let event = parse_line(
            r#"{"event":"message","conversation":{"account":"me","name":"rust","kind":"group"},"sender":"x","body":"me: hi","flags":["recv","nick"],"timestamp":"2024-01-01T12:00:00Z"}"#,
            1,
        )
        .expect("valid event");
        let ScriptEvent::Message { flags, .. } = event else {
            panic!("expected message");
        };
        assert!(flags.contains(MessageFlags::NICK));
    }

    #[test]
    fn window_ids_parse_from_numbers() {
        let event = parse_line(r#"{"event":"focus","window":2}"#, 1).expect("valid event");
        assert_eq!(
            event,
            ScriptEvent::Focus {
                window: WindowId::from_raw(2),
                focused: true
            }
        );
    }

    #[test]
    fn idle_defaults_to_one_turn() {
        let event = parse_line(r#"{"event":"idle"}"#, 1).expect("valid event");
        assert_eq!(event, ScriptEvent::Idle { turns: 1 });
    }

    #[test]
    fn malformed_lines_are_collected_with_line_numbers() {
        let script = "# comment\n\n{\"event\":\"idle\"}\nnot json\n{\"event\":\"explode\"}\n";
        let parsed = parse_script(script);
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.events[0].line, 3);
        let lines: Vec<usize> = parsed
            .errors
            .iter()
            .map(|e| match e {
                ScriptError::InvalidEvent { line, .. } => *line,
                ScriptError::UnknownConversation { line, .. } => *line,
                ScriptError::Rejected { line, .. } => *line,
            })
            .collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn history_records_mix_readable_and_unreadable() {
        let event = parse_line(
            r#"{"event":"history","conversation":{"account":"me","name":"bob"},"records":[{"sender":"bob","body":"old","timestamp":"2024-01-01T11:00:00Z"},{"unreadable":"bad sector"}],"generate":{"count":3,"start":"2024-01-01T11:30:00Z"}}"#,
            1,
        )
        .expect("valid event");
        let ScriptEvent::History {
            conversation,
            records,
            generate,
        } = event
        else {
            panic!("expected history");
        };
        let entries = history_entries(&conversation.key(), &records, generate.as_ref());
        assert_eq!(entries.len(), 5);
        assert!(entries[0].is_ok());
        assert!(entries[1].is_err());
        let last = entries[4].as_ref().expect("generated record");
        assert_eq!(last.body, "backlog 3");
        assert_eq!(last.timestamp.to_rfc3339(), "2024-01-01T11:30:02+00:00");
    }

    #[test]
    fn script_icon_picks_still_or_animated() {
        assert_eq!(script_icon(48, 48, 0, 100), None);
        assert!(!script_icon(48, 48, 1, 100).expect("icon").is_animated());
        assert!(script_icon(48, 48, 4, 100).expect("icon").is_animated());
    }
}
