//! Per-tab conversation view: the ordered lines injected into the display.
//!
//! The rich-text renderer is an external collaborator; this is the sequence of
//! things the engine asked it to show, in order.

use crate::model::{ConversationKey, Message};
use chrono::{DateTime, Utc};

/// Where a displayed message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrigin {
    /// Replayed from stored history.
    Backlog,
    /// Delivered live.
    Live,
}

/// One line injected into a tab's view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLine {
    /// A message from one of the tab's bound conversations.
    Message {
        /// Conversation the message belongs to.
        conversation: ConversationKey,
        /// Backlog or live.
        origin: DisplayOrigin,
        /// The message itself.
        message: Message,
    },
    /// Visual divider between replayed backlog and live traffic.
    Separator,
}

/// Ordered display log of a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationView {
    lines: Vec<DisplayLine>,
}

impl ConversationView {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a replayed backlog record.
    pub fn push_backlog(&mut self, conversation: ConversationKey, message: Message) {
        self.lines.push(DisplayLine::Message {
            conversation,
            origin: DisplayOrigin::Backlog,
            message,
        });
    }

    /// Append a live message.
    pub fn push_live(&mut self, conversation: ConversationKey, message: Message) {
        self.lines.push(DisplayLine::Message {
            conversation,
            origin: DisplayOrigin::Live,
            message,
        });
    }

    /// Append the backlog/live separator.
    pub fn push_separator(&mut self) {
        self.lines.push(DisplayLine::Separator);
    }

    /// All lines in display order.
    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been displayed.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of separators displayed.
    pub fn separator_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line, DisplayLine::Separator))
            .count()
    }

    /// Bodies of displayed messages, with `"---"` standing for separators.
    pub fn bodies(&self) -> Vec<&str> {
        self.lines
            .iter()
            .map(|line| match line {
                DisplayLine::Message { message, .. } => message.body.as_str(),
                DisplayLine::Separator => "---",
            })
            .collect()
    }

    /// Timestamp of the last displayed message of `conversation`.
    pub fn last_timestamp(&self, conversation: &ConversationKey) -> Option<DateTime<Utc>> {
        self.lines.iter().rev().find_map(|line| match line {
            DisplayLine::Message {
                conversation: c,
                message,
                ..
            } if c == conversation => Some(message.timestamp),
            _ => None,
        })
    }
}
