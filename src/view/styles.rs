//! Tab label styling.
//!
//! Label colour follows the conversation's state: typing wins over unseen
//! activity, and a disconnected account greys the label out.

use crate::engine::TabLabel;
use crate::model::{TypingState, UnseenState};
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== TabStyles =====

/// Styles of tab labels by conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStyles {
    normal: Style,
    typing: Style,
    typed: Style,
    nick: Style,
    event: Style,
    text: Style,
    disconnected: Style,
}

impl TabStyles {
    /// Styles honoring `NO_COLOR`.
    pub fn new() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }

    /// Styles for the given color configuration. Without colors, unseen
    /// activity is shown in bold and disconnected tabs dimmed.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                normal: Style::default().fg(Color::White),
                typing: Style::default().fg(Color::Green),
                typed: Style::default().fg(Color::Yellow),
                nick: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                event: Style::default().fg(Color::Gray),
                text: Style::default().fg(Color::Red),
                disconnected: Style::default().fg(Color::DarkGray),
            }
        } else {
            let bold = Style::default().add_modifier(Modifier::BOLD);
            Self {
                normal: Style::default(),
                typing: Style::default(),
                typed: Style::default(),
                nick: bold,
                event: Style::default(),
                text: bold,
                disconnected: Style::default().add_modifier(Modifier::DIM),
            }
        }
    }

    /// Style of one label.
    pub fn style_for(&self, label: &TabLabel) -> Style {
        if !label.connected {
            return self.disconnected;
        }
        match label.typing {
            TypingState::Typing => return self.typing,
            TypingState::Typed => return self.typed,
            TypingState::NotTyping => {}
        }
        match label.unseen {
            UnseenState::Nick => self.nick,
            UnseenState::Event => self.event,
            UnseenState::Text => self.text,
            UnseenState::NoLog | UnseenState::None => self.normal,
        }
    }
}

impl Default for TabStyles {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TabId;
    use serial_test::serial;

    fn label(unseen: UnseenState, typing: TypingState, connected: bool) -> TabLabel {
        TabLabel {
            tab: TabId::from_raw(1),
            title: "bob".to_string(),
            unseen,
            unseen_count: u32::from(unseen != UnseenState::None),
            typing,
            connected,
            active: false,
            conversations: 1,
        }
    }

    fn colored() -> TabStyles {
        TabStyles::with_color_config(ColorConfig { enabled: true })
    }

    // ===== ColorConfig Tests =====

    #[test]
    #[serial(no_color_env)]
    fn color_config_respects_no_color_flag() {
        let config = ColorConfig::from_env_and_args(true);
        assert!(
            !config.colors_enabled(),
            "--no-color flag should disable colors"
        );
    }

    #[test]
    #[serial(no_color_env)]
    fn color_config_respects_no_color_env_var() {
        std::env::set_var("NO_COLOR", "1");
        let config = ColorConfig::from_env_and_args(false);
        std::env::remove_var("NO_COLOR");
        assert!(
            !config.colors_enabled(),
            "NO_COLOR env var should disable colors"
        );
    }

    #[test]
    #[serial(no_color_env)]
    fn color_config_enables_colors_by_default() {
        std::env::remove_var("NO_COLOR");
        let config = ColorConfig::from_env_and_args(false);
        assert!(config.colors_enabled(), "Colors should be enabled by default");
    }

    // ===== TabStyles Tests =====

    #[test]
    fn typing_wins_over_unseen() {
        let styles = colored();
        let style = styles.style_for(&label(UnseenState::Nick, TypingState::Typing, true));
        assert_eq!(style.fg, Some(Color::Green));
    }

    #[test]
    fn disconnected_wins_over_everything() {
        let styles = colored();
        let style = styles.style_for(&label(UnseenState::Text, TypingState::Typing, false));
        assert_eq!(style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn unseen_states_have_distinct_colors() {
        let styles = colored();
        let text = styles.style_for(&label(UnseenState::Text, TypingState::NotTyping, true));
        let event = styles.style_for(&label(UnseenState::Event, TypingState::NotTyping, true));
        let nick = styles.style_for(&label(UnseenState::Nick, TypingState::NotTyping, true));
        assert_ne!(text, event);
        assert_ne!(event, nick);
        assert_ne!(text, nick);
    }

    #[test]
    fn no_log_looks_like_a_clean_tab() {
        let styles = colored();
        assert_eq!(
            styles.style_for(&label(UnseenState::NoLog, TypingState::NotTyping, true)),
            styles.style_for(&label(UnseenState::None, TypingState::NotTyping, true)),
        );
    }

    #[test]
    fn without_colors_unseen_text_is_bold() {
        let styles = TabStyles::with_color_config(ColorConfig { enabled: false });
        let style = styles.style_for(&label(UnseenState::Text, TypingState::NotTyping, true));
        assert_eq!(style.fg, None);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
