//! Tab navigation actions.
//!
//! Pure functions that turn a navigation action on a window into the tab
//! command the engine should carry out.

use crate::model::{TabId, UnseenState, WindowId};
use crate::state::registry::WindowRegistry;
use std::fmt;
use std::str::FromStr;

/// A keyboard-style navigation action on a window's tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAction {
    /// Next tab, wrapping to the first.
    Next,
    /// Previous tab, wrapping to the last.
    Prev,
    /// Tab by 1-based strip position.
    Select(usize),
    /// Next tab with unseen activity, searching forward and wrapping.
    /// Behaves like `Next` when no tab has unseen activity.
    NextUnseen,
    /// Close the active tab.
    Close,
}

/// What the engine should do for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabCommand {
    /// Make this tab active.
    Activate(TabId),
    /// Close this tab.
    Close(TabId),
}

/// Error parsing a [`TabAction`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tab action: {0}")]
pub struct UnknownTabAction(pub String);

impl FromStr for TabAction {
    type Err = UnknownTabAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "next_unseen" => Ok(Self::NextUnseen),
            "close" => Ok(Self::Close),
            other => other
                .strip_prefix("select:")
                .and_then(|n| n.parse().ok())
                .map(Self::Select)
                .ok_or_else(|| UnknownTabAction(s.to_string())),
        }
    }
}

impl fmt::Display for TabAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Prev => write!(f, "prev"),
            Self::Select(n) => write!(f, "select:{n}"),
            Self::NextUnseen => write!(f, "next_unseen"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Resolve `action` on `window` into a command.
///
/// Returns `None` when the action does not apply: unknown or empty window,
/// or out-of-range selection.
pub fn resolve_tab_action(
    registry: &WindowRegistry,
    window: WindowId,
    action: TabAction,
) -> Option<TabCommand> {
    let w = registry.window(window)?;
    let len = w.len();
    if len == 0 {
        return None;
    }
    let current = w.active_index().unwrap_or(0);

    let target = match action {
        TabAction::Close => return w.active().map(TabCommand::Close),
        TabAction::Next => (current + 1) % len,
        TabAction::Prev => (current + len - 1) % len,
        TabAction::Select(n) => {
            if n == 0 || n > len {
                return None;
            }
            n - 1
        }
        TabAction::NextUnseen => (1..=len)
            .map(|step| (current + step) % len)
            .find(|&i| {
                registry
                    .tab(w.tabs()[i])
                    .is_some_and(|t| t.unseen().state() != UnseenState::None)
            })
            .unwrap_or((current + 1) % len),
    };
    w.tabs().get(target).copied().map(TabCommand::Activate)
}

// ===== Tests =====

#[cfg(test)]
#[path = "tab_handler_tests.rs"]
mod tests;
