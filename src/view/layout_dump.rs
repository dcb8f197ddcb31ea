//! Plain-text dump of every window and tab.
//!
//! ```text
//! window 1 hidden
//!   tab 3 direct:me:carol [closing]
//! window 2 at 0,0 640x480
//! * tab 1 direct:me:alice
//!   tab 2 direct:me:bob unseen=text/2
//! ```
//!
//! `*` marks the window's active tab. Used by the scenario driver and by
//! snapshot tests.

use crate::model::UnseenState;
use crate::state::{ReplayState, Tab, WindowRegistry};
use std::fmt::Write;

fn describe_tab(out: &mut String, tab: &Tab, active: bool) {
    let marker = if active { '*' } else { ' ' };
    let _ = write!(out, "{marker} tab {} {}", tab.id().get(), tab.active_key());
    let others: Vec<String> = tab
        .conversations()
        .iter()
        .filter(|c| c.key() != tab.active_key())
        .map(|c| c.key().to_string())
        .collect();
    if !others.is_empty() {
        let _ = write!(out, " +[{}]", others.join(", "));
    }
    if tab.unseen().state() != UnseenState::None {
        let _ = write!(out, " unseen={}/{}", tab.unseen().state(), tab.unseen().count());
    }
    if let Some(replay) = tab.replay() {
        if replay.state() == ReplayState::Running {
            let _ = write!(out, " [replaying {} left]", replay.remaining());
        }
    }
    if tab.close_pending() {
        out.push_str(" [closing]");
    }
    out.push('\n');
}

/// Describe the registry, windows in creation order and tabs in strip order.
pub fn dump_layout(registry: &WindowRegistry) -> String {
    let mut out = String::new();
    for window in registry.windows() {
        let _ = write!(out, "window {}", window.id().get());
        if window.is_hidden() {
            out.push_str(" hidden");
        } else {
            let g = window.geometry();
            let _ = write!(out, " at {},{} {}x{}", g.x, g.y, g.width, g.height);
        }
        out.push('\n');
        for id in window.tabs() {
            if let Some(tab) = registry.tab(*id) {
                describe_tab(&mut out, tab, window.active() == Some(*id));
            }
        }
    }
    out
}
