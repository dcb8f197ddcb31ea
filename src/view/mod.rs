//! Rendering of engine state for the scenario driver (impure shell).

pub mod layout_dump;
pub mod styles;
pub mod tab_strip;

pub use layout_dump::dump_layout;
pub use styles::{ColorConfig, TabStyles};
pub use tab_strip::{label_text, render_tab_strip, render_tab_strip_lines};

use crate::engine::{ConversationEngine, MessagingCore, PreferenceStore};

/// Default width of printed tab strips, in cells.
pub const DEFAULT_STRIP_WIDTH: u16 = 80;

/// Tab strips of every visible window, one block per window, as text.
pub fn render_strips<C: MessagingCore, P: PreferenceStore>(
    engine: &ConversationEngine<C, P>,
    styles: &TabStyles,
    width: u16,
) -> String {
    let mut out = String::new();
    for window in engine.registry().visible_windows() {
        let title = format!("Window {}", window.id().get());
        let labels = engine.tab_labels(window.id());
        for line in render_tab_strip_lines(&labels, styles, &title, width) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Full report of an engine: layout dump followed by rendered tab strips.
pub fn render_report<C: MessagingCore, P: PreferenceStore>(
    engine: &ConversationEngine<C, P>,
    styles: &TabStyles,
    width: u16,
) -> String {
    let mut out = dump_layout(engine.registry());
    let strips = render_strips(engine, styles, width);
    if !strips.is_empty() {
        out.push('\n');
        out.push_str(&strips);
    }
    out
}
