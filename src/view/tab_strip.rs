//! Window tab strip widget.
//!
//! Renders a window's tabs with ratatui's Tabs widget. Each label is coloured
//! by its conversation's state and carries its unseen count.

use crate::engine::TabLabel;
use crate::view::styles::TabStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs, Widget},
    Frame,
};

/// Text of one label: title, merged-conversation marker and unseen count.
pub fn label_text(label: &TabLabel) -> String {
    let mut text = label.title.clone();
    if label.conversations > 1 {
        text.push_str(&format!(" +{}", label.conversations - 1));
    }
    if label.unseen_count > 0 {
        text.push_str(&format!(" ({})", label.unseen_count));
    }
    text
}

fn tabs_widget<'a>(labels: &'a [TabLabel], styles: &TabStyles, title: &'a str) -> Tabs<'a> {
    let titles: Vec<Line> = labels
        .iter()
        .map(|label| Line::from(Span::styled(label_text(label), styles.style_for(label))))
        .collect();

    let mut tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::White));

    if let Some(idx) = labels.iter().position(|label| label.active) {
        tabs = tabs
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .select(idx);
    }
    tabs
}

/// Render a window's tab strip into a frame.
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `area` - The area to render the strip within
/// * `labels` - Labels in strip order (from `ConversationEngine::tab_labels`)
/// * `styles` - Label styles
/// * `title` - Block title, usually the window name
pub fn render_tab_strip(
    frame: &mut Frame,
    area: Rect,
    labels: &[TabLabel],
    styles: &TabStyles,
    title: &str,
) {
    frame.render_widget(tabs_widget(labels, styles, title), area);
}

/// Render a window's tab strip into a buffer `width` cells wide and return
/// its rows as text, for printing outside a terminal.
pub fn render_tab_strip_lines(
    labels: &[TabLabel],
    styles: &TabStyles,
    title: &str,
    width: u16,
) -> Vec<String> {
    let area = Rect::new(0, 0, width.max(4), 3);
    let mut buffer = Buffer::empty(area);
    tabs_widget(labels, styles, title).render(area, &mut buffer);
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
