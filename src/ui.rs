use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::theme::ThemeColors;

/// Render the application UI.
pub fn render(app: &mut App, theme: &ThemeColors, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    // Update scroll offset to keep selected row visible
    let visible_height = chunks[0].height.saturating_sub(2) as usize; // account for border
    app.update_scroll(visible_height);

    let block = Block::default()
        .title(" Instruments ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_fg));

    let tree_widget = TreeWidget::new(&app.tree, theme)
        .scroll_offset(app.scroll_offset)
        .row_height(app.row_height)
        .block(block);
    frame.render_widget(tree_widget, chunks[0]);

    let position = match app.selected_index() {
        Some(index) => format!("{}/{}", index + 1, app.row_count()),
        None => format!("-/{}", app.row_count()),
    };
    let flags = flags(app);
    let mut status = StatusBarWidget::new(&app.query, &position, &flags, theme)
        .searching(app.mode == AppMode::Search);
    if let Some((msg, _)) = &app.status_message {
        status = status.status_message(msg);
    }
    frame.render_widget(status, chunks[1]);
}

fn flags(app: &App) -> String {
    let mut flags = Vec::new();
    if app.search.tree_matches {
        flags.push("tree");
    }
    if app.search.fuzzy {
        flags.push("fuzzy");
    }
    if app.streaming {
        flags.push("stream");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!("[{}]", flags.join(" "))
    }
}
