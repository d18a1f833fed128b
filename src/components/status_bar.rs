use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " /:search t:tree f:fuzzy s:stream q:quit ";

/// One-line bar: search query, row position, toggles and key hints, or a
/// transient status message.
pub struct StatusBarWidget<'a> {
    query: &'a str,
    searching: bool,
    position: &'a str,
    flags: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(query: &'a str, position: &'a str, flags: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            query,
            searching: false,
            position,
            flags,
            theme,
            status_message: None,
        }
    }

    /// Show the query as an active prompt.
    pub fn searching(mut self, searching: bool) -> Self {
        self.searching = searching;
        self
    }

    pub fn status_message(mut self, msg: &'a str) -> Self {
        self.status_message = Some(msg);
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = Style::default().fg(self.theme.info_fg);
            let display: String = msg.chars().take(width).collect();
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let search = if self.searching {
            format!("/{}█", self.query)
        } else if self.query.is_empty() {
            String::new()
        } else {
            format!("/{}", self.query)
        };

        let search_style = Style::default()
            .fg(self.theme.search_fg)
            .add_modifier(Modifier::BOLD);
        let position_style = Style::default().fg(self.theme.status_fg);
        let flags_style = Style::default().fg(self.theme.accent_fg);
        let hints_style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);

        let mut spans = Vec::new();
        if !search.is_empty() {
            spans.push(Span::styled(search, search_style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(self.position.to_string(), position_style));
        if !self.flags.is_empty() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(self.flags.to_string(), flags_style));
        }

        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let hints_len = KEY_HINTS.len();
        if used + hints_len <= width {
            spans.push(Span::raw(" ".repeat(width - used - hints_len)));
            spans.push(Span::styled(KEY_HINTS, hints_style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
