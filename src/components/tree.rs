use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use instrument_tree::instruments::Instrument;
use instrument_tree::tree::{Tree, TreeNode};

use crate::theme::ThemeColors;

/// Columns of indentation per depth level.
const INDENT: usize = 2;

/// Renders the window of the render list starting at `scroll_offset`.
///
/// Each row takes its node's height hint in lines, or `row_height`; the
/// label sits on the first line.
pub struct TreeWidget<'a> {
    tree: &'a Tree<Instrument>,
    theme: &'a ThemeColors,
    scroll_offset: usize,
    row_height: u16,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a Tree<Instrument>, theme: &'a ThemeColors) -> Self {
        Self {
            tree,
            theme,
            scroll_offset: 0,
            row_height: 1,
            block: None,
        }
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    pub fn row_height(mut self, height: u16) -> Self {
        self.row_height = height.max(1);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Chevron for rows that can be expanded or collapsed.
    fn indicator(node: &TreeNode<Rc<Instrument>>) -> &'static str {
        if node.children().is_empty() {
            "  "
        } else if node.collapsed() {
            "▸ "
        } else {
            "▾ "
        }
    }

    fn label_style(&self, node: &TreeNode<Rc<Instrument>>) -> Style {
        match node.element().price {
            Some(price) if price > 0.0 => Style::default().fg(self.theme.price_up_fg),
            Some(price) if price < 0.0 => Style::default().fg(self.theme.price_down_fg),
            Some(_) => Style::default().fg(self.theme.tree_fg),
            None if node.depth() == 1 => Style::default()
                .fg(self.theme.tree_branch_fg)
                .add_modifier(Modifier::BOLD),
            None => Style::default().fg(self.theme.tree_fg),
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let list = self.tree.list();
        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let bottom = inner_area.y + inner_area.height;
        let mut y = inner_area.y;
        let mut index = self.scroll_offset;

        while y < bottom {
            let Some(node) = self.tree.get_item(index) else {
                break;
            };
            let height = node.height().unwrap_or(self.row_height).max(1);
            let lines = height.min(bottom - y);
            let is_selected = list.is_selected(index);

            if is_selected {
                let row = Rect::new(inner_area.x, y, inner_area.width, lines);
                buf.set_style(
                    row,
                    Style::default()
                        .bg(self.theme.tree_selected_bg)
                        .fg(self.theme.tree_selected_fg),
                );
            }

            let indent = " ".repeat(node.depth().saturating_sub(1) * INDENT);
            let mut label_style = self.label_style(node);
            if is_selected {
                label_style = label_style
                    .bg(self.theme.tree_selected_bg)
                    .add_modifier(Modifier::BOLD);
            }
            let line = Line::from(vec![
                Span::raw(indent),
                Span::styled(
                    Self::indicator(node),
                    Style::default().fg(self.theme.tree_chevron_fg),
                ),
                Span::styled(node.element().label(), label_style),
            ]);
            buf.set_line(inner_area.x, y, &line, inner_area.width);

            y += lines;
            index += 1;
        }
    }
}
