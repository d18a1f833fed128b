use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use instrument_tree::config::AppConfig;
use instrument_tree::error::{Result, TreeError};
use instrument_tree::instruments::{self, Instrument, SearchOptions};
use instrument_tree::tree::{ListHost, Tree, TreeElement, TreeOptions};

/// Application mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Keys edit the search query.
    Search,
}

/// Main application state.
pub struct App {
    pub tree: Tree<Instrument>,
    pub mode: AppMode,
    pub query: String,
    pub search: SearchOptions,
    pub streaming: bool,
    pub should_quit: bool,
    /// First list row drawn at the top of the tree panel.
    pub scroll_offset: usize,
    /// Height of rows without their own hint.
    pub row_height: u16,
    pub status_message: Option<(String, Instant)>,
    tickers: Vec<String>,
    prices_per_contract: usize,
    rng: StdRng,
    spliced: Rc<Cell<bool>>,
}

impl App {
    /// Build the tree from `data`, or from generated instruments when `None`.
    pub fn new(config: &AppConfig, data: Option<Vec<TreeElement<Instrument>>>) -> Result<Self> {
        let mut tree = Tree::new(
            Instrument::new("", ""),
            TreeOptions {
                collapse_by_default: config.collapse_by_default(),
                identity: Some(instruments::identity()),
            },
        );

        let spliced = Rc::new(Cell::new(false));
        let flag = Rc::clone(&spliced);
        tree.list_mut().on_splice(move |_| flag.set(true));

        let mut app = Self {
            tree,
            mode: AppMode::Normal,
            query: String::new(),
            search: SearchOptions {
                tree_matches: config.expand_matches(),
                fuzzy: config.fuzzy(),
            },
            streaming: config.feed_enabled(),
            should_quit: false,
            scroll_offset: 0,
            row_height: config.row_height(),
            status_message: None,
            tickers: config.tickers(),
            prices_per_contract: config.prices_per_contract(),
            rng: StdRng::from_entropy(),
            spliced,
        };

        let data = match data {
            Some(data) => data,
            None => app.generate(),
        };
        app.tree
            .replace_children(instruments::into_shared(data), None)?;
        app.sync_selection();

        info!(
            rows = app.tree.list().len(),
            nodes = app.tree.size(),
            "instrument tree loaded"
        );
        Ok(app)
    }

    fn generate(&mut self) -> Vec<TreeElement<Instrument>> {
        instruments::generate(&self.tickers, self.prices_per_contract, &mut self.rng)
    }

    /// Number of rows in the render list.
    pub fn row_count(&self) -> usize {
        self.tree.list().len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.tree.list().selected_index()
    }

    pub fn selected_instrument(&self) -> Option<&Instrument> {
        let id = self.tree.selected_node()?;
        self.tree.node(id).map(|node| &**node.element())
    }

    /// Terminal lines taken by the row at `index`.
    pub fn row_height_at(&self, index: usize) -> u16 {
        self.tree
            .get_item(index)
            .and_then(|node| node.height())
            .unwrap_or(self.row_height)
            .max(1)
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    fn report(&mut self, err: TreeError) {
        warn!(error = %err, "tree operation failed");
        self.set_status_message(format!("⚠ {}", err));
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Selection ───────────────────────────────────────────────────────────

    fn select(&mut self, index: Option<usize>) {
        self.tree.list_mut().set_selected(index);
    }

    /// After a splice, keep the cursor inside the list.
    fn sync_selection(&mut self) {
        if !self.spliced.replace(false) {
            return;
        }
        let len = self.row_count();
        let clamped = match self.selected_index() {
            _ if len == 0 => None,
            None => Some(0),
            Some(index) => Some(index.min(len - 1)),
        };
        self.select(clamped);
        if self.scroll_offset >= len {
            self.scroll_offset = len.saturating_sub(1);
        }
    }

    /// Run a tree update that rebuilds the render list, then put the cursor
    /// back on the same instrument when it is still listed.
    fn keep_selection<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Tree<Instrument>) -> Result<()>,
    {
        let selected = self.selected_instrument().map(|i| i.id.clone());
        if let Err(err) = update(&mut self.tree) {
            self.report(err);
        }
        if let Some(id) = selected {
            match self.index_of_identity(&id) {
                Ok(Some(index)) => self.select(Some(index)),
                Ok(None) => {}
                Err(err) => self.report(err),
            }
        }
        self.sync_selection();
    }

    fn index_of_identity(&self, id: &str) -> Result<Option<usize>> {
        match self.tree.node_by_identity(id)? {
            Some(node) => self.tree.list_index_of(node),
            None => Ok(None),
        }
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        let len = self.row_count();
        match self.selected_index() {
            Some(index) if index + 1 < len => self.select(Some(index + 1)),
            None if len > 0 => self.select(Some(0)),
            _ => {}
        }
    }

    /// Move selection up by one row.
    pub fn select_previous(&mut self) {
        if let Some(index) = self.selected_index() {
            if index > 0 {
                self.select(Some(index - 1));
            }
        }
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.select(Some(0));
        }
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        let len = self.row_count();
        if len > 0 {
            self.select(Some(len - 1));
        }
    }

    // ── Collapse ────────────────────────────────────────────────────────────

    fn set_selected_collapsed(&mut self, collapsed: bool) -> Option<bool> {
        let node = self.tree.selected_node()?;
        let result = self.tree.set_collapsed(node, collapsed);
        self.sync_selection();
        match result {
            Ok(changed) => Some(changed),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Expand the selected row.
    pub fn expand_selected(&mut self) {
        self.set_selected_collapsed(false);
    }

    /// Collapse the selected row, or jump to its parent row if nothing changed.
    pub fn collapse_selected(&mut self) {
        if self.set_selected_collapsed(true) != Some(false) {
            return;
        }
        let Some(parent) = self
            .tree
            .selected_node()
            .and_then(|id| self.tree.node(id))
            .and_then(|node| node.parent())
        else {
            return;
        };
        match self.tree.list_index_of(parent) {
            Ok(Some(index)) => self.select(Some(index)),
            Ok(None) => {}
            Err(err) => self.report(err),
        }
    }

    /// Toggle the selected row.
    pub fn toggle_selected(&mut self) {
        let Some(node) = self.tree.selected_node() else {
            return;
        };
        let result = self.tree.toggle_collapsed(node);
        self.sync_selection();
        if let Err(err) = result {
            self.report(err);
        }
    }

    // ── Search ──────────────────────────────────────────────────────────────

    pub fn start_search(&mut self) {
        self.mode = AppMode::Search;
    }

    /// Leave search mode, keeping the query.
    pub fn finish_search(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Leave search mode and drop the filter.
    pub fn cancel_search(&mut self) {
        self.mode = AppMode::Normal;
        if !self.query.is_empty() {
            self.query.clear();
            self.apply_filter();
        }
    }

    pub fn search_input_char(&mut self, c: char) {
        self.query.push(c);
        self.apply_filter();
    }

    pub fn search_delete_char(&mut self) {
        if self.query.pop().is_some() {
            self.apply_filter();
        }
    }

    /// Install the filter for the current query and options.
    pub fn apply_filter(&mut self) {
        let filter = instruments::search_filter(&self.query, self.search);
        debug!(query = %self.query, search = ?self.search, "applying search filter");
        self.keep_selection(move |tree| {
            tree.set_filter(filter);
            Ok(())
        });
    }

    /// Switch matches between revealing their subtree and showing only themselves.
    pub fn toggle_tree_matches(&mut self) {
        self.search.tree_matches = !self.search.tree_matches;
        self.set_status_message(format!(
            "Tree matches {}",
            if self.search.tree_matches { "on" } else { "off" }
        ));
        self.apply_filter();
    }

    pub fn toggle_fuzzy(&mut self) {
        self.search.fuzzy = !self.search.fuzzy;
        self.set_status_message(format!(
            "Fuzzy search {}",
            if self.search.fuzzy { "on" } else { "off" }
        ));
        self.apply_filter();
    }

    // ── Streaming ───────────────────────────────────────────────────────────

    pub fn toggle_streaming(&mut self) {
        self.streaming = !self.streaming;
        info!(streaming = self.streaming, "feed toggled");
        self.set_status_message(format!(
            "Streaming {}",
            if self.streaming { "on" } else { "off" }
        ));
    }

    /// Feed interval elapsed.
    pub fn handle_refresh(&mut self) {
        if self.streaming {
            self.refresh();
        }
    }

    /// Replace all instruments with freshly generated ones.
    pub fn refresh(&mut self) {
        let data = instruments::into_shared(self.generate());
        self.keep_selection(move |tree| tree.replace_children(data, None));
        debug!(rows = self.row_count(), "instrument data refreshed");
    }

    // ── Scrolling ───────────────────────────────────────────────────────────

    /// Adjust the scroll offset so the selected row fits in `height` lines.
    pub fn update_scroll(&mut self, height: usize) {
        let Some(selected) = self.selected_index() else {
            self.scroll_offset = 0;
            return;
        };
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
            return;
        }
        while self.scroll_offset < selected && self.lines_between(self.scroll_offset, selected) > height
        {
            self.scroll_offset += 1;
        }
    }

    fn lines_between(&self, first: usize, last: usize) -> usize {
        (first..=last)
            .map(|index| self.row_height_at(index) as usize)
            .sum()
    }
}
