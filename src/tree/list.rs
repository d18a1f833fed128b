use super::event::{Emitter, Subscription};

/// Flat list host the tree model writes render blocks into.
pub trait ListHost<I> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace `delete_count` items at `start` with `items`, returning the
    /// removed items. Out-of-range bounds are clamped to the list.
    fn splice(&mut self, start: usize, delete_count: usize, items: Vec<I>) -> Vec<I>;

    fn get_item(&self, index: usize) -> Option<&I>;
}

/// Ordered list with a selection cursor and change notifications.
///
/// A splice only reports where it started; listeners requery the list for
/// its new length and content.
#[derive(Debug)]
pub struct SelectionList<I> {
    items: Vec<I>,
    selected: Option<usize>,
    on_splice: Emitter<usize>,
    on_selection_changed: Emitter<()>,
}

impl<I> Default for SelectionList<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> SelectionList<I> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            on_splice: Emitter::new(),
            on_selection_changed: Emitter::new(),
        }
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Move the cursor. Fires only when the index actually changes; the
    /// index is not checked against the list bounds.
    pub fn set_selected(&mut self, index: Option<usize>) {
        if self.selected == index {
            return;
        }
        self.selected = index;
        self.on_selection_changed.fire(&());
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    pub fn selected_item(&self) -> Option<&I> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Subscribe to splices; the listener receives the start index.
    pub fn on_splice<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&usize) + 'static,
    {
        self.on_splice.subscribe(listener)
    }

    pub fn on_selection_changed<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&()) + 'static,
    {
        self.on_selection_changed.subscribe(listener)
    }

    pub fn unsubscribe_splice(&mut self, subscription: Subscription) -> bool {
        self.on_splice.unsubscribe(subscription)
    }

    pub fn unsubscribe_selection(&mut self, subscription: Subscription) -> bool {
        self.on_selection_changed.unsubscribe(subscription)
    }

    pub fn dispose(&mut self) {
        self.on_splice.dispose();
        self.on_selection_changed.dispose();
    }
}

impl<I> ListHost<I> for SelectionList<I> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn splice(&mut self, start: usize, delete_count: usize, items: Vec<I>) -> Vec<I> {
        let start = start.min(self.items.len());
        let end = start.saturating_add(delete_count).min(self.items.len());
        let deleted: Vec<I> = self.items.splice(start..end, items).collect();
        self.on_splice.fire(&start);
        deleted
    }

    fn get_item(&self, index: usize) -> Option<&I> {
        self.items.get(index)
    }
}
