//! Arena-backed tree model.
//!
//! Nodes live in a slot table and refer to each other through [`NodeId`]
//! handles. Every mutation keeps three derived quantities current:
//! `render_node_count`, `visible_child_index` and `visible_children_count`.
//! The render list is the pre-order sequence of visible nodes whose
//! ancestors are all visible and expanded; the root itself is never listed.

use std::ops::Index;

use tracing::{debug, trace};

use super::event::{Emitter, Subscription};
use super::filter::{TreeFilter, TreeVisibility};
use super::list::ListHost;
use super::node::{Location, NodeId, TreeElement, TreeNode};
use crate::error::{Result, TreeError};

/// Model-wide defaults applied when an inserted element leaves a field unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeModelOptions {
    /// Initial `collapsed` state of elements without an explicit one. Default `false`.
    pub collapse_by_default: bool,
}

/// Hooks invoked by [`TreeModel::splice_with`] for every created and deleted
/// node, descendants included, in pre-order.
///
/// All creations are reported before any deletion.
pub trait SpliceObserver<T> {
    fn on_create(&mut self, _id: NodeId, _node: &TreeNode<T>) {}
    fn on_delete(&mut self, _id: NodeId, _node: &TreeNode<T>) {}
}

impl<T> SpliceObserver<T> for () {}

/// A location translated into a render list position.
///
/// `list_index` is only meaningful when `visible` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPosition {
    pub node: NodeId,
    pub list_index: usize,
    pub visible: bool,
}

struct Slot<T> {
    generation: u32,
    node: Option<TreeNode<T>>,
}

pub struct TreeModel<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    root: NodeId,
    len: usize,
    filter: Option<Box<dyn TreeFilter<T>>>,
    /// Set when a filter is removed: the next flatten treats every node as visible.
    restore_visibility: bool,
    options: TreeModelOptions,
    on_did_filter_change: Emitter<()>,
}

impl<T> TreeModel<T> {
    pub fn new(root_element: T, options: TreeModelOptions) -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(TreeNode::root(root_element)),
            }],
            free: Vec::new(),
            root,
            len: 0,
            filter: None,
            restore_visibility: false,
            options,
            on_did_filter_change: Emitter::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> TreeModelOptions {
        self.options
    }

    /// Resolve a handle; `None` once the node has been deleted.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<T>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn at_mut(&mut self, id: NodeId) -> &mut TreeNode<T> {
        self.node_mut(id).expect("stale tree node handle")
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, the root excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    pub fn filter(&self) -> Option<&dyn TreeFilter<T>> {
        self.filter.as_deref()
    }

    /// Install or remove the filter and fire the filter-changed notification.
    ///
    /// The render list is not rebuilt here; call [`TreeModel::as_list`] afterwards.
    pub fn set_filter(&mut self, filter: Option<Box<dyn TreeFilter<T>>>) {
        if filter.is_none() && self.filter.is_some() {
            self.restore_visibility = true;
        }
        self.filter = filter;
        debug!(installed = self.filter.is_some(), "tree filter changed");
        self.on_did_filter_change.fire(&());
    }

    pub fn on_did_filter_change<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&()) + 'static,
    {
        self.on_did_filter_change.subscribe(listener)
    }

    pub fn unsubscribe_filter_change(&mut self, subscription: Subscription) -> bool {
        self.on_did_filter_change.unsubscribe(subscription)
    }

    pub fn dispose(&mut self) {
        self.on_did_filter_change.dispose();
    }

    // ── Structural splice ───────────────────────────────────────────────────

    /// [`TreeModel::splice_with`] without creation/deletion hooks.
    pub fn splice(
        &mut self,
        location: &[usize],
        delete_count: usize,
        to_insert: Vec<TreeElement<T>>,
    ) -> Result<Vec<TreeElement<T>>> {
        self.splice_with(location, delete_count, to_insert, &mut ())
    }

    /// Replace `delete_count` children at `location` with new subtrees.
    ///
    /// The leading indices of `location` address the parent, the trailing one
    /// is the insertion point among its children. `delete_count` is clamped to
    /// the children after the insertion point. Returns the deleted subtrees.
    pub fn splice_with(
        &mut self,
        location: &[usize],
        delete_count: usize,
        to_insert: Vec<TreeElement<T>>,
        observer: &mut dyn SpliceObserver<T>,
    ) -> Result<Vec<TreeElement<T>>> {
        let Some(&last) = location.last() else {
            return Err(TreeError::InvalidLocation(Vec::new()));
        };
        let parent = self.get_parent_node_with_list_index(location)?.node;
        let (parent_depth, parent_visible) = {
            let p = &self[parent];
            (p.depth, p.visible)
        };

        let mut created = Vec::new();
        let new_ids: Vec<NodeId> = to_insert
            .into_iter()
            .map(|el| self.create_tree_node(el, parent, parent_depth + 1, parent_visible, &mut created))
            .collect();

        // Number the new subtrees after the nearest visible sibling before the insertion point.
        let visible_child_start = self[parent].children[..last]
            .iter()
            .rev()
            .map(|c| &self[*c])
            .find(|c| c.visible)
            .and_then(|c| c.visible_child_index)
            .map_or(0, |i| i + 1);

        let mut next_visible_index = visible_child_start;
        let mut inserted_render = 0;
        for id in &new_ids {
            let node = self.at_mut(*id);
            inserted_render += node.render_node_count;
            if node.visible {
                node.visible_child_index = Some(next_visible_index);
                next_visible_index += 1;
            }
        }

        let inserted_len = new_ids.len();
        let end = last
            .saturating_add(delete_count)
            .min(self[parent].children.len());
        let deleted_ids: Vec<NodeId> = self.at_mut(parent)
            .children
            .splice(last..end, new_ids)
            .collect();

        let deleted_render: usize = deleted_ids
            .iter()
            .map(|id| &self[*id])
            .filter(|n| n.visible)
            .map(|n| n.render_node_count)
            .sum();

        // Siblings after the splice point shift by the net visible delta.
        for i in last + inserted_len..self[parent].children.len() {
            let sibling = self[parent].children[i];
            let node = self.at_mut(sibling);
            if node.visible {
                node.visible_child_index = Some(next_visible_index);
                next_visible_index += 1;
            }
        }
        self.at_mut(parent).visible_children_count = next_visible_index;

        let delta = inserted_render as isize - deleted_render as isize;
        self.update_ancestors_render_count(parent, delta);

        debug!(
            ?location,
            inserted = created.len(),
            deleted = deleted_ids.len(),
            render_delta = delta,
            "tree splice"
        );

        for id in created {
            observer.on_create(id, &self[id]);
        }

        Ok(deleted_ids
            .into_iter()
            .map(|id| self.remove_subtree(id, observer))
            .collect())
    }

    fn create_tree_node(
        &mut self,
        tree_element: TreeElement<T>,
        parent: NodeId,
        depth: usize,
        visible: bool,
        created: &mut Vec<NodeId>,
    ) -> NodeId {
        let TreeElement {
            element,
            children,
            collapsed,
            collapsible,
            height,
        } = tree_element;

        let collapsible = collapsible.unwrap_or(collapsed.is_some()) || !children.is_empty();
        let collapsed = collapsed.unwrap_or(self.options.collapse_by_default);

        let id = self.alloc(TreeNode {
            element,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            collapsible,
            collapsed,
            visible,
            visible_children_count: 0,
            visible_child_index: None,
            render_node_count: 0,
            height,
        });
        created.push(id);

        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.create_tree_node(child, id, depth + 1, visible, created))
            .collect();

        let mut visible_children_count = 0;
        let mut child_render = 0;
        for child in &child_ids {
            let node = self.at_mut(*child);
            child_render += node.render_node_count;
            if node.visible {
                node.visible_child_index = Some(visible_children_count);
                visible_children_count += 1;
            }
        }

        let node = self.at_mut(id);
        node.children = child_ids;
        node.visible_children_count = visible_children_count;
        node.render_node_count = if !node.visible {
            0
        } else if node.collapsed {
            1
        } else {
            1 + child_render
        };
        id
    }

    fn remove_subtree(&mut self, id: NodeId, observer: &mut dyn SpliceObserver<T>) -> TreeElement<T> {
        observer.on_delete(id, &self[id]);
        let children = std::mem::take(&mut self.at_mut(id).children);
        let children = children
            .into_iter()
            .map(|child| self.remove_subtree(child, observer))
            .collect();
        let node = self.release(id);
        TreeElement {
            element: node.element,
            children,
            collapsed: Some(node.collapsed),
            collapsible: Some(node.collapsible),
            height: node.height,
        }
    }

    /// Apply a render count change to `node` and every ancestor above it.
    ///
    /// Stops at the first hidden or collapsed node: its own count does not
    /// depend on its descendants.
    fn update_ancestors_render_count(&mut self, node: NodeId, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            let node = self.at_mut(id);
            if !node.visible || node.collapsed {
                break;
            }
            node.render_node_count = node.render_node_count.saturating_add_signed(delta);
            current = node.parent;
        }
    }

    fn alloc(&mut self, node: TreeNode<T>) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) -> TreeNode<T> {
        let slot = &mut self.slots[id.index as usize];
        let node = slot.node.take().expect("released node must be live");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        node
    }

    // ── Collapse state ──────────────────────────────────────────────────────

    /// Collapse or expand `id`, patching the affected block of `list`.
    ///
    /// Returns `false` without changing anything for the root, for
    /// non-collapsible nodes, and when the node is already in that state.
    /// Only the entries after the node's own row are replaced, and only when
    /// the node is currently part of the render list.
    pub fn set_collapsed(
        &mut self,
        id: NodeId,
        collapsed: bool,
        list: &mut dyn ListHost<NodeId>,
    ) -> Result<bool> {
        let location = self.get_node_location(id)?;
        if location.is_empty() {
            return Ok(false);
        }
        {
            let node = &self[id];
            if !node.collapsible || node.collapsed == collapsed {
                return Ok(false);
            }
        }

        let position = self.get_tree_node_with_list_index(&location)?;
        let previous_render_count = self[id].render_node_count;
        self.at_mut(id).collapsed = collapsed;

        let mut block = Vec::new();
        let current_render_count = self.update_node_after_collapse_change(id, &mut block);
        if let Some(parent) = self[id].parent {
            self.update_ancestors_render_count(
                parent,
                current_render_count as isize - previous_render_count as isize,
            );
        }

        trace!(
            ?location,
            collapsed,
            previous_render_count,
            current_render_count,
            revealed = position.visible,
            "collapse state changed"
        );

        if position.visible {
            list.splice(
                position.list_index + 1,
                previous_render_count.saturating_sub(1),
                block.into_iter().skip(1).collect(),
            );
        }
        Ok(true)
    }

    /// Recompute the render block of `id` for its current collapse state.
    fn update_node_after_collapse_change(&mut self, id: NodeId, result: &mut Vec<NodeId>) -> usize {
        if !self[id].visible {
            return 0;
        }
        result.push(id);
        let mut count = 1;
        if !self[id].collapsed {
            for i in 0..self[id].children.len() {
                let child = self[id].children[i];
                count += self.update_node_after_collapse_change(child, result);
            }
        }
        self.at_mut(id).render_node_count = count;
        count
    }

    // ── Flattening ──────────────────────────────────────────────────────────

    /// Re-evaluate visibility for the whole tree and return the render list.
    pub fn as_list(&mut self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let reset = std::mem::take(&mut self.restore_visibility);
        self.to_list(self.root, TreeVisibility::Visible, &mut result, true, reset);
        debug!(len = result.len(), filtered = self.filter.is_some(), "tree flattened");
        result
    }

    fn filter_node(&self, id: NodeId, parent_visibility: TreeVisibility, reset: bool) -> TreeVisibility {
        if parent_visibility == TreeVisibility::Tree {
            return TreeVisibility::Tree;
        }
        if let Some(filter) = &self.filter {
            return filter.evaluate(&self[id].element);
        }
        if reset || self[id].visible {
            TreeVisibility::Visible
        } else {
            TreeVisibility::Hidden
        }
    }

    fn to_list(
        &mut self,
        id: NodeId,
        parent_visibility: TreeVisibility,
        result: &mut Vec<NodeId>,
        revealed: bool,
        reset: bool,
    ) -> bool {
        let is_root = id == self.root;
        let visibility = if is_root {
            parent_visibility
        } else {
            self.filter_node(id, parent_visibility, reset)
        };

        if visibility == TreeVisibility::Hidden {
            let node = self.at_mut(id);
            node.visible = false;
            node.render_node_count = 0;
            return false;
        }

        if revealed && !is_root {
            result.push(id);
        }

        // Collapsed nodes are still descended: a Recurse verdict needs to
        // know about matches below, even if they are not revealed.
        let collapsed = self[id].collapsed;
        let mut has_visible_descendants = false;
        let mut visible_child_index = 0;
        let mut child_render = 0;
        for i in 0..self[id].children.len() {
            let child = self[id].children[i];
            has_visible_descendants |=
                self.to_list(child, visibility, result, revealed && !collapsed, reset);

            let node = self.at_mut(child);
            if node.visible {
                node.visible_child_index = Some(visible_child_index);
                visible_child_index += 1;
                child_render += node.render_node_count;
            } else {
                node.visible_child_index = None;
            }
        }

        let visible = is_root
            || match visibility {
                TreeVisibility::Recurse => has_visible_descendants,
                TreeVisibility::Visible | TreeVisibility::Tree => true,
                TreeVisibility::Hidden => false,
            };

        let node = self.at_mut(id);
        node.visible_children_count = visible_child_index;
        node.visible = visible;
        if !visible {
            node.render_node_count = 0;
            if revealed {
                result.pop();
            }
        } else if is_root {
            node.render_node_count = child_render;
        } else if collapsed {
            node.render_node_count = 1;
        } else {
            node.render_node_count = 1 + child_render;
        }
        visible
    }

    // ── Location translation ────────────────────────────────────────────────

    /// Path of sibling indices from the root to `id`.
    pub fn get_node_location(&self, id: NodeId) -> Result<Location> {
        let mut location = Vec::new();
        let mut current = self.node(id).ok_or(TreeError::NodeNotFound)?;
        let mut current_id = id;

        while let Some(parent_id) = current.parent {
            let parent = &self[parent_id];
            let index = parent
                .children
                .iter()
                .position(|c| *c == current_id)
                .ok_or(TreeError::NodeNotFound)?;
            location.push(index);
            current = parent;
            current_id = parent_id;
        }

        location.reverse();
        Ok(location)
    }

    /// Resolve the parent addressed by `location` and the render list index
    /// the trailing position maps to.
    ///
    /// `visible` tells whether an entry at that position would be rendered:
    /// every node on the path is visible and expanded.
    pub fn get_parent_node_with_list_index(&self, location: &[usize]) -> Result<ListPosition> {
        let invalid = || TreeError::InvalidLocation(location.to_vec());
        let Some((&last, path)) = location.split_last() else {
            return Err(invalid());
        };

        let mut node_id = self.root;
        let mut list_index = 0;
        let mut visible = true;

        for &index in path {
            let node = &self[node_id];
            if index >= node.children.len() {
                return Err(invalid());
            }
            // Skip the preceding siblings' rows, then this node's own row.
            list_index += self.preceding_render_count(node, index) + 1;
            visible = visible && node.visible && !node.collapsed;
            node_id = node.children[index];
        }

        let parent = &self[node_id];
        if last > parent.children.len() {
            return Err(invalid());
        }
        list_index += self.preceding_render_count(parent, last);
        visible = visible && parent.visible && !parent.collapsed;

        Ok(ListPosition {
            node: node_id,
            list_index,
            visible,
        })
    }

    fn preceding_render_count(&self, node: &TreeNode<T>, index: usize) -> usize {
        node.children[..index]
            .iter()
            .map(|c| self[*c].render_node_count)
            .sum()
    }

    /// Resolve the node at `location` and its render list index.
    pub fn get_tree_node_with_list_index(&self, location: &[usize]) -> Result<ListPosition> {
        let parent = self.get_parent_node_with_list_index(location)?;
        let index = location[location.len() - 1];
        let node_id = *self[parent.node]
            .children
            .get(index)
            .ok_or_else(|| TreeError::InvalidLocation(location.to_vec()))?;

        Ok(ListPosition {
            node: node_id,
            list_index: parent.list_index,
            visible: parent.visible && self[node_id].visible,
        })
    }
}

impl<T> Index<NodeId> for TreeModel<T> {
    type Output = TreeNode<T>;

    fn index(&self, id: NodeId) -> &TreeNode<T> {
        self.node(id).expect("stale tree node handle")
    }
}
