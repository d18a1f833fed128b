//! Tree model + selection list, with identity side indices.
//!
//! Elements are shared as `Rc<T>`; the element index keys on the allocation
//! address, the identity index on the key returned by an optional
//! [`IdentityProvider`]. Both indices are only ever written from the splice
//! creation/deletion hooks, so they track actual tree membership.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use super::filter::{IdentityProvider, TreeFilter};
use super::list::{ListHost, SelectionList};
use super::model::{SpliceObserver, TreeModel, TreeModelOptions};
use super::node::{Location, NodeId, TreeElement, TreeNode};
use crate::error::{Result, TreeError};

/// Construction options for [`Tree`].
pub struct TreeOptions<T> {
    /// Initial `collapsed` state of elements that leave it unset. Default `false`.
    pub collapse_by_default: bool,
    /// Matches elements across replacements when references differ. Default none.
    pub identity: Option<Box<dyn IdentityProvider<T>>>,
}

impl<T> Default for TreeOptions<T> {
    fn default() -> Self {
        Self {
            collapse_by_default: false,
            identity: None,
        }
    }
}

/// Address of the shared element allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ElementKey(*const ());

fn key_of<T>(element: &Rc<T>) -> ElementKey {
    ElementKey(Rc::as_ptr(element) as *const ())
}

/// Keeps the side indices in step with a splice.
///
/// Creations are reported before deletions, so a deleted node only drops an
/// entry that still points at itself; an element moved by the same splice
/// keeps its new mapping.
struct IndexSync<'a, T> {
    nodes: &'a mut HashMap<ElementKey, NodeId>,
    nodes_by_identity: &'a mut HashMap<String, NodeId>,
    identity: Option<&'a dyn IdentityProvider<T>>,
}

impl<T> SpliceObserver<Rc<T>> for IndexSync<'_, T> {
    fn on_create(&mut self, id: NodeId, node: &TreeNode<Rc<T>>) {
        if let Some(identity) = self.identity {
            self.nodes_by_identity
                .insert(identity.get_id(node.element()), id);
        }
        self.nodes.insert(key_of(node.element()), id);
    }

    fn on_delete(&mut self, id: NodeId, node: &TreeNode<Rc<T>>) {
        let key = key_of(node.element());
        if self.nodes.get(&key) == Some(&id) {
            self.nodes.remove(&key);
        }
        if let Some(identity) = self.identity {
            let external = identity.get_id(node.element());
            if self.nodes_by_identity.get(&external) == Some(&id) {
                self.nodes_by_identity.remove(&external);
            }
        }
    }
}

pub struct Tree<T> {
    model: TreeModel<Rc<T>>,
    list: SelectionList<NodeId>,
    nodes: HashMap<ElementKey, NodeId>,
    nodes_by_identity: HashMap<String, NodeId>,
    identity: Option<Box<dyn IdentityProvider<T>>>,
}

impl<T: 'static> Tree<T> {
    pub fn new(root_element: T, options: TreeOptions<T>) -> Self {
        Self {
            model: TreeModel::new(
                Rc::new(root_element),
                TreeModelOptions {
                    collapse_by_default: options.collapse_by_default,
                },
            ),
            list: SelectionList::new(),
            nodes: HashMap::new(),
            nodes_by_identity: HashMap::new(),
            identity: options.identity,
        }
    }

    pub fn model(&self) -> &TreeModel<Rc<T>> {
        &self.model
    }

    pub fn list(&self) -> &SelectionList<NodeId> {
        &self.list
    }

    /// Mutable access for selection changes and subscriptions.
    pub fn list_mut(&mut self) -> &mut SelectionList<NodeId> {
        &mut self.list
    }

    /// Number of nodes reachable through the element index.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode<Rc<T>>> {
        self.model.node(id)
    }

    /// Node rendered at `index` of the selection list.
    pub fn get_item(&self, index: usize) -> Option<&TreeNode<Rc<T>>> {
        self.list
            .get_item(index)
            .and_then(|id| self.model.node(*id))
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.list.selected_item().copied()
    }

    pub fn node_by_element(&self, element: &Rc<T>) -> Option<NodeId> {
        self.nodes.get(&key_of(element)).copied()
    }

    pub fn node_by_identity(&self, id: &str) -> Result<Option<NodeId>> {
        if self.identity.is_none() {
            return Err(TreeError::MissingIdentityProvider);
        }
        Ok(self.nodes_by_identity.get(id).copied())
    }

    /// Structural splice that keeps the side indices current.
    ///
    /// Like [`TreeModel::splice`], the render list is left alone until
    /// [`Tree::rerender`].
    pub fn splice(
        &mut self,
        location: &[usize],
        delete_count: usize,
        to_insert: Vec<TreeElement<Rc<T>>>,
    ) -> Result<Vec<TreeElement<Rc<T>>>> {
        let mut sync = IndexSync {
            nodes: &mut self.nodes,
            nodes_by_identity: &mut self.nodes_by_identity,
            identity: self.identity.as_deref(),
        };
        self.model
            .splice_with(location, delete_count, to_insert, &mut sync)
    }

    /// Replace all children of `target` (the root when `None`) with `children`.
    ///
    /// Elements matching an existing node by reference, or else by identity
    /// key, inherit its `collapsed`/`collapsible` flags unless they set them.
    /// Nodes are always rebuilt; only those flags carry over.
    pub fn set_children(
        &mut self,
        children: Vec<TreeElement<Rc<T>>>,
        target: Option<&Rc<T>>,
    ) -> Result<()> {
        let location = match target {
            None => Vec::new(),
            Some(element) => self.element_location(element)?,
        };
        self.set_children_at(location, children)
    }

    /// [`Tree::set_children`] with the target addressed by identity key.
    pub fn set_children_of_identity(
        &mut self,
        children: Vec<TreeElement<Rc<T>>>,
        id: &str,
    ) -> Result<()> {
        let node = self.node_by_identity(id)?.ok_or_else(|| {
            warn!(id, "set_children target not found");
            TreeError::ElementNotFound(id.to_string())
        })?;
        let location = self.model.get_node_location(node)?;
        self.set_children_at(location, children)
    }

    /// Replace children and rebuild the render list in one step.
    pub fn replace_children(
        &mut self,
        children: Vec<TreeElement<Rc<T>>>,
        id: Option<&str>,
    ) -> Result<()> {
        match id {
            Some(id) => self.set_children_of_identity(children, id)?,
            None => self.set_children(children, None)?,
        }
        self.rerender();
        Ok(())
    }

    fn set_children_at(
        &mut self,
        mut location: Location,
        children: Vec<TreeElement<Rc<T>>>,
    ) -> Result<()> {
        let children = self.preserve_collapse_state(children);
        debug!(?location, count = children.len(), "reconciling children");
        location.push(0);
        self.splice(&location, usize::MAX, children)?;
        Ok(())
    }

    fn preserve_collapse_state(
        &self,
        elements: Vec<TreeElement<Rc<T>>>,
    ) -> Vec<TreeElement<Rc<T>>> {
        elements
            .into_iter()
            .map(|mut tree_element| {
                if let Some(node) = self
                    .find_existing(&tree_element.element)
                    .and_then(|id| self.model.node(id))
                {
                    tree_element.collapsible = tree_element.collapsible.or(Some(node.collapsible()));
                    tree_element.collapsed = tree_element.collapsed.or(Some(node.collapsed()));
                }
                tree_element.children =
                    self.preserve_collapse_state(std::mem::take(&mut tree_element.children));
                tree_element
            })
            .collect()
    }

    fn find_existing(&self, element: &Rc<T>) -> Option<NodeId> {
        if let Some(id) = self.node_by_element(element) {
            return Some(id);
        }
        let identity = self.identity.as_deref()?;
        self.nodes_by_identity.get(&identity.get_id(element)).copied()
    }

    /// Location of an element, looked up by reference and then by identity.
    pub fn element_location(&self, element: &Rc<T>) -> Result<Location> {
        let node = match self.node_by_element(element) {
            Some(id) => id,
            None => {
                let identity = self
                    .identity
                    .as_deref()
                    .ok_or(TreeError::MissingIdentityProvider)?;
                let external = identity.get_id(element);
                match self.nodes_by_identity.get(&external) {
                    Some(id) => *id,
                    None => {
                        warn!(id = %external, "tree element not found");
                        return Err(TreeError::ElementNotFound(external));
                    }
                }
            }
        };
        self.model.get_node_location(node)
    }

    /// Flatten the model and push the whole result into the selection list.
    pub fn rerender(&mut self) {
        let items = self.model.as_list();
        let len = self.list.len();
        self.list.splice(0, len, items);
    }

    /// Install a filter and rerender.
    pub fn set_filter(&mut self, filter: Option<Box<dyn TreeFilter<T>>>) {
        let filter = filter.map(|f| -> Box<dyn TreeFilter<Rc<T>>> {
            Box::new(move |element: &Rc<T>| f.evaluate(element))
        });
        self.model.set_filter(filter);
        self.rerender();
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<bool> {
        self.model.set_collapsed(id, collapsed, &mut self.list)
    }

    pub fn toggle_collapsed(&mut self, id: NodeId) -> Result<bool> {
        let collapsed = self.model.node(id).ok_or(TreeError::NodeNotFound)?.collapsed();
        self.set_collapsed(id, !collapsed)
    }

    /// Translate a node into its current render list index, if it is listed.
    pub fn list_index_of(&self, id: NodeId) -> Result<Option<usize>> {
        let location = self.model.get_node_location(id)?;
        if location.is_empty() {
            return Ok(None);
        }
        let position = self.model.get_tree_node_with_list_index(&location)?;
        Ok(position.visible.then_some(position.list_index))
    }

    pub fn dispose(&mut self) {
        self.model.dispose();
        self.list.dispose();
    }
}
