use serde::{Deserialize, Serialize};

/// Path of sibling indices from the root to a node or insertion point.
pub type Location = Vec<usize>;

/// Stable handle to a node stored in a [`TreeModel`](super::model::TreeModel) arena.
///
/// The generation guards against a freed slot being reused: a handle to a
/// deleted node never resolves to the node that later takes its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Nested description of a subtree, used both for initial construction and
/// for replacing children.
///
/// Unset fields fall back to defaults when the node is created:
/// - `collapsed`: the model's `collapse_by_default` option.
/// - `collapsible`: `true` when `collapsed` is given or `children` is non-empty.
/// - `height`: no hint; the renderer picks its own row height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TreeElement<T> {
    pub element: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeElement<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
}

impl<T> TreeElement<T> {
    pub fn new(element: T) -> Self {
        Self {
            element,
            children: Vec::new(),
            collapsed: None,
            collapsible: None,
            height: None,
        }
    }

    pub fn with_children(mut self, children: Vec<TreeElement<T>>) -> Self {
        self.children = children;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = Some(collapsible);
        self
    }

    pub fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }

    /// Convert the payload of this element and all descendants.
    pub fn map<U, F>(self, f: &mut F) -> TreeElement<U>
    where
        F: FnMut(T) -> U,
    {
        TreeElement {
            element: f(self.element),
            children: self.children.into_iter().map(|c| c.map(f)).collect(),
            collapsed: self.collapsed,
            collapsible: self.collapsible,
            height: self.height,
        }
    }

    /// Number of elements in this subtree, including itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// A node in the tree model.
///
/// Fields are maintained by the model; consumers read them through the
/// accessors. `parent` is a plain handle and never owns anything, the
/// `children` sequence is the only ownership path.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    pub(crate) element: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) depth: usize,
    pub(crate) collapsible: bool,
    pub(crate) collapsed: bool,
    pub(crate) visible: bool,
    pub(crate) visible_children_count: usize,
    pub(crate) visible_child_index: Option<usize>,
    pub(crate) render_node_count: usize,
    pub(crate) height: Option<u16>,
}

impl<T> TreeNode<T> {
    /// The synthetic root: always visible, never collapsible, depth 0.
    pub(crate) fn root(element: T) -> Self {
        Self {
            element,
            parent: None,
            children: Vec::new(),
            depth: 0,
            collapsible: false,
            collapsed: false,
            visible: true,
            visible_children_count: 0,
            visible_child_index: None,
            render_node_count: 0,
            height: None,
        }
    }

    pub fn element(&self) -> &T {
        &self.element
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn collapsible(&self) -> bool {
        self.collapsible
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn visible_children_count(&self) -> usize {
        self.visible_children_count
    }

    /// Position among the visible siblings, `None` when not visible.
    pub fn visible_child_index(&self) -> Option<usize> {
        self.visible_child_index
    }

    /// Number of render list entries this node occupies.
    pub fn render_node_count(&self) -> usize {
        self.render_node_count
    }

    pub fn height(&self) -> Option<u16> {
        self.height
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let el = TreeElement::new("AMZN")
            .with_children(vec![TreeElement::new("JAN")])
            .collapsed(true)
            .collapsible(true)
            .height(2);
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.collapsed, Some(true));
        assert_eq!(el.collapsible, Some(true));
        assert_eq!(el.height, Some(2));
    }

    #[test]
    fn map_converts_whole_subtree() {
        let el = TreeElement::new(1)
            .with_children(vec![TreeElement::new(2).with_children(vec![TreeElement::new(3)])])
            .collapsed(false);
        let mapped = el.map(&mut |n: i32| n.to_string());
        assert_eq!(mapped.element, "1");
        assert_eq!(mapped.children[0].children[0].element, "3");
        assert_eq!(mapped.collapsed, Some(false));
        assert_eq!(mapped.subtree_len(), 3);
    }

    #[test]
    fn deserialize_with_missing_optionals() {
        let json = r#"[{"element": "F", "children": [{"element": "JAN", "height": 2}]}]"#;
        let parsed: Vec<TreeElement<String>> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].element, "F");
        assert!(parsed[0].collapsed.is_none());
        assert_eq!(parsed[0].children[0].height, Some(2));
        assert!(parsed[0].children[0].children.is_empty());
    }

    #[test]
    fn deserialize_payload_without_default() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Quote {
            id: String,
        }

        let json = r#"{"element": {"id": "F"}, "children": [{"element": {"id": "F/JAN"}}]}"#;
        let parsed: TreeElement<Quote> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.element.id, "F");
        assert_eq!(parsed.children[0].element.id, "F/JAN");
        assert!(parsed.children[0].children.is_empty());
    }

    #[test]
    fn root_node_defaults() {
        let root = TreeNode::root(());
        assert!(root.is_root());
        assert!(root.visible());
        assert!(!root.collapsible());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.render_node_count(), 0);
    }
}
