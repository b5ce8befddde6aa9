//! DOM Tree (arena-based allocation)

use crate::{DomError, ElementData, Node, NodeData, NodeId, TagId};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    /// Bumped on every structural or attribute change
    version: u32,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            version: 0,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Mutation counter; cached styles stamped with an older value are stale.
    /// Changes made through [`get_mut`](Self::get_mut) are not counted.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node {
            data: NodeData::Doctype { name: name.to_string() },
            ..Node::document()
        })
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if parent == child {
            return Err(DomError::Hierarchy("node cannot contain itself"));
        }
        let parent_node = self.get(parent).ok_or(DomError::InvalidNode(parent))?;
        if matches!(parent_node.data, NodeData::Text(_) | NodeData::Comment(_) | NodeData::Doctype { .. }) {
            return Err(DomError::Hierarchy("leaf nodes cannot have children"));
        }
        let last = parent_node.last_child;
        let child_node = self.get(child).ok_or(DomError::InvalidNode(child))?;
        if child_node.parent.is_valid() {
            return Err(DomError::Hierarchy("node is already attached"));
        }
        if child == NodeId::ROOT {
            return Err(DomError::Hierarchy("document node cannot be a child"));
        }

        {
            let child_node = &mut self.nodes[child.0 as usize];
            child_node.parent = parent;
            child_node.prev_sibling = last;
            child_node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        }
        let parent_node = &mut self.nodes[parent.0 as usize];
        if !parent_node.first_child.is_valid() {
            parent_node.first_child = child;
        }
        parent_node.last_child = child;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(name);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> Result<NodeId, DomError> {
        let id = self.create_text(content);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let node = self.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        node.as_element_mut()
            .ok_or(DomError::NotAnElement(id))?
            .set_attr(name, value);
        node.style.clear();
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.prev_sibling).filter(|p| p.is_valid())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.next_sibling).filter(|p| p.is_valid())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.first_child).filter(|p| p.is_valid())
    }

    /// Parent, if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Nearest preceding sibling that is an element
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.prev_sibling(id);
        while let Some(sib) = cur {
            if self.is_element(sib) {
                return Some(sib);
            }
            cur = self.prev_sibling(sib);
        }
        None
    }

    /// Nearest following sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.next_sibling(id);
        while let Some(sib) = cur {
            if self.is_element(sib) {
                return Some(sib);
            }
            cur = self.next_sibling(sib);
        }
        None
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Tag of an element, `None` for other node kinds
    pub fn tag(&self, id: NodeId) -> Option<TagId> {
        self.element(id).map(|e| e.tag)
    }

    /// Attribute lookup by case-sensitive name
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    /// Find the first element with the given tag in document order
    pub fn find_tag(&self, tag: TagId) -> Option<NodeId> {
        self.descendants(self.root()).find(|&id| self.tag(id) == Some(tag))
    }

    /// Find an element by its `id` attribute
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    /// Depth-first pre-order traversal below `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let mut kids: Vec<NodeId> = self.children(next).collect();
            kids.reverse();
            stack.extend(kids);
            Some(next)
        })
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.next_sibling(cur);
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StyleStamp;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let root = tree.root();
        let div = tree.append_element(root, "div").unwrap();
        let text = tree.append_text(div, "hello").unwrap();
        let p = tree.append_element(div, "p").unwrap();
        (tree, div, text, p)
    }

    #[test]
    fn test_links() {
        let (tree, div, text, p) = sample();
        assert_eq!(tree.parent(p), Some(div));
        assert_eq!(tree.first_child(div), Some(text));
        assert_eq!(tree.prev_sibling(p), Some(text));
        assert_eq!(tree.next_sibling(text), Some(p));
        assert_eq!(tree.next_sibling(p), None);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_element_siblings_skip_text() {
        let (tree, _, _, p) = sample();
        assert_eq!(tree.prev_element_sibling(p), None);
        assert_eq!(tree.parent_element(p).and_then(|d| tree.tag(d)), Some(TagId::Div));
        assert_eq!(tree.parent_element(tree.parent(p).unwrap()), None);
    }

    #[test]
    fn test_append_errors() {
        let (mut tree, div, text, p) = sample();
        assert!(matches!(tree.append_child(text, p), Err(DomError::Hierarchy(_))));
        assert!(matches!(tree.append_child(div, p), Err(DomError::Hierarchy(_))));
        assert!(matches!(
            tree.append_child(div, NodeId(999)),
            Err(DomError::InvalidNode(_))
        ));
        assert!(matches!(tree.set_attr(text, "id", "x"), Err(DomError::NotAnElement(_))));
    }

    #[test]
    fn test_mutations_bump_version() {
        let (mut tree, div, _, p) = sample();
        let before = tree.version();
        tree.set_attr(p, "class", "a").unwrap();
        assert!(tree.version() != before);

        let stamp = StyleStamp { sheet: 1, generation: 0, tree_version: tree.version(), entry: None };
        tree.get(p).unwrap().style.set(stamp);
        tree.set_attr(p, "class", "b").unwrap();
        assert!(tree.get(p).unwrap().style.get().is_none());

        let v = tree.version();
        tree.append_element(div, "span").unwrap();
        assert!(tree.version() != v);
        assert!(tree.set_attr(div, "id", "x").is_ok());
        assert!(tree.set_attr(NodeId(999), "id", "x").is_err());
    }

    #[test]
    fn test_descendants_order() {
        let mut tree = DomTree::new();
        let html = tree.append_element(tree.root(), "html").unwrap();
        let body = tree.append_element(html, "body").unwrap();
        let a = tree.append_element(body, "a").unwrap();
        let b = tree.append_element(body, "b").unwrap();
        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![html, body, a, b]);
        tree.set_attr(b, "id", "x").unwrap();
        assert_eq!(tree.find_by_id("x"), Some(b));
        assert_eq!(tree.find_tag(TagId::A), Some(a));
    }
}
