//! Document - High-level document API

use crate::{DomTree, NodeId, TagId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate the <html>, <head> and <body> elements after the tree is built
    pub fn finalize(&mut self) {
        let tree = &self.tree;
        self.html_element = tree
            .children(tree.root())
            .find(|&id| tree.tag(id) == Some(TagId::Html))
            .unwrap_or(NodeId::NONE);
        let child = |tag: TagId| {
            tree.children(self.html_element)
                .find(|&id| tree.tag(id) == Some(tag))
                .unwrap_or(NodeId::NONE)
        };
        self.head_element = child(TagId::Head);
        self.body_element = child(TagId::Body);
        tracing::trace!(
            html = self.html_element.is_valid(),
            head = self.head_element.is_valid(),
            body = self.body_element.is_valid(),
            "document finalized"
        );
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        Some(self.html_element).filter(|id| id.is_valid())
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        Some(self.head_element).filter(|id| id.is_valid())
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        Some(self.body_element).filter(|id| id.is_valid())
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_by_id(id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.tree.memory_usage() + self.url.capacity()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_finds_structure() {
        let mut doc = Document::empty("test://doc");
        let tree = doc.tree_mut();
        let html = tree.append_element(tree.root(), "html").unwrap();
        let head = tree.append_element(html, "head").unwrap();
        let body = tree.append_element(html, "body").unwrap();
        doc.finalize();

        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.head(), Some(head));
        assert_eq!(doc.body(), Some(body));
        assert_eq!(doc.url(), "test://doc");
    }

    #[test]
    fn test_empty_document() {
        let mut doc = Document::default();
        doc.finalize();
        assert!(doc.document_element().is_none());
        assert!(doc.body().is_none());
    }
}
