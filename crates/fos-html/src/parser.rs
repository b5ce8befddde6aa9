//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use fos_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML5 parser
pub struct HtmlParser {
    /// Keep text nodes that contain only whitespace
    keep_whitespace: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self { keep_whitespace: false }
    }

    /// Keep whitespace-only text nodes instead of dropping them
    pub fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_children(&dom.document, document.tree_mut(), root)?;
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }
        Ok(())
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => self.convert_children(handle, tree, parent)?,
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if self.keep_whitespace || !text.trim().is_empty() {
                    tree.append_text(parent, &text)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.append_element(parent, &name.local)?;
                for attr in attrs.borrow().iter() {
                    tree.set_attr(id, &attr.name.local, &attr.value)?;
                }
                self.convert_children(handle, tree, id)?;
            }
            RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::TagId;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_parse_fragment() {
        let html = "<div><span>Text</span></div>";
        let doc = HtmlParser::new().parse(html).unwrap();

        // Fragments get wrapped in html/head/body by html5ever
        let body = doc.body().unwrap();
        let div = doc.tree().first_child(body).unwrap();
        assert_eq!(doc.tree().tag(div), Some(TagId::Div));
    }

    #[test]
    fn test_whitespace_dropped_by_default() {
        let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";
        let doc = HtmlParser::new().parse(html).unwrap();
        let ul = doc.tree().find_tag(TagId::Ul).unwrap();
        assert_eq!(doc.tree().children(ul).count(), 2);

        let doc = HtmlParser::new().keep_whitespace(true).parse(html).unwrap();
        let ul = doc.tree().find_tag(TagId::Ul).unwrap();
        assert!(doc.tree().children(ul).count() > 2);
    }
}
