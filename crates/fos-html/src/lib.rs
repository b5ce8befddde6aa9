//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, producing an arena DOM
//! ([`fos_dom::Document`]) for the style engine.

mod parser;

pub use parser::HtmlParser;
pub use fos_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("I/O error while reading HTML: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM construction failed: {0}")]
    Dom(#[from] fos_dom::DomError),
}
