//! fOS CSS Cascade Engine
//!
//! Imports CSS into a [`Stylesheet`] and computes the property set of DOM
//! elements from it: selector matching with integer specificity bands,
//! declaration-order tie breaking, and content-hash memoization of the
//! merged results.
//!
//! ```ignore
//! let mut sheet = Stylesheet::new(StyleConfig::for_media("print"));
//! sheet.import_str("page.css", "h1, h2 { font-weight: bold } #title { color: blue }")?;
//! let props = sheet.computed_style(doc.tree(), title)?;
//! ```

mod cascade;
mod config;
mod dict;
mod error;
mod hash;
mod implicit;
mod import;
mod matching;
mod media;
mod pool;
mod rules;
mod selector;
mod source;
mod stylesheet;
mod token;
mod values;

pub use cascade::{ComputedProps, is_inherited};
pub use config::StyleConfig;
pub use dict::{Dictionary, cmp_ignore_case};
pub use error::{CssError, Diagnostic, FileResolver, Flow, LogReporter, Reporter, UrlResolver};
pub use hash::{ContentHasher, RuleHash};
pub use implicit::{AttrValue, IMPLICIT_ATTRS, ImplicitAttr};
pub use matching::{NthExpr, PseudoState, Specificity, match_selector};
pub use media::evaluate as evaluate_media;
pub use pool::{Atom, StringPool};
pub use rules::{Rule, RuleId};
pub use selector::{Predicate, Relation, Segment, SegmentId, Selector, SelectorBuilder, TagFilter};
pub use source::CssSource;
pub use stylesheet::Stylesheet;
pub use token::{Token, TokenKind, Tokenizer};
pub use values::{Color, Length, LengthUnit};
