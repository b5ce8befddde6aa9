//! Style Cascade
//!
//! Computes the property set of a DOM element by:
//! 1. Gathering candidate rules from the wildcard bucket and the element's tag bucket
//! 2. Matching and scoring each candidate
//! 3. Merging declarations in ascending (score, declaration order)
//!
//! Results are memoized by content hash: elements that match the same rules
//! and end up with the same properties share one synthesized rule. The base
//! state of an element is additionally cached on the node itself.

use std::rc::Rc;

use fos_dom::{DomTree, NodeId, StyleStamp};

use crate::dict::Dictionary;
use crate::hash::ContentHasher;
use crate::implicit;
use crate::matching::{PseudoState, Specificity, match_selector};
use crate::pool::Atom;
use crate::rules::RuleId;
use crate::stylesheet::Stylesheet;
use crate::CssError;

/// Computed property set, shared by every element that resolves to it
pub type ComputedProps = Rc<Dictionary>;

/// Properties an element takes from its parent when it has no value
const INHERITED: &[&str] = &[
    "color",
    "direction",
    "letter-spacing",
    "line-height",
    "quotes",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "white-space",
    "word-spacing",
];

/// Whether `key` inherits by default
pub fn is_inherited(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("font") || key.starts_with("list-style") || INHERITED.contains(&key.as_str())
}

impl Stylesheet {
    /// Compute the properties of `node` in `pseudo` state.
    ///
    /// Returns `None` for non-element nodes and for elements nothing
    /// applies to.
    pub fn compute(
        &mut self,
        tree: &DomTree,
        node: NodeId,
        pseudo: PseudoState,
    ) -> Result<Option<ComputedProps>, CssError> {
        let Some(n) = tree.get(node) else {
            return Ok(None);
        };
        let Some(el) = n.as_element() else {
            return Ok(None);
        };

        if pseudo == PseudoState::Base {
            if let Some(stamp) = n.style.get() {
                if stamp.sheet == self.id()
                    && stamp.generation == self.generation()
                    && stamp.tree_version == tree.version()
                {
                    return Ok(stamp
                        .entry
                        .and_then(|id| self.store.rule(RuleId(id)))
                        .map(|rule| rule.properties.clone()));
                }
            }
        }

        let mut matched: Vec<(Specificity, RuleId)> = Vec::new();
        for id in self.store.candidates(el.tag) {
            let Some(selector) = self.store.rule(id).and_then(|r| r.selector.as_ref()) else {
                continue;
            };
            if let Some(score) = match_selector(tree, node, selector, pseudo) {
                matched.push((score, id));
            }
        }
        matched.sort_unstable();

        let mut merged = Dictionary::new();
        if pseudo == PseudoState::Base {
            if self.config.implicit_attributes {
                implicit::apply(el, &mut self.pool, &mut merged);
            }
            if let Some(style) = el.get_attr("style") {
                let inline = self.parse_inline(style)?;
                merged.merge_from(&inline);
            }
        }

        let entry = if matched.is_empty() && merged.is_empty() {
            None
        } else {
            let mut hasher = ContentHasher::new();
            for &(_, id) in &matched {
                if let Some(rule) = self.store.rule(id) {
                    hasher.update(rule.hash.as_bytes());
                    merged.merge_from(&rule.properties);
                }
            }
            for (key, value) in merged.iter() {
                hasher.update(key.as_bytes());
                hasher.write_u8(b':');
                hasher.update(value.as_bytes());
                hasher.write_u8(b';');
            }
            let hash = hasher.finish();

            let id = match self.store.find_hash(&hash) {
                Some(id) => {
                    tracing::trace!(?hash, rule = id.0, "cascade memo hit");
                    id
                }
                None => {
                    let id = self.store.insert_synthesized(hash, Rc::new(merged))?;
                    tracing::trace!(?hash, rule = id.0, matched = matched.len(), "cascade memo insert");
                    id
                }
            };
            Some(id)
        };

        if pseudo == PseudoState::Base {
            n.style.set(StyleStamp {
                sheet: self.id(),
                generation: self.generation(),
                tree_version: tree.version(),
                entry: entry.map(|id| id.0),
            });
        }
        Ok(entry
            .and_then(|id| self.store.rule(id))
            .map(|rule| rule.properties.clone()))
    }

    /// Base-state properties of `node`
    pub fn computed_style(
        &mut self,
        tree: &DomTree,
        node: NodeId,
    ) -> Result<Option<ComputedProps>, CssError> {
        self.compute(tree, node, PseudoState::Base)
    }

    /// Value of `key` for `node`, taken from ancestors when the node has
    /// none and the property inherits, or when the value is `inherit`
    pub fn inherited_value(
        &mut self,
        tree: &DomTree,
        node: NodeId,
        key: &str,
    ) -> Result<Option<Atom>, CssError> {
        let inherits = is_inherited(key);
        let mut cur = Some(node);
        while let Some(n) = cur {
            if tree.is_element(n) {
                let value = self
                    .computed_style(tree, n)?
                    .and_then(|props| props.get(key).cloned());
                match value {
                    Some(v) if !v.eq_ignore_ascii_case("inherit") => return Ok(Some(v)),
                    Some(_) => {}
                    None if !inherits => return Ok(None),
                    None => {}
                }
            }
            cur = tree.parent(n);
        }
        Ok(None)
    }
}
