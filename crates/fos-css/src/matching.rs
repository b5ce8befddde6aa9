//! Selector Matching
//!
//! Matches a selector against a DOM node, starting at the subject segment
//! and walking left through the chain. Each satisfied component adds to
//! the rule's specificity score.

use fos_dom::{DomTree, ElementData, NodeId, TagId};

use crate::selector::{Predicate, Relation, Segment, Selector, TagFilter};

/// Specificity as one integer with separated weight bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32);

impl Specificity {
    /// Concrete element name
    pub const TAG: u32 = 1;
    /// Attribute, class or pseudo-class predicate
    pub const CLASS: u32 = 100;
    /// `#id` predicate
    pub const ID: u32 = 10_000;

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Specificity) -> Specificity {
        Specificity(self.0.saturating_add(rhs.0))
    }
}

/// Which part of an element styles are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PseudoState {
    /// The element itself
    #[default]
    Base,
    Before,
    After,
    FirstLine,
    FirstLetter,
}

impl PseudoState {
    /// Pseudo-element name as written after `::`
    pub fn name(self) -> &'static str {
        match self {
            PseudoState::Base => "",
            PseudoState::Before => "before",
            PseudoState::After => "after",
            PseudoState::FirstLine => "first-line",
            PseudoState::FirstLetter => "first-letter",
        }
    }
}

/// An+B expression for `:nth-child()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpr {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpr {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, an integer, `An+B` or `An-B`
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }
        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::new(0, n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else {
            if !rest.starts_with(['+', '-']) {
                return None;
            }
            rest.parse().ok()?
        };
        Some(Self::new(a, b))
    }

    /// Whether 1-based position `n` is selected
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let a = i64::from(self.a);
        let diff = i64::from(n) - i64::from(self.b);
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

/// Match `selector` against `node`, returning its score when it applies.
///
/// The subject is matched in `pseudo` state; segments to its left are
/// matched against ordinary elements.
pub fn match_selector(
    tree: &DomTree,
    node: NodeId,
    selector: &Selector,
    pseudo: PseudoState,
) -> Option<Specificity> {
    let mut seg = selector.head();
    let mut score = match_segment(tree, node, seg, pseudo)?;
    let mut cur = node;

    while let Some(prev_id) = seg.prev {
        let prev = selector.segment(prev_id);
        let base = PseudoState::Base;
        let (found, s) = match seg.relation {
            Relation::Child => {
                let parent = tree.parent_element(cur)?;
                (parent, match_segment(tree, parent, prev, base)?)
            }
            Relation::AdjacentSibling => {
                let sib = tree.prev_element_sibling(cur)?;
                (sib, match_segment(tree, sib, prev, base)?)
            }
            Relation::Sibling => {
                let mut sib = tree.prev_element_sibling(cur);
                loop {
                    let candidate = sib?;
                    if let Some(s) = match_segment(tree, candidate, prev, base) {
                        break (candidate, s);
                    }
                    sib = tree.prev_element_sibling(candidate);
                }
            }
            Relation::Descendant | Relation::None => {
                let mut anc = tree.parent_element(cur);
                loop {
                    let candidate = anc?;
                    if let Some(s) = match_segment(tree, candidate, prev, base) {
                        break (candidate, s);
                    }
                    anc = tree.parent_element(candidate);
                }
            }
        };
        score = score + s;
        cur = found;
        seg = prev;
    }
    Some(score)
}

/// Match one compound against one element
fn match_segment(
    tree: &DomTree,
    node: NodeId,
    seg: &Segment,
    pseudo: PseudoState,
) -> Option<Specificity> {
    let el = tree.element(node)?;
    let mut score = match &seg.tag {
        TagFilter::Any => 0,
        TagFilter::Tag(tag) if el.tag == *tag => Specificity::TAG,
        TagFilter::Named(name) if el.tag == TagId::Unknown && el.name.eq_ignore_ascii_case(name) => {
            Specificity::TAG
        }
        _ => return None,
    };
    for pred in &seg.predicates {
        if !match_predicate(tree, node, el, pred, pseudo) {
            return None;
        }
        score += match pred {
            Predicate::Id(_) => Specificity::ID,
            _ => Specificity::CLASS,
        };
    }
    Some(Specificity(score))
}

fn match_predicate(
    tree: &DomTree,
    node: NodeId,
    el: &ElementData,
    pred: &Predicate,
    pseudo: PseudoState,
) -> bool {
    match pred {
        Predicate::AttrExists(name) => el.has_attr(name),
        Predicate::AttrEquals(name, v) => el.get_attr(name) == Some(v.as_str()),
        Predicate::AttrContains(name, v) => {
            !v.is_empty() && el.get_attr(name).is_some_and(|a| a.contains(v.as_str()))
        }
        Predicate::AttrStartsWith(name, v) => {
            !v.is_empty() && el.get_attr(name).is_some_and(|a| a.starts_with(v.as_str()))
        }
        Predicate::AttrEndsWith(name, v) => {
            !v.is_empty() && el.get_attr(name).is_some_and(|a| a.ends_with(v.as_str()))
        }
        Predicate::AttrLangPrefix(name, v) => el.get_attr(name).is_some_and(|a| {
            a == v.as_str()
                || (a.len() > v.len() && a.starts_with(v.as_str()) && a.as_bytes()[v.len()] == b'-')
        }),
        Predicate::AttrIncludes(name, v) => el
            .get_attr(name)
            .is_some_and(|a| a.split_whitespace().any(|w| w == v.as_str())),
        Predicate::Class(name) => el.classes().any(|c| c == name.as_str()),
        Predicate::Id(name) => el.id() == Some(name.as_str()),
        Predicate::PseudoClass(name, arg) => match pseudo {
            PseudoState::Base => match_structural(tree, node, el, name, arg.as_deref()),
            state => name.eq_ignore_ascii_case(state.name()),
        },
    }
}

/// Structural pseudo-classes; anything unrecognized fails
fn match_structural(
    tree: &DomTree,
    node: NodeId,
    el: &ElementData,
    name: &str,
    arg: Option<&str>,
) -> bool {
    match name {
        "link" => el.tag == TagId::A && el.has_attr("href"),
        "target" => el.id().is_some(),
        "first-child" => tree.prev_element_sibling(node).is_none(),
        "last-child" => tree.next_element_sibling(node).is_none(),
        "only-child" => {
            tree.prev_element_sibling(node).is_none() && tree.next_element_sibling(node).is_none()
        }
        "empty" => tree.first_child(node).is_none(),
        "root" => {
            el.tag == TagId::Html && tree.parent(node).is_none_or(|p| !tree.is_element(p))
        }
        "nth-child" => {
            let Some(expr) = arg.and_then(NthExpr::parse) else {
                return false;
            };
            let mut position = 1;
            let mut sib = tree.prev_element_sibling(node);
            while let Some(s) = sib {
                position += 1;
                sib = tree.prev_element_sibling(s);
            }
            expr.matches(position)
        }
        _ => false,
    }
}
