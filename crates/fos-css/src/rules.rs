//! Rule Store
//!
//! Owns every rule of a stylesheet. Parsed rules are filed into a bucket by
//! the element filter of their subject segment, so a cascade query only
//! scans the wildcard bucket and the bucket of the node's own tag. All
//! rules, parsed and synthesized, are indexed by content hash.
//!
//! The hash index is an array kept sorted lazily: inserts append and mark it
//! dirty, and the next lookup sorts before searching.

use std::rc::Rc;

use fos_dom::TagId;

use crate::dict::Dictionary;
use crate::hash::RuleHash;
use crate::selector::Selector;
use crate::CssError;

/// Insertion-ordered rule handle; later rules have larger ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub u32);

/// A selector with its declarations, or a synthesized cascade result
#[derive(Debug)]
pub struct Rule {
    pub hash: RuleHash,
    /// `None` for synthesized rules
    pub selector: Option<Selector>,
    pub properties: Rc<Dictionary>,
}

impl Rule {
    #[inline]
    pub fn is_synthesized(&self) -> bool {
        self.selector.is_none()
    }
}

/// Rule storage with tag buckets and a hash index
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    /// Rule ids sorted by `(hash, id)` unless `dirty`
    by_hash: Vec<RuleId>,
    dirty: bool,
    /// Parsed rules per subject tag, indexed by `TagId as usize`
    buckets: Vec<Vec<RuleId>>,
    /// Parsed rules whose subject matches any element
    wildcard: Vec<RuleId>,
    synthesized: usize,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, rule: Rule) -> Result<RuleId, CssError> {
        let id = RuleId(self.rules.len() as u32);
        self.rules.try_reserve(1)?;
        self.by_hash.try_reserve(1)?;
        self.rules.push(rule);
        self.by_hash.push(id);
        self.dirty = true;
        Ok(id)
    }

    /// Add a parsed rule and file it into its tag bucket
    pub fn insert_selector_rule(
        &mut self,
        selector: Selector,
        properties: Rc<Dictionary>,
    ) -> Result<RuleId, CssError> {
        let bucket = selector.head().tag.bucket();
        let hash = selector.content_hash();
        let id = self.push(Rule {
            hash,
            selector: Some(selector),
            properties,
        })?;
        let list = match bucket {
            None => &mut self.wildcard,
            Some(tag) => {
                let idx = tag as usize;
                if self.buckets.len() <= idx {
                    self.buckets.try_reserve(idx + 1 - self.buckets.len())?;
                    self.buckets.resize_with(idx + 1, Vec::new);
                }
                &mut self.buckets[idx]
            }
        };
        list.try_reserve(1)?;
        list.push(id);
        Ok(id)
    }

    /// Add a synthesized cascade result under its memo hash
    pub fn insert_synthesized(
        &mut self,
        hash: RuleHash,
        properties: Rc<Dictionary>,
    ) -> Result<RuleId, CssError> {
        let id = self.push(Rule {
            hash,
            selector: None,
            properties,
        })?;
        self.synthesized += 1;
        Ok(id)
    }

    fn ensure_sorted(&mut self) {
        if self.dirty {
            let rules = &self.rules;
            self.by_hash
                .sort_unstable_by_key(|id| (rules[id.0 as usize].hash, *id));
            self.dirty = false;
        }
    }

    /// First rule carrying `hash`
    pub fn find_hash(&mut self, hash: &RuleHash) -> Option<RuleId> {
        self.ensure_sorted();
        let rules = &self.rules;
        let idx = self
            .by_hash
            .partition_point(|id| rules[id.0 as usize].hash < *hash);
        self.by_hash
            .get(idx)
            .copied()
            .filter(|id| rules[id.0 as usize].hash == *hash)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0 as usize)
    }

    /// Wildcard rules followed by the rules of `tag`'s bucket
    pub fn candidates(&self, tag: TagId) -> impl Iterator<Item = RuleId> + '_ {
        let bucket = self
            .buckets
            .get(tag as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.wildcard.iter().chain(bucket).copied()
    }

    /// Parsed rules filed under `tag`; `None` gives the wildcard bucket
    pub fn bucket(&self, tag: Option<TagId>) -> &[RuleId] {
        match tag {
            None => &self.wildcard,
            Some(tag) => self.buckets.get(tag as usize).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Total rules, parsed and synthesized
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules created by the cascade memo
    pub fn synthesized_count(&self) -> usize {
        self.synthesized
    }

    /// Rules parsed from stylesheets
    pub fn parsed_count(&self) -> usize {
        self.rules.len() - self.synthesized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHasher;
    use crate::pool::StringPool;
    use crate::selector::parse_selector;
    use crate::source::CssSource;
    use crate::token::{Token, Tokenizer};

    fn selector(text: &str, pool: &mut StringPool) -> Selector {
        let tokens: Vec<Token> = Tokenizer::new(CssSource::from_text("t", text)).collect();
        parse_selector(&tokens, pool).unwrap()
    }

    fn hash_of(s: &str) -> RuleHash {
        let mut h = ContentHasher::new();
        h.write_str(s);
        h.finish()
    }

    #[test]
    fn test_buckets() {
        let mut pool = StringPool::new();
        let mut store = RuleStore::new();
        let props = Rc::new(Dictionary::new());
        let a = store.insert_selector_rule(selector("p", &mut pool), props.clone()).unwrap();
        let b = store.insert_selector_rule(selector(".x", &mut pool), props.clone()).unwrap();
        let c = store.insert_selector_rule(selector("div p", &mut pool), props.clone()).unwrap();
        let d = store.insert_selector_rule(selector("x-card", &mut pool), props).unwrap();

        assert_eq!(store.bucket(Some(TagId::P)), &[a, c]);
        assert_eq!(store.bucket(None), &[b]);
        assert_eq!(store.bucket(Some(TagId::Unknown)), &[d]);
        assert!(store.bucket(Some(TagId::Table)).is_empty());

        let cands: Vec<RuleId> = store.candidates(TagId::P).collect();
        assert_eq!(cands, vec![b, a, c]);
        let cands: Vec<RuleId> = store.candidates(TagId::Span).collect();
        assert_eq!(cands, vec![b]);
        assert_eq!(store.parsed_count(), 4);
    }

    #[test]
    fn test_hash_lookup_after_inserts() {
        let mut store = RuleStore::new();
        let props = Rc::new(Dictionary::new());
        let mut ids = Vec::new();
        for word in ["one", "two", "three", "four"] {
            ids.push(store.insert_synthesized(hash_of(word), props.clone()).unwrap());
            // Lookup between inserts sees the newest rule
            assert_eq!(store.find_hash(&hash_of(word)), ids.last().copied());
        }
        assert_eq!(store.find_hash(&hash_of("two")), Some(ids[1]));
        assert_eq!(store.find_hash(&hash_of("five")), None);
        assert_eq!(store.synthesized_count(), 4);
        assert!(store.rule(ids[0]).unwrap().is_synthesized());
    }

    #[test]
    fn test_duplicate_hash_finds_first() {
        let mut pool = StringPool::new();
        let mut store = RuleStore::new();
        let props = Rc::new(Dictionary::new());
        let a = store.insert_selector_rule(selector("p.x", &mut pool), props.clone()).unwrap();
        let b = store.insert_selector_rule(selector("p.x", &mut pool), props).unwrap();
        let hash = store.rule(a).unwrap().hash;
        assert_eq!(store.rule(b).unwrap().hash, hash);
        assert_eq!(store.find_hash(&hash), Some(a));
    }
}
