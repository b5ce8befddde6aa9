//! Stylesheet
//!
//! Owns the string pool, the rule store and the import capabilities. Rules
//! accumulate across imports in declaration order.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use fos_dom::TagId;

use crate::config::StyleConfig;
use crate::dict::Dictionary;
use crate::error::{FileResolver, LogReporter, Reporter, UrlResolver};
use crate::hash::RuleHash;
use crate::import::Importer;
use crate::pool::{Atom, StringPool};
use crate::rules::{Rule, RuleId, RuleStore};
use crate::source::CssSource;
use crate::CssError;

static NEXT_SHEET_ID: AtomicU32 = AtomicU32::new(1);

/// A set of imported rules and the state needed to cascade them
pub struct Stylesheet {
    id: u32,
    /// Bumped whenever rules are added; invalidates node caches
    generation: u32,
    pub(crate) pool: StringPool,
    pub(crate) store: RuleStore,
    pub(crate) config: StyleConfig,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) resolver: Box<dyn UrlResolver>,
}

impl Stylesheet {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            id: NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            pool: StringPool::new(),
            store: RuleStore::new(),
            config,
            reporter: Box::new(LogReporter),
            resolver: Box::new(FileResolver),
        }
    }

    /// Replace the diagnostic reporter
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the `@import` resolver
    pub fn with_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Process-unique stylesheet id
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Intern a string in this stylesheet's pool
    pub fn intern(&mut self, s: &str) -> Atom {
        self.pool.intern(s)
    }

    fn import_source(&mut self, source: CssSource) -> Result<usize, CssError> {
        let name = source.name().to_string();
        tracing::debug!(source = %name, media = %self.config.media, "importing stylesheet");
        let before = self.store.parsed_count();
        let result = Importer::new(self, source, 0).run();
        // rules added before an abort stay in the store
        if self.store.parsed_count() != before {
            self.generation = self.generation.wrapping_add(1);
        }
        let added = result?;
        tracing::debug!(source = %name, added, total = self.store.parsed_count(), "stylesheet imported");
        Ok(added)
    }

    /// Import CSS text; `name` labels diagnostics and anchors relative
    /// `@import` URLs. Returns the number of rules added.
    pub fn import_str(&mut self, name: &str, text: &str) -> Result<usize, CssError> {
        self.import_source(CssSource::from_text(name, text))
    }

    /// Import a stylesheet file
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<usize, CssError> {
        let source = CssSource::from_file(path.as_ref())?;
        self.import_source(source)
    }

    /// Parse a `style` attribute into a dictionary
    pub fn parse_inline(&mut self, text: &str) -> Result<Dictionary, CssError> {
        Importer::new(self, CssSource::from_text("<style>", text), 0).declarations(false)
    }

    /// Number of parsed rules
    pub fn rule_count(&self) -> usize {
        self.store.parsed_count()
    }

    /// Number of rules synthesized by the cascade memo
    pub fn synthesized_count(&self) -> usize {
        self.store.synthesized_count()
    }

    /// Parsed rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        (0..self.store.len() as u32)
            .filter_map(|i| self.store.rule(RuleId(i)))
            .filter(|r| !r.is_synthesized())
    }

    /// Parsed rules whose subject is filed under `tag`
    pub fn rules_for_tag(&self, tag: TagId) -> impl Iterator<Item = &Rule> {
        self.store
            .bucket(Some(tag))
            .iter()
            .filter_map(|&id| self.store.rule(id))
    }

    /// Parsed rules whose subject matches any element
    pub fn wildcard_rules(&self) -> impl Iterator<Item = &Rule> {
        self.store.bucket(None).iter().filter_map(|&id| self.store.rule(id))
    }

    /// Look up a rule by content hash
    pub fn find_rule(&mut self, hash: &RuleHash) -> Option<&Rule> {
        let id = self.store.find_hash(hash)?;
        self.store.rule(id)
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl fmt::Debug for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stylesheet")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("media", &self.config.media)
            .field("rules", &self.store.parsed_count())
            .field("synthesized", &self.store.synthesized_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use crate::error::{Diagnostic, Flow};

    struct MapResolver(Vec<(&'static str, PathBuf)>);

    impl UrlResolver for MapResolver {
        fn resolve(&self, url: &str, _base: &str) -> Option<PathBuf> {
            self.0.iter().find(|(u, _)| *u == url).map(|(_, p)| p.clone())
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fos-css-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Stylesheet::default();
        let b = Stylesheet::default();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_generation_bumps_on_rules() {
        let mut sheet = Stylesheet::default();
        assert_eq!(sheet.generation(), 0);
        sheet.import_str("a", "/* nothing */").unwrap();
        assert_eq!(sheet.generation(), 0);
        sheet.import_str("b", "p { color: red }").unwrap();
        assert_eq!(sheet.generation(), 1);
    }

    #[test]
    fn test_parse_inline() {
        let mut sheet = Stylesheet::default();
        let dict = sheet.parse_inline("color: red; Width:10px;; bogus").unwrap();
        assert_eq!(dict.get_str("color"), Some("red"));
        assert_eq!(dict.get_str("width"), Some("10px"));
        assert_eq!(dict.len(), 2);
        assert_eq!(sheet.rule_count(), 0);
    }

    #[test]
    fn test_rules_for_tag() {
        let mut sheet = Stylesheet::default();
        sheet.import_str("t", "p { a: 1 } .x { a: 2 } div p { a: 3 } *.y { a: 4 }").unwrap();
        assert_eq!(sheet.rules_for_tag(TagId::P).count(), 2);
        assert_eq!(sheet.wildcard_rules().count(), 2);
        assert_eq!(sheet.rules_for_tag(TagId::Div).count(), 0);
        let hash = sheet.rules().next().unwrap().hash;
        assert!(sheet.find_rule(&hash).is_some_and(|r| r.selector.is_some()));
    }

    #[test]
    fn test_import_file_and_nested_import() {
        let dir = temp_dir("import");
        std::fs::write(dir.join("base.css"), "p { color: red }\n").unwrap();
        std::fs::write(
            dir.join("main.css"),
            "@import \"base.css\";\n@import url(base.css) print;\np { color: blue }\n",
        )
        .unwrap();

        let mut sheet = Stylesheet::default();
        let added = sheet.import_file(dir.join("main.css")).unwrap();
        assert_eq!(added, 2);
        let colors: Vec<&str> = sheet
            .rules()
            .filter_map(|r| r.properties.get_str("color"))
            .collect();
        assert_eq!(colors, vec!["red", "blue"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_import_cycle_is_bounded() {
        let dir = temp_dir("cycle");
        std::fs::write(dir.join("loop.css"), "@import \"loop.css\";\na { b: c }\n").unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let mut sheet = Stylesheet::new(StyleConfig::default().with_max_import_depth(3))
            .with_reporter(move |d: &Diagnostic| {
                sink.borrow_mut().push(d.message.clone());
                Flow::Continue
            });
        let added = sheet.import_file(dir.join("loop.css")).unwrap();
        assert_eq!(added, 4);
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].contains("nested too deeply"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unresolvable_import_reported() {
        let log = Rc::new(RefCell::new(0));
        let sink = log.clone();
        let mut sheet = Stylesheet::default()
            .with_resolver(MapResolver(Vec::new()))
            .with_reporter(move |_: &Diagnostic| {
                *sink.borrow_mut() += 1;
                Flow::Continue
            });
        sheet
            .import_str("t", "@import \"https://example.com/x.css\";\np { a: b }")
            .unwrap();
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(*log.borrow(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut sheet = Stylesheet::default();
        let err = sheet.import_file("/nonexistent/fos/x.css").unwrap_err();
        assert!(matches!(err, CssError::Io { .. }));
    }
}
