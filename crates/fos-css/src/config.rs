//! Style Configuration

/// Stylesheet configuration options
#[derive(Debug, Clone)]
pub struct StyleConfig {
    /// Media type `@media` and `@import` queries are evaluated against
    pub media: String,

    /// Maximum comma-separated selectors in one rule
    pub max_selectors_per_rule: usize,

    /// Maximum `@import` nesting
    pub max_import_depth: usize,

    /// Feed legacy presentational attributes (`bgcolor`, `width`, ...) into the cascade
    pub implicit_attributes: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            media: "screen".to_string(),
            max_selectors_per_rule: 256,
            max_import_depth: 16,
            implicit_attributes: true,
        }
    }
}

impl StyleConfig {
    /// Configuration for a given media type
    pub fn for_media(media: &str) -> Self {
        Self {
            media: media.to_string(),
            ..Self::default()
        }
    }

    pub fn with_max_selectors(mut self, max: usize) -> Self {
        self.max_selectors_per_rule = max;
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    pub fn with_implicit_attributes(mut self, enabled: bool) -> Self {
        self.implicit_attributes = enabled;
        self
    }
}
