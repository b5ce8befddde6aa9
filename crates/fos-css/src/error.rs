//! Errors, Diagnostics & Import Capabilities
//!
//! Hard failures are [`CssError`]s. Malformed CSS is reported through a
//! [`Reporter`] which decides whether parsing continues or stops; only a
//! stop turns into an error.

use std::collections::TryReserveError;
use std::path::{Path, PathBuf};

/// CSS engine error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Cannot read stylesheet {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import aborted at {source_name}:{line}: {message}")]
    Aborted {
        source_name: String,
        line: u32,
        message: String,
    },

    #[error("Out of memory while growing rule storage: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// A recoverable problem found while reading CSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stylesheet file name, URL or a caller-chosen label
    pub source_name: String,
    /// 1-based line number
    pub line: u32,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.source_name, self.line, self.message)
    }
}

/// Reporter verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Skip to the next resynchronization point and keep going
    Continue,
    /// Abort the whole import
    Stop,
}

/// Receives parse diagnostics
pub trait Reporter {
    fn report(&mut self, diag: &Diagnostic) -> Flow;
}

impl<F> Reporter for F
where
    F: FnMut(&Diagnostic) -> Flow,
{
    fn report(&mut self, diag: &Diagnostic) -> Flow {
        self(diag)
    }
}

/// Default reporter: log a warning and continue
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, diag: &Diagnostic) -> Flow {
        tracing::warn!(source = %diag.source_name, line = diag.line, "{}", diag.message);
        Flow::Continue
    }
}

/// Maps `@import` targets to local files
pub trait UrlResolver {
    /// Resolve `url` relative to the importing source `base`
    fn resolve(&self, url: &str, base: &str) -> Option<PathBuf>;
}

/// Default resolver: local paths only, relative to the importing file
#[derive(Debug, Default, Clone, Copy)]
pub struct FileResolver;

impl UrlResolver for FileResolver {
    fn resolve(&self, url: &str, base: &str) -> Option<PathBuf> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        let lower = url.to_ascii_lowercase();
        if ["http:", "https:", "data:", "ftp:"].iter().any(|p| lower.starts_with(p)) {
            return None;
        }
        let url = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(url);
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        let dir = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        let mut reporter = |d: &Diagnostic| {
            seen.push(d.line);
            Flow::Stop
        };
        let diag = Diagnostic {
            source_name: "a.css".into(),
            line: 7,
            message: "bad".into(),
        };
        assert_eq!(reporter.report(&diag), Flow::Stop);
        assert_eq!(seen, vec![7]);
        assert_eq!(diag.to_string(), "a.css:7: bad");
    }

    #[test]
    fn test_file_resolver() {
        let r = FileResolver;
        assert_eq!(
            r.resolve("b.css", "styles/a.css"),
            Some(PathBuf::from("styles/b.css"))
        );
        assert_eq!(r.resolve("b.css", "<inline>"), Some(PathBuf::from("b.css")));
        assert_eq!(r.resolve("/abs/c.css", "x/a.css"), Some(PathBuf::from("/abs/c.css")));
        assert_eq!(r.resolve("https://example.com/x.css", "a.css"), None);
        assert_eq!(r.resolve("  ", "a.css"), None);
    }
}
