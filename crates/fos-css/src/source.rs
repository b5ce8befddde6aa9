//! CSS Source Reader
//!
//! Pull-based character stream with one character of push-back and line
//! tracking for diagnostics.

use std::path::Path;

use crate::CssError;

/// Character stream over stylesheet text
#[derive(Debug)]
pub struct CssSource {
    name: String,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    /// Character returned by [`unget`](Self::unget)
    pushed: Option<char>,
}

impl CssSource {
    /// Source over in-memory text
    pub fn from_text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            pushed: None,
        }
    }

    /// Source over a file's contents; the path becomes the source name
    pub fn from_file(path: &Path) -> Result<Self, CssError> {
        let text = std::fs::read_to_string(path).map_err(|source| CssError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(&path.to_string_lossy(), &text))
    }

    /// Source name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current 1-based line
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Read the next character
    pub fn next_char(&mut self) -> Option<char> {
        let c = match self.pushed.take() {
            Some(c) => c,
            None => {
                let c = *self.chars.get(self.pos)?;
                self.pos += 1;
                c
            }
        };
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Push one character back; it is returned by the next read
    pub fn unget(&mut self, c: char) {
        debug_assert!(self.pushed.is_none(), "only one character of push-back");
        if c == '\n' {
            self.line -= 1;
        }
        self.pushed = Some(c);
    }

    /// Look at the next character without consuming it
    pub fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    /// Look `n` characters ahead
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        match self.pushed {
            Some(c) if n == 0 => Some(c),
            Some(_) => self.chars.get(self.pos + n - 1).copied(),
            None => self.chars.get(self.pos + n).copied(),
        }
    }

    /// Consume `s` if the stream continues with it
    pub fn eat(&mut self, s: &str) -> bool {
        if s.chars().enumerate().all(|(i, c)| self.peek_nth(i) == Some(c)) {
            for _ in s.chars() {
                self.next_char();
            }
            true
        } else {
            false
        }
    }

    pub fn at_eof(&self) -> bool {
        self.peek().is_none()
    }
}
