//! CSS Importer
//!
//! Reads a stylesheet into a [`Stylesheet`]: `@import`, `@media` and
//! qualified rules. Malformed input is reported to the stylesheet's
//! [`Reporter`](crate::Reporter) and skipped up to the next declaration,
//! rule or end of input; a `Flow::Stop` verdict aborts the import.

use std::rc::Rc;

use crate::dict::Dictionary;
use crate::error::{Diagnostic, Flow};
use crate::media;
use crate::selector::{Selector, parse_selector};
use crate::source::CssSource;
use crate::stylesheet::Stylesheet;
use crate::token::{Token, TokenKind, Tokenizer};
use crate::CssError;

/// Single-source import pass
pub(crate) struct Importer<'a> {
    sheet: &'a mut Stylesheet,
    tokens: Tokenizer,
    peeked: Option<Token>,
    /// `@import` nesting level of this source
    depth: usize,
    /// Rules added by this source and its imports
    added: usize,
}

impl<'a> Importer<'a> {
    pub(crate) fn new(sheet: &'a mut Stylesheet, source: CssSource, depth: usize) -> Self {
        Self {
            sheet,
            tokens: Tokenizer::new(source),
            peeked: None,
            depth,
            added: 0,
        }
    }

    fn next(&mut self) -> Token {
        match self.peeked.take() {
            Some(tok) => tok,
            None => self.tokens.next_token(),
        }
    }

    fn peek(&mut self) -> &Token {
        let tokens = &mut self.tokens;
        self.peeked.get_or_insert_with(|| tokens.next_token())
    }

    fn unread(&mut self, tok: Token) {
        debug_assert!(self.peeked.is_none());
        self.peeked = Some(tok);
    }

    /// Hand a diagnostic to the reporter; `Stop` aborts the import
    fn report(&mut self, line: u32, message: String) -> Result<(), CssError> {
        let diag = Diagnostic {
            source_name: self.tokens.name().to_string(),
            line,
            message,
        };
        match self.sheet.reporter.report(&diag) {
            Flow::Continue => Ok(()),
            Flow::Stop => Err(CssError::Aborted {
                source_name: diag.source_name,
                line: diag.line,
                message: diag.message,
            }),
        }
    }

    /// Import the whole source; returns the number of rules added
    pub(crate) fn run(mut self) -> Result<usize, CssError> {
        loop {
            let tok = self.next();
            match &tok.kind {
                TokenKind::Eof => break,
                TokenKind::Reserved(';') => {}
                TokenKind::Reserved('}') => self.report(tok.line, "unexpected '}'".to_string())?,
                TokenKind::Error(msg) => {
                    let msg = msg.clone();
                    self.report(tok.line, msg)?;
                }
                TokenKind::Str(s) if s.starts_with('@') => {
                    let name = s.to_ascii_lowercase();
                    self.at_rule(&name, tok.line, false)?;
                }
                _ => self.qualified_rule(tok, true)?,
            }
        }
        Ok(self.added)
    }

    fn at_rule(&mut self, name: &str, line: u32, in_media: bool) -> Result<(), CssError> {
        match name {
            "@charset" => self.skip_statement(),
            "@import" if in_media => {
                self.report(line, "@import is not allowed inside @media".to_string())?;
                self.skip_statement();
            }
            "@import" => self.import(line)?,
            "@media" if in_media => {
                self.report(line, "nested @media".to_string())?;
                self.skip_statement();
            }
            "@media" => self.media(line)?,
            _ => {
                self.report(line, format!("unsupported at-rule '{}'", name))?;
                self.skip_statement();
            }
        }
        Ok(())
    }

    /// `@import "path" [media];` or `@import url(path) [media];`
    fn import(&mut self, line: u32) -> Result<(), CssError> {
        let Some(url) = self.import_url() else {
            self.report(line, "expected URL after @import".to_string())?;
            self.skip_statement();
            return Ok(());
        };

        let mut query = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Reserved(';') => {
                    self.next();
                    break;
                }
                TokenKind::Reserved('{') | TokenKind::Reserved('}') => {
                    self.report(line, "expected ';' after @import".to_string())?;
                    self.skip_statement();
                    return Ok(());
                }
                _ => query.push(self.next()),
            }
        }
        if !media::evaluate(&query, &self.sheet.config.media) {
            tracing::debug!(url = %url, "@import skipped by media query");
            return Ok(());
        }
        if self.depth + 1 > self.sheet.config.max_import_depth {
            return self.report(line, format!("@import of '{}' nested too deeply", url));
        }
        let Some(path) = self.sheet.resolver.resolve(&url, self.tokens.name()) else {
            return self.report(line, format!("cannot resolve @import '{}'", url));
        };
        let source = match CssSource::from_file(&path) {
            Ok(source) => source,
            Err(err) => return self.report(line, err.to_string()),
        };
        tracing::debug!(path = %path.display(), depth = self.depth + 1, "importing stylesheet");
        self.added += Importer::new(&mut *self.sheet, source, self.depth + 1).run()?;
        Ok(())
    }

    fn import_url(&mut self) -> Option<String> {
        let tok = self.next();
        match tok.kind {
            TokenKind::Quoted(s) => Some(s),
            TokenKind::Str(s) if s.len() >= 4 && s[..4].eq_ignore_ascii_case("url(") => {
                let mut url = s[4..].to_string();
                loop {
                    let tok = self.next();
                    match tok.kind {
                        TokenKind::Reserved(')') => break,
                        TokenKind::Eof => return None,
                        TokenKind::Quoted(q) => url.push_str(&q),
                        _ => url.push_str(&tok.text()),
                    }
                }
                let url = url.trim();
                (!url.is_empty()).then(|| url.to_string())
            }
            _ => {
                self.unread(tok);
                None
            }
        }
    }

    /// `@media query { rules }`
    fn media(&mut self, line: u32) -> Result<(), CssError> {
        let mut query = Vec::new();
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Reserved('{') => break,
                TokenKind::Eof => return self.report(line, "unexpected end of file in @media".to_string()),
                TokenKind::Reserved(';') | TokenKind::Reserved('}') => {
                    return self.report(tok.line, "expected '{' after @media query".to_string());
                }
                _ => query.push(tok),
            }
        }
        let add = media::evaluate(&query, &self.sheet.config.media);
        tracing::trace!(line, add, "@media block");

        loop {
            let tok = self.next();
            match &tok.kind {
                TokenKind::Reserved('}') => return Ok(()),
                TokenKind::Eof => return self.report(tok.line, "unterminated @media block".to_string()),
                TokenKind::Reserved(';') => {}
                TokenKind::Error(msg) => {
                    let msg = msg.clone();
                    self.report(tok.line, msg)?;
                }
                TokenKind::Str(s) if s.starts_with('@') => {
                    let name = s.to_ascii_lowercase();
                    self.at_rule(&name, tok.line, true)?;
                }
                _ => self.qualified_rule(tok, add)?,
            }
        }
    }

    /// Selector list and declaration block; rules are stored only when `add`
    fn qualified_rule(&mut self, first: Token, add: bool) -> Result<(), CssError> {
        let line = first.line;
        let mut groups: Vec<Vec<Token>> = vec![Vec::new()];
        let mut parens = 0usize;
        let mut tok = first;
        loop {
            match &tok.kind {
                TokenKind::Reserved('{') if parens == 0 => break,
                TokenKind::Reserved(',') if parens == 0 => groups.push(Vec::new()),
                TokenKind::Eof => {
                    return self.report(line, "unexpected end of file in selector".to_string());
                }
                TokenKind::Reserved(';') => {
                    return self.report(tok.line, "expected '{' after selector".to_string());
                }
                TokenKind::Reserved('}') => {
                    self.unread(tok);
                    return self.report(line, "expected '{' after selector".to_string());
                }
                kind => {
                    match kind {
                        TokenKind::Reserved(')') => parens = parens.saturating_sub(1),
                        TokenKind::Str(s) => parens += s.matches('(').count(),
                        _ => {}
                    }
                    if let Some(group) = groups.last_mut() {
                        group.push(tok);
                    }
                }
            }
            tok = self.next();
        }

        let max = self.sheet.config.max_selectors_per_rule;
        if groups.len() > max {
            self.report(line, format!("too many selectors in rule ({} > {})", groups.len(), max))?;
            self.skip_block();
            return Ok(());
        }

        let mut selectors: Vec<Selector> = Vec::with_capacity(groups.len());
        for group in &groups {
            match parse_selector(group, &mut self.sheet.pool) {
                Ok(sel) => selectors.push(sel),
                Err(msg) => {
                    let line = group.first().map_or(line, |t| t.line);
                    self.report(line, msg)?;
                    self.skip_block();
                    return Ok(());
                }
            }
        }

        let props = self.declarations(true)?;
        if !add {
            return Ok(());
        }
        let props = Rc::new(props);
        for sel in selectors {
            self.sheet.store.insert_selector_rule(sel, props.clone())?;
            self.added += 1;
        }
        Ok(())
    }

    /// Declarations up to the closing `}` (when `braced`) or end of input
    pub(crate) fn declarations(&mut self, braced: bool) -> Result<Dictionary, CssError> {
        let mut dict = Dictionary::new();
        loop {
            let tok = self.next();
            match &tok.kind {
                TokenKind::Eof => {
                    if braced {
                        self.report(tok.line, "unexpected end of file in declaration block".to_string())?;
                    }
                    return Ok(dict);
                }
                TokenKind::Reserved('}') if braced => return Ok(dict),
                TokenKind::Reserved(';') => {}
                TokenKind::Str(name) => {
                    let name = name.clone();
                    self.declaration(&name, tok.line, &mut dict)?;
                }
                _ => {
                    self.report(tok.line, format!("unexpected '{}' in declaration block", tok.text()))?;
                    self.skip_declaration();
                }
            }
        }
    }

    /// `name : value` up to `;`, `}` or end of input
    fn declaration(&mut self, name: &str, line: u32, dict: &mut Dictionary) -> Result<(), CssError> {
        let colon = self.next();
        if !colon.is_reserved(':') {
            self.report(line, format!("expected ':' after '{}'", name))?;
            match colon.kind {
                TokenKind::Reserved(';') => {}
                TokenKind::Reserved('}') | TokenKind::Eof => self.unread(colon),
                _ => self.skip_declaration(),
            }
            return Ok(());
        }

        let mut value = String::new();
        loop {
            match &self.peek().kind {
                TokenKind::Reserved(';') => {
                    self.next();
                    break;
                }
                TokenKind::Reserved('}') | TokenKind::Eof => break,
                TokenKind::Reserved('{') | TokenKind::Error(_) => {
                    let tok = self.next();
                    self.report(tok.line, format!("unexpected '{}' in value of '{}'", tok.text(), name))?;
                    self.unread(tok);
                    self.skip_declaration();
                    return Ok(());
                }
                _ => {
                    let tok = self.next();
                    if tok.space_before && !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(&tok.text());
                }
            }
        }

        strip_important(&mut value);
        if value.is_empty() {
            return self.report(line, format!("empty value for '{}'", name));
        }
        let key = self.sheet.pool.intern_lower(name);
        let value = self.sheet.pool.intern(&value);
        dict.set(key, value);
        Ok(())
    }

    /// Skip to the end of the current declaration; `}` is left unread
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Reserved(';') if depth == 0 => {
                    self.next();
                    return;
                }
                TokenKind::Reserved('}') if depth == 0 => return,
                TokenKind::Reserved('{') => depth += 1,
                TokenKind::Reserved('}') => depth -= 1,
                _ => {}
            }
            self.next();
        }
    }

    /// Skip a statement: up to `;` or past a balanced `{ }` block
    fn skip_statement(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Eof | TokenKind::Reserved('}') => return,
                TokenKind::Reserved(';') => {
                    self.next();
                    return;
                }
                TokenKind::Reserved('{') => {
                    self.next();
                    self.skip_block();
                    return;
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    /// Skip past the `}` closing a block whose `{` was consumed
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Eof => return,
                TokenKind::Reserved('{') => depth += 1,
                TokenKind::Reserved('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Drop a trailing `!important`
fn strip_important(value: &mut String) {
    let trimmed = value.trim_end();
    let len = trimmed.len();
    let tail = len.checked_sub(9).and_then(|at| trimmed.get(at..));
    if tail.is_some_and(|t| t.eq_ignore_ascii_case("important")) {
        let rest = trimmed[..len - 9].trim_end();
        if let Some(rest) = rest.strip_suffix('!') {
            let keep = rest.trim_end().len();
            value.truncate(keep);
            return;
        }
    }
    let keep = trimmed.len();
    value.truncate(keep);
}
