//! CSS Tokenizer
//!
//! Splits stylesheet text into a small set of token kinds. Anything that is
//! not a reserved character, a quoted string or whitespace accumulates into
//! a bare string token; the selector, declaration and media-query readers
//! interpret those strings themselves.
//!
//! - `/* ... */` comments are dropped.
//! - `<!--` and `-->` are ignored.
//! - `=` directly after a relational character (`< > * ^ $ | -`) joins the
//!   preceding token (`href^=`); any other `=` ends the current token and
//!   becomes a token of its own.

use std::borrow::Cow;

use crate::source::CssSource;

/// Characters that always form a token by themselves
pub const RESERVED: &[char] = &[',', ':', ';', '{', '}', '[', ']', ')'];

/// Characters that fold a following `=` into the token
const RELATIONAL: &[char] = &['<', '>', '*', '^', '$', '|', '-'];

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// One of [`RESERVED`]
    Reserved(char),
    /// `::`
    DoubleColon,
    /// Contents of a quoted string, escapes resolved
    Quoted(String),
    /// Bare token that reads as a number
    Number(String),
    /// Any other bare token
    Str(String),
    /// Lexical error (unterminated string)
    Error(String),
    Eof,
}

/// Token with position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Line the token starts on
    pub line: u32,
    /// Whitespace separates this token from the previous one
    pub space_before: bool,
}

impl Token {
    #[inline]
    pub fn is_reserved(&self, c: char) -> bool {
        self.kind == TokenKind::Reserved(c)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Text of a bare string or number token
    pub fn bare(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Str(s) | TokenKind::Number(s) => Some(s),
            _ => None,
        }
    }

    /// Source-like rendering, used to rebuild declaration values
    pub fn text(&self) -> Cow<'_, str> {
        match &self.kind {
            TokenKind::Reserved(c) => Cow::Owned(c.to_string()),
            TokenKind::DoubleColon => Cow::Borrowed("::"),
            TokenKind::Quoted(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                Cow::Owned(out)
            }
            TokenKind::Number(s) | TokenKind::Str(s) | TokenKind::Error(s) => Cow::Borrowed(s),
            TokenKind::Eof => Cow::Borrowed(""),
        }
    }
}

/// Tokenizer over a [`CssSource`]
pub struct Tokenizer {
    src: CssSource,
}

impl Tokenizer {
    pub fn new(src: CssSource) -> Self {
        Self { src }
    }

    /// Source name for diagnostics
    pub fn name(&self) -> &str {
        self.src.name()
    }

    pub fn line(&self) -> u32 {
        self.src.line()
    }

    /// Skip whitespace, comments and HTML comment markers.
    /// Returns whether whitespace was seen.
    fn skip_blank(&mut self) -> bool {
        let mut space = false;
        loop {
            match self.src.peek() {
                Some(c) if c.is_whitespace() => {
                    self.src.next_char();
                    space = true;
                }
                Some('/') if self.src.peek_nth(1) == Some('*') => {
                    self.src.eat("/*");
                    while !self.src.at_eof() && !self.src.eat("*/") {
                        self.src.next_char();
                    }
                }
                Some('<') if self.src.eat("<!--") => space = true,
                Some('-') if self.src.eat("-->") => space = true,
                _ => return space,
            }
        }
    }

    /// Read the next token
    pub fn next_token(&mut self) -> Token {
        let space_before = self.skip_blank();
        let line = self.src.line();
        let kind = match self.src.next_char() {
            None => TokenKind::Eof,
            Some(':') if self.src.peek() == Some(':') => {
                self.src.next_char();
                TokenKind::DoubleColon
            }
            Some(c) if RESERVED.contains(&c) => TokenKind::Reserved(c),
            Some(q @ ('"' | '\'')) => self.quoted(q),
            Some('=') => TokenKind::Str("=".to_string()),
            Some(c) => self.bare(c),
        };
        Token { kind, line, space_before }
    }

    fn quoted(&mut self, quote: char) -> TokenKind {
        let mut out = String::new();
        loop {
            match self.src.next_char() {
                None => return TokenKind::Error(format!("unterminated string {}{}", quote, out)),
                Some('\n') => {
                    self.src.unget('\n');
                    return TokenKind::Error(format!("unterminated string {}{}", quote, out));
                }
                Some(c) if c == quote => return TokenKind::Quoted(out),
                Some('\\') => match self.src.next_char() {
                    None => {}
                    Some('\n') => {}
                    Some(h) if h.is_ascii_hexdigit() => out.push(self.hex_escape(h)),
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// `\XXXXXX` escape; the first digit is already consumed
    fn hex_escape(&mut self, first: char) -> char {
        let mut value = first.to_digit(16).unwrap_or(0);
        for _ in 0..5 {
            match self.src.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    value = value * 16 + d;
                    self.src.next_char();
                }
                None => break,
            }
        }
        if self.src.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.src.next_char();
        }
        char::from_u32(value)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn bare(&mut self, first: char) -> TokenKind {
        let mut buf = String::new();
        buf.push(first);
        if first == '\\' {
            if let Some(c) = self.src.next_char() {
                buf.push(c);
            }
        }
        while let Some(c) = self.src.peek() {
            if c.is_whitespace() || RESERVED.contains(&c) || c == '"' || c == '\'' {
                break;
            }
            if c == '/' && self.src.peek_nth(1) == Some('*') {
                break;
            }
            if c == '=' {
                if buf.ends_with(RELATIONAL) {
                    self.src.next_char();
                    buf.push('=');
                }
                break;
            }
            self.src.next_char();
            buf.push(c);
            if c == '\\' {
                if let Some(esc) = self.src.next_char() {
                    buf.push(esc);
                }
            }
        }
        if looks_numeric(&buf) {
            TokenKind::Number(buf)
        } else {
            TokenKind::Str(buf)
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        if tok.is_eof() { None } else { Some(tok) }
    }
}

fn looks_numeric(s: &str) -> bool {
    let starts = s
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '+' || c == '-');
    starts && s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(css: &str) -> Vec<TokenKind> {
        Tokenizer::new(CssSource::from_text("t", css)).map(|t| t.kind).collect()
    }

    fn s(v: &str) -> TokenKind {
        TokenKind::Str(v.to_string())
    }

    #[test]
    fn test_rule_tokens() {
        assert_eq!(
            kinds("div.a > p { color: red; }"),
            vec![
                s("div.a"),
                s(">"),
                s("p"),
                TokenKind::Reserved('{'),
                s("color"),
                TokenKind::Reserved(':'),
                s("red"),
                TokenKind::Reserved(';'),
                TokenKind::Reserved('}'),
            ]
        );
    }

    #[test]
    fn test_space_flags() {
        let toks: Vec<Token> = Tokenizer::new(CssSource::from_text("t", "a b:hover")).collect();
        assert!(!toks[0].space_before);
        assert!(toks[1].space_before);
        assert!(!toks[2].space_before);
        assert_eq!(toks[2].kind, TokenKind::Reserved(':'));
    }

    #[test]
    fn test_comments_and_cdo() {
        assert_eq!(
            kinds("<!-- a /* hidden ; */ b -->"),
            vec![s("a"), s("b")]
        );
    }

    #[test]
    fn test_double_colon() {
        assert_eq!(
            kinds("p::before"),
            vec![s("p"), TokenKind::DoubleColon, s("before")]
        );
    }

    #[test]
    fn test_operator_folding() {
        assert_eq!(
            kinds(r#"[href^="http"]"#),
            vec![
                TokenKind::Reserved('['),
                s("href^="),
                TokenKind::Quoted("http".to_string()),
                TokenKind::Reserved(']'),
            ]
        );
        assert_eq!(
            kinds("[type=text]"),
            vec![
                TokenKind::Reserved('['),
                s("type"),
                s("="),
                s("text"),
                TokenKind::Reserved(']'),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1.5 -2 10pt"),
            vec![
                TokenKind::Number("1.5".to_string()),
                TokenKind::Number("-2".to_string()),
                s("10pt"),
            ]
        );
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'c\26 d'"#),
            vec![
                TokenKind::Quoted("a\"b".to_string()),
                TokenKind::Quoted("c&d".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let toks: Vec<Token> =
            Tokenizer::new(CssSource::from_text("t", "\"abc\nnext")).collect();
        assert!(matches!(toks[0].kind, TokenKind::Error(_)));
        assert_eq!(toks[1].kind, s("next"));
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn test_token_text() {
        let tok = Token {
            kind: TokenKind::Quoted("Times \"New\"".to_string()),
            line: 1,
            space_before: false,
        };
        assert_eq!(tok.text(), "\"Times \\\"New\\\"\"");
    }
}
