//! Selector Model
//!
//! A selector is a chain of segments stored leaf-first: the head is the
//! rightmost compound (the subject), and each segment links back to the
//! compound on its left through `prev`. A segment's `relation` is the
//! combinator between it and its `prev`.
//!
//! Segments live in a per-selector arena and refer to each other by index.

use std::fmt;

use fos_dom::TagId;

use crate::hash::{ContentHasher, RuleHash};
use crate::pool::{Atom, StringPool};
use crate::token::{Token, TokenKind};

/// Index of a segment inside its selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentId(pub(crate) u16);

/// Combinator between a segment and the one on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Relation {
    /// Leftmost segment
    None = 0,
    /// `a b`
    Descendant = 1,
    /// `a > b`
    Child = 2,
    /// `a ~ b`
    Sibling = 3,
    /// `a + b`
    AdjacentSibling = 4,
}

impl Relation {
    fn as_css(self) -> &'static str {
        match self {
            Relation::None => "",
            Relation::Descendant => " ",
            Relation::Child => " > ",
            Relation::Sibling => " ~ ",
            Relation::AdjacentSibling => " + ",
        }
    }
}

/// Element filter of a segment
#[derive(Debug, Clone, PartialEq)]
pub enum TagFilter {
    /// `*` or no element name
    Any,
    /// A known HTML element
    Tag(TagId),
    /// An element name outside the tag table, lowercased
    Named(Atom),
}

impl TagFilter {
    /// Tag bucket this filter belongs to, `None` for the wildcard
    pub fn bucket(&self) -> Option<TagId> {
        match self {
            TagFilter::Any => None,
            TagFilter::Tag(tag) => Some(*tag),
            TagFilter::Named(_) => Some(TagId::Unknown),
        }
    }
}

/// Single matching condition of a segment
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[name]`
    AttrExists(Atom),
    /// `[name=value]`
    AttrEquals(Atom, Atom),
    /// `[name*=value]`
    AttrContains(Atom, Atom),
    /// `[name^=value]`
    AttrStartsWith(Atom, Atom),
    /// `[name$=value]`
    AttrEndsWith(Atom, Atom),
    /// `[name|=value]`
    AttrLangPrefix(Atom, Atom),
    /// `[name~=value]`
    AttrIncludes(Atom, Atom),
    /// `.name`
    Class(Atom),
    /// `#name`
    Id(Atom),
    /// `:name`, `:name(arg)` or `::name`
    PseudoClass(Atom, Option<Atom>),
}

impl Predicate {
    fn discriminant(&self) -> u8 {
        match self {
            Predicate::AttrExists(_) => 0,
            Predicate::AttrEquals(..) => 1,
            Predicate::AttrContains(..) => 2,
            Predicate::AttrStartsWith(..) => 3,
            Predicate::AttrEndsWith(..) => 4,
            Predicate::AttrLangPrefix(..) => 5,
            Predicate::AttrIncludes(..) => 6,
            Predicate::Class(_) => 7,
            Predicate::Id(_) => 8,
            Predicate::PseudoClass(..) => 9,
        }
    }

    fn feed(&self, hasher: &mut ContentHasher) {
        hasher.write_u8(self.discriminant());
        match self {
            Predicate::AttrExists(name) | Predicate::Class(name) | Predicate::Id(name) => {
                hasher.write_str(name);
            }
            Predicate::AttrEquals(name, value)
            | Predicate::AttrContains(name, value)
            | Predicate::AttrStartsWith(name, value)
            | Predicate::AttrEndsWith(name, value)
            | Predicate::AttrLangPrefix(name, value)
            | Predicate::AttrIncludes(name, value) => {
                hasher.write_str(name);
                hasher.write_str(value);
            }
            Predicate::PseudoClass(name, arg) => {
                hasher.write_str(name);
                match arg {
                    Some(arg) => {
                        hasher.write_u8(1);
                        hasher.write_str(arg);
                    }
                    None => hasher.write_u8(0),
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attr = |f: &mut fmt::Formatter<'_>, n: &Atom, op: &str, v: &Atom| {
            write!(f, "[{}{}\"{}\"]", n, op, v)
        };
        match self {
            Predicate::AttrExists(n) => write!(f, "[{}]", n),
            Predicate::AttrEquals(n, v) => attr(f, n, "=", v),
            Predicate::AttrContains(n, v) => attr(f, n, "*=", v),
            Predicate::AttrStartsWith(n, v) => attr(f, n, "^=", v),
            Predicate::AttrEndsWith(n, v) => attr(f, n, "$=", v),
            Predicate::AttrLangPrefix(n, v) => attr(f, n, "|=", v),
            Predicate::AttrIncludes(n, v) => attr(f, n, "~=", v),
            Predicate::Class(n) => write!(f, ".{}", n),
            Predicate::Id(n) => write!(f, "#{}", n),
            Predicate::PseudoClass(n, None) => write!(f, ":{}", n),
            Predicate::PseudoClass(n, Some(a)) => write!(f, ":{}({})", n, a),
        }
    }
}

/// One compound selector in a chain
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub tag: TagFilter,
    pub predicates: Vec<Predicate>,
    pub relation: Relation,
    pub prev: Option<SegmentId>,
}

/// A complex selector, stored leaf-first
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    segments: Vec<Segment>,
    head: SegmentId,
}

impl Selector {
    /// Rightmost segment (the subject)
    pub fn head(&self) -> &Segment {
        &self.segments[self.head.0 as usize]
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0 as usize]
    }

    /// Segments from the subject leftwards
    pub fn chain(&self) -> impl Iterator<Item = &Segment> {
        let mut next = Some(self.head);
        std::iter::from_fn(move || {
            let seg = self.segment(next?);
            next = seg.prev;
            Some(seg)
        })
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Structural digest: per segment from the subject leftwards, the
    /// element filter, the relation and the predicates in source order
    pub fn content_hash(&self) -> RuleHash {
        let mut hasher = ContentHasher::new();
        for seg in self.chain() {
            match &seg.tag {
                TagFilter::Any => hasher.write_u8(0),
                TagFilter::Tag(tag) => {
                    hasher.write_u8(1);
                    hasher.write_u8(*tag as u8);
                }
                TagFilter::Named(name) => {
                    hasher.write_u8(2);
                    hasher.write_str(name);
                }
            }
            hasher.write_u8(seg.relation as u8);
            hasher.write_u32(seg.predicates.len() as u32);
            for pred in &seg.predicates {
                pred.feed(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segs: Vec<&Segment> = self.chain().collect();
        segs.reverse();
        for (i, seg) in segs.iter().enumerate() {
            if i > 0 {
                f.write_str(seg.relation.as_css())?;
            }
            match &seg.tag {
                TagFilter::Any if seg.predicates.is_empty() => f.write_str("*")?,
                TagFilter::Any => {}
                TagFilter::Tag(tag) => f.write_str(tag.name())?,
                TagFilter::Named(name) => f.write_str(name)?,
            }
            for pred in &seg.predicates {
                write!(f, "{}", pred)?;
            }
        }
        Ok(())
    }
}

/// Incremental selector construction, read left to right
#[derive(Debug, Default)]
pub struct SelectorBuilder {
    segments: Vec<Segment>,
    /// Element name already given for the head segment
    tag_set: bool,
    /// Combinator waiting for the next compound
    pending: Option<Relation>,
}

impl SelectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Head segment, opening a new one after a combinator
    fn current(&mut self) -> Result<&mut Segment, &'static str> {
        if self.segments.is_empty() || self.pending.is_some() {
            if self.segments.len() >= u16::MAX as usize {
                return Err("selector is too long");
            }
            let prev = self
                .segments
                .len()
                .checked_sub(1)
                .map(|i| SegmentId(i as u16));
            let relation = match prev {
                Some(_) => self.pending.take().unwrap_or(Relation::Descendant),
                None => Relation::None,
            };
            self.segments.push(Segment {
                tag: TagFilter::Any,
                predicates: Vec::new(),
                relation,
                prev,
            });
            self.tag_set = false;
        }
        self.segments.last_mut().ok_or("empty selector")
    }

    /// Set the element filter of the current compound
    pub fn set_tag(&mut self, tag: TagFilter) -> Result<(), &'static str> {
        let starts_new = self.segments.is_empty() || self.pending.is_some();
        if !starts_new && (self.tag_set || !self.current()?.predicates.is_empty()) {
            return Err("element name must start a compound selector");
        }
        self.current()?.tag = tag;
        self.tag_set = true;
        Ok(())
    }

    /// Add a predicate to the current compound
    pub fn add_predicate(&mut self, pred: Predicate) -> Result<(), &'static str> {
        self.current()?.predicates.push(pred);
        Ok(())
    }

    /// Record a combinator; whitespace never overrides an explicit one
    pub fn combinator(&mut self, relation: Relation) -> Result<(), &'static str> {
        if self.segments.is_empty() {
            return match relation {
                Relation::Descendant => Ok(()),
                _ => Err("selector starts with a combinator"),
            };
        }
        match (self.pending, relation) {
            (Some(r), Relation::Descendant) if r != Relation::Descendant => Ok(()),
            (Some(r), _) if r != Relation::Descendant => Err("two combinators in a row"),
            _ => {
                self.pending = Some(relation);
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<Selector, &'static str> {
        if self.segments.is_empty() {
            return Err("empty selector");
        }
        if matches!(self.pending, Some(r) if r != Relation::Descendant) {
            return Err("selector ends with a combinator");
        }
        let head = SegmentId((self.segments.len() - 1) as u16);
        Ok(Selector {
            segments: self.segments,
            head,
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Read an identifier starting at `pos`, resolving backslash escapes
fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let mut out = String::new();
    while *pos < chars.len() {
        let c = chars[*pos];
        if c == '\\' && *pos + 1 < chars.len() {
            out.push(chars[*pos + 1]);
            *pos += 2;
        } else if is_ident_char(c) {
            out.push(c);
            *pos += 1;
        } else {
            break;
        }
    }
    out
}

/// Parse the selector written in `tokens` (one entry of a selector list)
pub fn parse_selector(tokens: &[Token], pool: &mut StringPool) -> Result<Selector, String> {
    let mut b = SelectorBuilder::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.space_before && i > 0 {
            b.combinator(Relation::Descendant)?;
        }
        match &tok.kind {
            TokenKind::Str(text) | TokenKind::Number(text) => {
                lex_compound(text, &mut b, pool)?;
                i += 1;
            }
            TokenKind::Reserved(':') | TokenKind::DoubleColon => {
                i = parse_pseudo(tokens, i + 1, &mut b, pool)?;
            }
            TokenKind::Reserved('[') => {
                i = parse_attribute(tokens, i + 1, &mut b, pool)?;
            }
            _ => return Err(format!("unexpected '{}' in selector", tok.text())),
        }
    }
    Ok(b.finish()?)
}

/// Element names, classes, ids and combinators inside one bare token
fn lex_compound(text: &str, b: &mut SelectorBuilder, pool: &mut StringPool) -> Result<(), String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    while pos < chars.len() {
        match chars[pos] {
            '>' => {
                b.combinator(Relation::Child)?;
                pos += 1;
            }
            '+' => {
                b.combinator(Relation::AdjacentSibling)?;
                pos += 1;
            }
            '~' => {
                b.combinator(Relation::Sibling)?;
                pos += 1;
            }
            '*' => {
                b.set_tag(TagFilter::Any)?;
                pos += 1;
            }
            c @ ('.' | '#') => {
                pos += 1;
                let name = read_ident(&chars, &mut pos);
                if name.is_empty() {
                    return Err(format!("missing name after '{}'", c));
                }
                let name = pool.intern(&name);
                b.add_predicate(if c == '.' { Predicate::Class(name) } else { Predicate::Id(name) })?;
            }
            c if is_ident_char(c) || c == '\\' => {
                let name = read_ident(&chars, &mut pos);
                let tag = match TagId::from_name(&name) {
                    TagId::Unknown => TagFilter::Named(pool.intern_lower(&name)),
                    tag => TagFilter::Tag(tag),
                };
                b.set_tag(tag)?;
            }
            c => return Err(format!("unexpected character '{}' in selector", c)),
        }
    }
    Ok(())
}

/// `:name`, `:name(arg)` or `::name`; returns the index after the pseudo
fn parse_pseudo(
    tokens: &[Token],
    mut i: usize,
    b: &mut SelectorBuilder,
    pool: &mut StringPool,
) -> Result<usize, String> {
    let text = match tokens.get(i) {
        Some(tok) if !tok.space_before => match &tok.kind {
            TokenKind::Str(s) => s.as_str(),
            _ => return Err("expected pseudo-class name".to_string()),
        },
        _ => return Err("expected pseudo-class name".to_string()),
    };
    i += 1;
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let name = read_ident(&chars, &mut pos);
    if name.is_empty() {
        return Err("expected pseudo-class name".to_string());
    }
    let name = pool.intern_lower(&name);

    if chars.get(pos) == Some(&'(') {
        let mut arg: String = chars[pos + 1..].iter().collect();
        let mut depth = 1 + arg.matches('(').count();
        loop {
            let tok = tokens
                .get(i)
                .ok_or_else(|| format!("unterminated argument of ':{}'", name))?;
            i += 1;
            if tok.is_reserved(')') {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            if let TokenKind::Str(s) = &tok.kind {
                depth += s.matches('(').count();
            }
            if tok.space_before && !arg.is_empty() {
                arg.push(' ');
            }
            arg.push_str(&tok.text());
        }
        let arg = arg.trim();
        let arg = (!arg.is_empty()).then(|| pool.intern(arg));
        b.add_predicate(Predicate::PseudoClass(name, arg))?;
    } else {
        b.add_predicate(Predicate::PseudoClass(name, None))?;
        let rest: String = chars[pos..].iter().collect();
        lex_compound(&rest, b, pool)?;
    }
    Ok(i)
}

/// `[name]`, `[name op value]`; returns the index after `]`
fn parse_attribute(
    tokens: &[Token],
    mut i: usize,
    b: &mut SelectorBuilder,
    pool: &mut StringPool,
) -> Result<usize, String> {
    let mut next = || {
        let tok = tokens.get(i);
        i += 1;
        tok.ok_or_else(|| "unterminated attribute selector".to_string())
    };

    let raw = next()?
        .bare()
        .ok_or_else(|| "expected attribute name".to_string())?
        .to_string();

    // Operator glued to the name (`href^=`), or split as `name~` `=`
    let mut name = raw.as_str();
    let mut op: Option<char> = None;
    if let Some(stripped) = name.strip_suffix('=') {
        match stripped.chars().last() {
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                op = Some(c);
                name = &stripped[..stripped.len() - 1];
            }
            _ => return Err(format!("invalid attribute operator in '{}'", raw)),
        }
    } else if let Some(c @ ('~' | '|' | '^' | '$' | '*')) = name.chars().last() {
        if next()?.bare() != Some("=") {
            return Err(format!("expected '=' after '{}'", raw));
        }
        op = Some(c);
        name = &name[..name.len() - 1];
    }
    if name.is_empty() {
        return Err("expected attribute name".to_string());
    }
    let name = pool.intern_lower(name);

    let pred = match op {
        None => {
            let tok = next()?;
            if tok.is_reserved(']') {
                b.add_predicate(Predicate::AttrExists(name))?;
                return Ok(i);
            }
            if tok.bare() != Some("=") {
                return Err(format!("unexpected '{}' in attribute selector", tok.text()));
            }
            Predicate::AttrEquals(name, attribute_value(next()?, pool)?)
        }
        Some(c) => {
            let value = attribute_value(next()?, pool)?;
            match c {
                '~' => Predicate::AttrIncludes(name, value),
                '|' => Predicate::AttrLangPrefix(name, value),
                '^' => Predicate::AttrStartsWith(name, value),
                '$' => Predicate::AttrEndsWith(name, value),
                _ => Predicate::AttrContains(name, value),
            }
        }
    };
    if !next()?.is_reserved(']') {
        return Err("expected ']'".to_string());
    }
    b.add_predicate(pred)?;
    Ok(i)
}

fn attribute_value(tok: &Token, pool: &mut StringPool) -> Result<Atom, String> {
    match &tok.kind {
        TokenKind::Quoted(s) | TokenKind::Str(s) | TokenKind::Number(s) => Ok(pool.intern(s)),
        _ => Err(format!("unexpected '{}' as attribute value", tok.text())),
    }
}
