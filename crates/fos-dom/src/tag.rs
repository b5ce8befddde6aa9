//! Element Tag Enumeration
//!
//! HTML element names mapped to a compact fixed enumeration. Names outside
//! the table map to [`TagId::Unknown`]; callers that need to tell unknown
//! elements apart compare the element's stored name.

macro_rules! html_tags {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Element tag identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum TagId {
            /// Element whose name is not in the table
            Unknown,
            $($variant,)*
        }

        impl TagId {
            /// Every known tag, in declaration order
            pub const ALL: &'static [TagId] = &[$(TagId::$variant,)*];

            /// Look up a tag by name (ASCII case-insensitive)
            pub fn from_name(name: &str) -> TagId {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return TagId::$variant;
                    }
                )*
                TagId::Unknown
            }

            /// Canonical lowercase name, empty for `Unknown`
            pub fn name(self) -> &'static str {
                match self {
                    TagId::Unknown => "",
                    $(TagId::$variant => $name,)*
                }
            }
        }
    };
}

html_tags! {
    A => "a",
    Abbr => "abbr",
    Address => "address",
    Area => "area",
    Article => "article",
    Aside => "aside",
    Audio => "audio",
    B => "b",
    Base => "base",
    Bdi => "bdi",
    Bdo => "bdo",
    Big => "big",
    Blockquote => "blockquote",
    Body => "body",
    Br => "br",
    Button => "button",
    Canvas => "canvas",
    Caption => "caption",
    Center => "center",
    Cite => "cite",
    Code => "code",
    Col => "col",
    Colgroup => "colgroup",
    Dd => "dd",
    Del => "del",
    Details => "details",
    Dfn => "dfn",
    Dialog => "dialog",
    Div => "div",
    Dl => "dl",
    Dt => "dt",
    Em => "em",
    Embed => "embed",
    Fieldset => "fieldset",
    Figcaption => "figcaption",
    Figure => "figure",
    Font => "font",
    Footer => "footer",
    Form => "form",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    Head => "head",
    Header => "header",
    Hr => "hr",
    Html => "html",
    I => "i",
    Iframe => "iframe",
    Img => "img",
    Input => "input",
    Ins => "ins",
    Kbd => "kbd",
    Label => "label",
    Legend => "legend",
    Li => "li",
    Link => "link",
    Main => "main",
    Mark => "mark",
    Meta => "meta",
    Nav => "nav",
    Object => "object",
    Ol => "ol",
    Optgroup => "optgroup",
    Option => "option",
    P => "p",
    Pre => "pre",
    Q => "q",
    S => "s",
    Samp => "samp",
    Script => "script",
    Section => "section",
    Select => "select",
    Small => "small",
    Source => "source",
    Span => "span",
    Strike => "strike",
    Strong => "strong",
    Style => "style",
    Sub => "sub",
    Summary => "summary",
    Sup => "sup",
    Table => "table",
    Tbody => "tbody",
    Td => "td",
    Template => "template",
    Textarea => "textarea",
    Tfoot => "tfoot",
    Th => "th",
    Thead => "thead",
    Time => "time",
    Title => "title",
    Tr => "tr",
    Tt => "tt",
    U => "u",
    Ul => "ul",
    Var => "var",
    Video => "video",
    Wbr => "wbr",
}

impl TagId {
    /// Whether this is a known tag
    #[inline]
    pub fn is_known(self) -> bool {
        self != TagId::Unknown
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagId::Unknown => f.write_str("<unknown>"),
            tag => f.write_str(tag.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(TagId::from_name("div"), TagId::Div);
        assert_eq!(TagId::from_name("DIV"), TagId::Div);
        assert_eq!(TagId::from_name("Td"), TagId::Td);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(TagId::from_name("my-widget"), TagId::Unknown);
        assert!(!TagId::Unknown.is_known());
        assert_eq!(TagId::Unknown.name(), "");
    }

    #[test]
    fn test_names_roundtrip_table() {
        for &tag in TagId::ALL {
            assert_eq!(TagId::from_name(tag.name()), tag);
        }
    }
}
