//! Presentational Attributes
//!
//! Legacy HTML attributes (`bgcolor`, `width`, `align`, ...) that feed the
//! cascade as if they were declarations. They seed the merged property set
//! before any stylesheet rule, so every rule overrides them.

use std::borrow::Cow;

use fos_dom::{ElementData, TagId};

use crate::dict::Dictionary;
use crate::pool::StringPool;

/// How an attribute value becomes a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue {
    /// Lowercased keyword
    Keyword,
    /// Bare integers gain `px`
    Length,
    /// Bare hex digits gain `#`
    Color,
    /// `<font size>`: 1..7 or relative +n/-n
    FontSize,
    /// Copied unchanged
    Raw,
}

/// One attribute-to-property mapping
#[derive(Debug)]
pub struct ImplicitAttr {
    pub attr: &'static str,
    pub property: &'static str,
    /// Elements the attribute applies to
    pub tags: &'static [TagId],
    pub value: AttrValue,
}

const SIZED: &[TagId] = &[
    TagId::Img,
    TagId::Table,
    TagId::Td,
    TagId::Th,
    TagId::Col,
    TagId::Iframe,
    TagId::Canvas,
    TagId::Video,
    TagId::Object,
    TagId::Embed,
];

const ALIGNED: &[TagId] = &[
    TagId::Div,
    TagId::P,
    TagId::H1,
    TagId::H2,
    TagId::H3,
    TagId::H4,
    TagId::H5,
    TagId::H6,
    TagId::Td,
    TagId::Th,
    TagId::Tr,
    TagId::Caption,
];

/// The attribute table
pub static IMPLICIT_ATTRS: &[ImplicitAttr] = &[
    ImplicitAttr {
        attr: "bgcolor",
        property: "background-color",
        tags: &[TagId::Body, TagId::Table, TagId::Tr, TagId::Td, TagId::Th],
        value: AttrValue::Color,
    },
    ImplicitAttr {
        attr: "text",
        property: "color",
        tags: &[TagId::Body],
        value: AttrValue::Color,
    },
    ImplicitAttr {
        attr: "color",
        property: "color",
        tags: &[TagId::Font],
        value: AttrValue::Color,
    },
    ImplicitAttr {
        attr: "face",
        property: "font-family",
        tags: &[TagId::Font],
        value: AttrValue::Raw,
    },
    ImplicitAttr {
        attr: "size",
        property: "font-size",
        tags: &[TagId::Font],
        value: AttrValue::FontSize,
    },
    ImplicitAttr {
        attr: "width",
        property: "width",
        tags: SIZED,
        value: AttrValue::Length,
    },
    ImplicitAttr {
        attr: "height",
        property: "height",
        tags: SIZED,
        value: AttrValue::Length,
    },
    ImplicitAttr {
        attr: "align",
        property: "text-align",
        tags: ALIGNED,
        value: AttrValue::Keyword,
    },
    ImplicitAttr {
        attr: "valign",
        property: "vertical-align",
        tags: &[TagId::Td, TagId::Th, TagId::Tr],
        value: AttrValue::Keyword,
    },
    ImplicitAttr {
        attr: "border",
        property: "border-width",
        tags: &[TagId::Table, TagId::Img],
        value: AttrValue::Length,
    },
];

const FONT_SIZES: [&str; 7] = [
    "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
];

fn convert(kind: AttrValue, raw: &str) -> Option<Cow<'_, str>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match kind {
        AttrValue::Raw => Some(Cow::Borrowed(raw)),
        AttrValue::Keyword => Some(Cow::Owned(raw.to_ascii_lowercase())),
        AttrValue::Length => {
            if raw.bytes().all(|b| b.is_ascii_digit()) {
                Some(Cow::Owned(format!("{}px", raw)))
            } else {
                Some(Cow::Borrowed(raw))
            }
        }
        AttrValue::Color => {
            let bare_hex = matches!(raw.len(), 3 | 6) && raw.bytes().all(|b| b.is_ascii_hexdigit());
            if bare_hex {
                Some(Cow::Owned(format!("#{}", raw)))
            } else {
                Some(Cow::Borrowed(raw))
            }
        }
        AttrValue::FontSize => {
            let size: i32 = match raw.as_bytes()[0] {
                b'+' => 3 + raw[1..].parse::<i32>().ok()?,
                b'-' => 3 - raw[1..].parse::<i32>().ok()?,
                _ => raw.parse().ok()?,
            };
            let idx = size.clamp(1, 7) as usize - 1;
            Some(Cow::Borrowed(FONT_SIZES[idx]))
        }
    }
}

/// Add the presentational properties of `el` to `dict`
pub fn apply(el: &ElementData, pool: &mut StringPool, dict: &mut Dictionary) {
    for entry in IMPLICIT_ATTRS {
        if !entry.tags.contains(&el.tag) {
            continue;
        }
        let Some(raw) = el.get_attr(entry.attr) else {
            continue;
        };
        if let Some(value) = convert(entry.value, raw) {
            dict.set(pool.intern(entry.property), pool.intern(&value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut el = ElementData::new(name);
        for (k, v) in attrs {
            el.set_attr(k, v);
        }
        el
    }

    fn props(el: &ElementData) -> Dictionary {
        let mut pool = StringPool::new();
        let mut dict = Dictionary::new();
        apply(el, &mut pool, &mut dict);
        dict
    }

    #[test]
    fn test_table_cell() {
        let td = element(
            "td",
            &[("bgcolor", "ff0000"), ("width", "120"), ("align", "CENTER"), ("valign", "top")],
        );
        let d = props(&td);
        assert_eq!(d.get_str("background-color"), Some("#ff0000"));
        assert_eq!(d.get_str("width"), Some("120px"));
        assert_eq!(d.get_str("text-align"), Some("center"));
        assert_eq!(d.get_str("vertical-align"), Some("top"));
    }

    #[test]
    fn test_scoped_to_tags() {
        let div = element("div", &[("bgcolor", "red"), ("width", "50")]);
        assert!(props(&div).is_empty());
        let body = element("body", &[("bgcolor", "white"), ("text", "black")]);
        let d = props(&body);
        assert_eq!(d.get_str("background-color"), Some("white"));
        assert_eq!(d.get_str("color"), Some("black"));
    }

    #[test]
    fn test_font() {
        let font = element("font", &[("size", "+2"), ("face", "Arial, sans-serif"), ("color", "abc")]);
        let d = props(&font);
        assert_eq!(d.get_str("font-size"), Some("x-large"));
        assert_eq!(d.get_str("font-family"), Some("Arial, sans-serif"));
        assert_eq!(d.get_str("color"), Some("#abc"));
        assert_eq!(convert(AttrValue::Color, "navy").as_deref(), Some("navy"));
        assert_eq!(convert(AttrValue::FontSize, "9").as_deref(), Some("xxx-large"));
        assert_eq!(convert(AttrValue::FontSize, "big"), None);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(convert(AttrValue::Length, "50%").as_deref(), Some("50%"));
        assert_eq!(convert(AttrValue::Length, " 7 ").as_deref(), Some("7px"));
        assert_eq!(convert(AttrValue::Length, ""), None);
    }
}
