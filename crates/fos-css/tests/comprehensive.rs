//! Comprehensive tests for fos-css
//!
//! Cascade behavior over documents loaded with fos-html.

use std::cell::RefCell;
use std::rc::Rc;

use fos_css::{Atom, Diagnostic, Dictionary, Flow, PseudoState, StringPool, StyleConfig, Stylesheet};
use fos_dom::{Document, NodeId, TagId};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn doc(html: &str) -> Document {
    fos_html::parse(html).unwrap()
}

fn sheet(media: &str, css: &str) -> Stylesheet {
    init_tracing();
    let mut sheet = Stylesheet::new(StyleConfig::for_media(media));
    sheet.import_str("test.css", css).unwrap();
    sheet
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id).unwrap()
}

fn value(sheet: &mut Stylesheet, doc: &Document, node: NodeId, key: &str) -> Option<String> {
    sheet
        .computed_style(doc.tree(), node)
        .unwrap()
        .and_then(|p| p.get_str(key).map(str::to_string))
}

#[test]
fn test_end_to_end_print() {
    let d = doc(r#"<h1 id="title">Hello</h1><h2>Sub</h2>"#);
    let mut s = sheet("print", "h1, h2 { font-weight: bold; } #title { color: blue; }");
    let title = by_id(&d, "title");
    let props = s.computed_style(d.tree(), title).unwrap().unwrap();
    assert_eq!(props.get_str("font-weight"), Some("bold"));
    assert_eq!(props.get_str("color"), Some("blue"));

    let h2 = d.tree().find_tag(TagId::H2).unwrap();
    assert_eq!(value(&mut s, &d, h2, "font-weight").as_deref(), Some("bold"));
    assert_eq!(value(&mut s, &d, h2, "color"), None);
}

#[test]
fn test_id_beats_ten_classes() {
    let d = doc(r#"<p id="x" class="a b c d e f g h i j">text</p>"#);
    let p = by_id(&d, "x");

    let mut id_first = sheet("screen", "#x { color: blue } p.a.b.c.d.e.f.g.h.i.j { color: red }");
    assert_eq!(value(&mut id_first, &d, p, "color").as_deref(), Some("blue"));

    let mut id_last = sheet("screen", "p.a.b.c.d.e.f.g.h.i.j { color: red } #x { color: blue }");
    assert_eq!(value(&mut id_last, &d, p, "color").as_deref(), Some("blue"));
}

#[test]
fn test_later_rule_wins_ties() {
    let d = doc(r#"<p class="a b">text</p>"#);
    let p = d.tree().find_tag(TagId::P).unwrap();

    let mut s = sheet("screen", ".a { color: red } .b { color: green }");
    assert_eq!(value(&mut s, &d, p, "color").as_deref(), Some("green"));

    let mut s = sheet("screen", ".b { color: green } .a { color: red }");
    assert_eq!(value(&mut s, &d, p, "color").as_deref(), Some("red"));
}

#[test]
fn test_memoized_results_are_shared() {
    let d = doc(
        r#"<table><tr><td class="c">1</td><td class="c">2</td><td class="c">3</td></tr></table>"#,
    );
    let mut s = sheet("screen", "td.c { color: red } tr td { padding: 2px }");
    let cells: Vec<NodeId> = d
        .tree()
        .descendants(d.tree().root())
        .filter(|&n| d.tree().tag(n) == Some(TagId::Td))
        .collect();
    assert_eq!(cells.len(), 3);

    let first = s.computed_style(d.tree(), cells[0]).unwrap().unwrap();
    for &cell in &cells[1..] {
        let props = s.computed_style(d.tree(), cell).unwrap().unwrap();
        assert!(Rc::ptr_eq(&first, &props));
    }
    assert_eq!(s.synthesized_count(), 1);

    for _ in 0..5 {
        s.computed_style(d.tree(), cells[1]).unwrap();
        s.compute(d.tree(), cells[2], PseudoState::Before).unwrap();
    }
    assert_eq!(s.synthesized_count(), 1);
}

#[test]
fn test_descendant_and_child() {
    let d = doc(r#"<div><section><p id="deep">x</p></section><p id="near">y</p></div>"#);
    let deep = by_id(&d, "deep");
    let near = by_id(&d, "near");

    let mut s = sheet("screen", "div p { color: red }");
    assert_eq!(value(&mut s, &d, deep, "color").as_deref(), Some("red"));
    assert_eq!(value(&mut s, &d, near, "color").as_deref(), Some("red"));

    let mut s = sheet("screen", "div > p { color: red }");
    assert_eq!(value(&mut s, &d, deep, "color"), None);
    assert_eq!(value(&mut s, &d, near, "color").as_deref(), Some("red"));
}

#[test]
fn test_media_gating() {
    let d = doc("<p>x</p>");
    let p = d.tree().find_tag(TagId::P).unwrap();

    let mut s = sheet("print", "@media screen { p { color: red } }");
    assert_eq!(s.rules_for_tag(TagId::P).count(), 0);
    assert!(s.computed_style(d.tree(), p).unwrap().is_none());

    let mut s = sheet("print", "@media print { p { color: red } }");
    assert_eq!(s.rules_for_tag(TagId::P).count(), 1);
    assert_eq!(value(&mut s, &d, p, "color").as_deref(), Some("red"));
}

#[test]
fn test_malformed_declaration_recovery() {
    let log: Rc<RefCell<Vec<Diagnostic>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut s = Stylesheet::new(StyleConfig::default()).with_reporter(move |d: &Diagnostic| {
        sink.borrow_mut().push(d.clone());
        Flow::Continue
    });
    s.import_str("broken.css", "p { color red; font-size: 10pt; }").unwrap();

    let d = doc("<p>x</p>");
    let p = d.tree().find_tag(TagId::P).unwrap();
    let props = s.computed_style(d.tree(), p).unwrap().unwrap();
    assert_eq!(props.get_str("font-size"), Some("10pt"));
    assert_eq!(props.get("color"), None);

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].source_name, "broken.css");
    assert_eq!(log[0].line, 1);
}

#[test]
fn test_inline_style_and_rules() {
    let d = doc(r#"<p style="color: green; margin: 0">x</p>"#);
    let p = d.tree().find_tag(TagId::P).unwrap();
    let mut s = sheet("screen", "p { margin: 4px }");
    let props = s.computed_style(d.tree(), p).unwrap().unwrap();
    assert_eq!(props.get_str("color"), Some("green"));
    assert_eq!(props.get_str("margin"), Some("4px"));
}

#[test]
fn test_structural_pseudo_classes_in_document() {
    let d = doc("<ul><li id=a>1</li> <li id=b>2</li> <li id=c>3</li></ul>");
    let mut s = sheet(
        "screen",
        "li:first-child { a: 1 } li:last-child { b: 1 } li:nth-child(2n+1) { c: 1 } :root { d: 1 }",
    );
    let a = by_id(&d, "a");
    let b = by_id(&d, "b");
    let c = by_id(&d, "c");
    assert_eq!(value(&mut s, &d, a, "a").as_deref(), Some("1"));
    assert_eq!(value(&mut s, &d, b, "a"), None);
    assert_eq!(value(&mut s, &d, c, "b").as_deref(), Some("1"));
    assert_eq!(value(&mut s, &d, a, "c").as_deref(), Some("1"));
    assert_eq!(value(&mut s, &d, b, "c"), None);
    let html = d.document_element().unwrap();
    assert_eq!(value(&mut s, &d, html, "d").as_deref(), Some("1"));
}

#[test]
fn test_implicit_attributes_in_document() {
    let d = doc(r#"<body bgcolor="ffffff"><table width="80"><tr><td align="RIGHT">x</td></tr></table></body>"#);
    let mut s = sheet("screen", "table { width: 100% }");
    let body = d.body().unwrap();
    assert_eq!(value(&mut s, &d, body, "background-color").as_deref(), Some("#ffffff"));
    let table = d.tree().find_tag(TagId::Table).unwrap();
    assert_eq!(value(&mut s, &d, table, "width").as_deref(), Some("100%"));
    let td = d.tree().find_tag(TagId::Td).unwrap();
    assert_eq!(value(&mut s, &d, td, "text-align").as_deref(), Some("right"));
}

#[test]
fn test_inherited_values_in_document() {
    let d = doc(r#"<div style="color: navy"><p><em id="e">x</em></p></div>"#);
    let mut s = sheet("screen", "p { margin: 1em }");
    let em = by_id(&d, "e");
    let color = s.inherited_value(d.tree(), em, "color").unwrap();
    assert_eq!(color.as_deref(), Some("navy"));
    assert!(s.inherited_value(d.tree(), em, "margin").unwrap().is_none());
    let props = s.computed_style(d.tree(), d.tree().parent(em).unwrap()).unwrap().unwrap();
    assert!(props.length("margin").is_some());
}

#[test]
fn test_pool_and_dictionary_properties() {
    let mut pool = StringPool::new();
    let words = ["margin", "Margin", "color", "z-index", "color", "", "a"];
    let atoms: Vec<Atom> = words.iter().map(|w| pool.intern(w)).collect();
    for (i, a) in atoms.iter().enumerate() {
        for (j, b) in atoms.iter().enumerate() {
            assert_eq!(Atom::ptr_eq(a, b), words[i] == words[j]);
        }
    }

    let mut dict = Dictionary::new();
    for (i, w) in words.iter().enumerate().filter(|(_, w)| !w.is_empty()) {
        dict.set(pool.intern(w), pool.intern(&i.to_string()));
    }
    dict.remove("COLOR");
    let keys: Vec<String> = dict.iter().map(|(k, _)| k.to_ascii_lowercase()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted);
    assert_eq!(keys, vec!["a", "margin", "z-index"]);
}
