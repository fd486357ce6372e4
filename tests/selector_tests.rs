mod common;

use common::{element, form_page, input};
use field_detection::dom::document::{Document, NodeId};
use field_detection::dom::selector::SelectorList;
use field_detection::dom::snapshot_model::{DocumentSnapshot, DomNode};

fn first(doc: &Document, tag: &str) -> NodeId {
    doc.find(|n| doc.tag(n) == tag).unwrap()
}

fn matches(selector: &str, doc: &Document, id: NodeId) -> bool {
    SelectorList::parse(selector).unwrap().matches(doc, id)
}

// ============================================================================
// Simple selectors
// ============================================================================

#[test]
fn id_class_and_tag_selectors() {
    let snap = form_page(vec![input(&[
        ("id", "first_name"),
        ("class", "text-input application-name"),
    ])]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches("#first_name", &doc, el));
    assert!(matches("input#first_name", &doc, el));
    assert!(matches(".application-name", &doc, el));
    assert!(matches("INPUT.text-input", &doc, el), "Tag match is case-insensitive");
    assert!(!matches("#last_name", &doc, el));
    assert!(!matches("textarea", &doc, el));
    assert!(!matches(".application", &doc, el), "Class match is whole-token");
}

#[test]
fn attribute_operators() {
    let snap = form_page(vec![input(&[
        ("name", "job_application[first_name]"),
        ("type", "file"),
        ("lang", "en-US"),
        ("data-tags", "alpha beta"),
    ])]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches(r#"input[name="job_application[first_name]"]"#, &doc, el));
    assert!(matches(r#"input[type="file"][name*="first"]"#, &doc, el));
    assert!(matches(r#"[name^="job_"]"#, &doc, el));
    assert!(matches(r#"[name$="name]"]"#, &doc, el));
    assert!(matches(r#"[lang|="en"]"#, &doc, el));
    assert!(matches(r#"[data-tags~="beta"]"#, &doc, el));
    assert!(matches("[type]", &doc, el));
    assert!(matches("[type=file]", &doc, el), "Unquoted value");
    assert!(!matches(r#"[name*=""]"#, &doc, el), "Empty substring never matches");
    assert!(!matches(r#"[placeholder]"#, &doc, el));
}

#[test]
fn case_insensitive_flag() {
    let snap = form_page(vec![input(&[("name", "LinkedIn_Profile")])]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches(r#"input[name*="linkedin" i]"#, &doc, el));
    assert!(!matches(r#"input[name*="linkedin"]"#, &doc, el));
    assert!(!matches(r#"input[name*="linkedin" s]"#, &doc, el));
}

#[test]
fn not_pseudo_class() {
    let snap = form_page(vec![
        input(&[("name", "home_address")]),
        input(&[("name", "email_address")]),
    ]);
    let doc = Document::build(&snap).unwrap();
    let inputs: Vec<NodeId> = doc.elements().filter(|n| doc.tag(*n) == "input").collect();

    let sel = r#"input[name*="address" i]:not([name*="email"])"#;
    assert!(matches(sel, &doc, inputs[0]));
    assert!(!matches(sel, &doc, inputs[1]));
}

// ============================================================================
// Combinators and structural pseudo-classes
// ============================================================================

#[test]
fn descendant_and_child_combinators() {
    let snap = form_page(vec![
        element("div", &[("data-automation-id", "legalNameSection_firstName")]).with_child(
            element("div", &[("class", "wrapper")]).with_child(input(&[("type", "text")])),
        ),
    ]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches(
        r#"[data-automation-id="legalNameSection_firstName"] input"#,
        &doc,
        el
    ));
    assert!(matches(".wrapper > input", &doc, el));
    assert!(!matches(
        r#"[data-automation-id="legalNameSection_firstName"] > input"#,
        &doc,
        el
    ));
    assert!(!matches(r#"[data-ui="firstName"] input"#, &doc, el));
}

#[test]
fn sibling_combinators() {
    let snap = form_page(vec![
        element("label", &[]).with_text("Email"),
        element("span", &[]),
        input(&[("name", "email")]),
    ]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches("span + input", &doc, el));
    assert!(!matches("label + input", &doc, el));
    assert!(matches("label ~ input", &doc, el));
}

#[test]
fn nth_of_type_family() {
    let snap = form_page(vec![
        input(&[("type", "text")]),
        element("textarea", &[]),
        input(&[("type", "text")]),
        input(&[("type", "text")]),
    ]);
    let doc = Document::build(&snap).unwrap();
    let inputs: Vec<NodeId> = doc.elements().filter(|n| doc.tag(*n) == "input").collect();

    assert!(matches("input:nth-of-type(2)", &doc, inputs[1]));
    assert!(matches("input:first-of-type", &doc, inputs[0]));
    assert!(matches("input:last-of-type", &doc, inputs[2]));
    assert!(matches("input:nth-last-of-type(3)", &doc, inputs[0]));
    assert!(!matches("input:nth-of-type(1)", &doc, inputs[2]));
}

#[test]
fn selector_list_matches_any_member() {
    let snap = form_page(vec![input(&[("name", "phone")])]);
    let doc = Document::build(&snap).unwrap();
    let el = first(&doc, "input");

    assert!(matches(r#"#phone, input[name="phone"]"#, &doc, el));
}

#[test]
fn text_nodes_never_match() {
    let snap = DocumentSnapshot::new("about:blank", DomNode::element("p").with_text("hello"));
    let doc = Document::build(&snap).unwrap();
    let text = doc.children(doc.root())[0];
    assert!(!doc.is_element(text));
    assert!(!matches("*", &doc, text));
}

// ============================================================================
// Parse errors
// ============================================================================

#[test]
fn malformed_selectors_report_position() {
    let err = SelectorList::parse("input[name=").unwrap_err();
    assert_eq!(err.selector, "input[name=");
    assert!(err.position > 0);

    assert!(SelectorList::parse("input:focus-within").is_err());
    assert!(SelectorList::parse("#").is_err());
    assert!(SelectorList::parse("a,,b").is_err());
}
