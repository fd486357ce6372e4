mod common;

use common::{element, form_page, input, label_for};
use field_detection::dom::document::Document;
use field_detection::dom::snapshot_model::DocumentSnapshot;
use field_detection::field::candidate::{FieldCandidate, enumerate_candidates};
use field_detection::field::field_types::FieldType;
use field_detection::signal::evaluators::{
    AriaLabelEvaluator, AutocompleteEvaluator, CssDataAttrEvaluator, EvalContext, EvalError,
    InputKindEvaluator, LabelEvaluator, NameIdEvaluator, PlaceholderEvaluator,
    SectionContextEvaluator, SignalEvaluator, default_evaluators, evaluate_all,
};
use field_detection::signal::signal_model::{Signal, SignalKind};

/// Run one evaluator against the first candidate of a snapshot.
fn eval(evaluator: &dyn SignalEvaluator, snap: &DocumentSnapshot) -> Option<Signal> {
    let doc = Document::build(snap).unwrap();
    let candidate = first_candidate(&doc);
    let cx = EvalContext {
        doc: &doc,
        candidate: &candidate,
    };
    evaluator.evaluate(&cx).unwrap()
}

fn first_candidate(doc: &Document) -> FieldCandidate {
    enumerate_candidates(doc).candidates.remove(0)
}

// ============================================================================
// Autofill hint
// ============================================================================

#[test]
fn autocomplete_uses_last_token() {
    let snap = form_page(vec![input(&[("autocomplete", "shipping email")])]);
    let signal = eval(&AutocompleteEvaluator, &snap).unwrap();

    assert!(signal.matched);
    assert_eq!(signal.signal, SignalKind::Autocomplete);
    assert_eq!(signal.suggested_type, FieldType::Email);
    assert_eq!(signal.weight, 0.95);
    assert_eq!(signal.raw_value, "shipping email");
    assert_eq!(signal.reason, "autocomplete=\"shipping email\" → email");
}

#[test]
fn autocomplete_is_case_insensitive() {
    let snap = form_page(vec![input(&[("autocomplete", "Given-Name")])]);
    let signal = eval(&AutocompleteEvaluator, &snap).unwrap();
    assert_eq!(signal.suggested_type, FieldType::FirstName);
}

#[test]
fn unmapped_autocomplete_is_negative_evidence() {
    let snap = form_page(vec![input(&[("autocomplete", "off")])]);
    let signal = eval(&AutocompleteEvaluator, &snap).unwrap();

    assert!(!signal.matched);
    assert_eq!(signal.suggested_type, FieldType::Unknown);
    assert_eq!(signal.reason, "autocomplete=\"off\" not in map");
}

#[test]
fn missing_autocomplete_emits_nothing() {
    let snap = form_page(vec![input(&[("name", "x")])]);
    assert!(eval(&AutocompleteEvaluator, &snap).is_none());
}

// ============================================================================
// Name / id
// ============================================================================

#[test]
fn name_id_is_always_emitted() {
    let snap = form_page(vec![input(&[("name", "job_application[first_name]")])]);
    let signal = eval(&NameIdEvaluator, &snap).unwrap();
    assert!(signal.matched);
    assert_eq!(signal.suggested_type, FieldType::FirstName);
    assert_eq!(signal.raw_value, "job_application[first_name]");
    assert_eq!(
        signal.reason,
        "name/id matched /first[_-]?name|fname|given[_-]?name/"
    );

    let snap = form_page(vec![input(&[("name", "q_1234")])]);
    let signal = eval(&NameIdEvaluator, &snap).unwrap();
    assert!(!signal.matched);
    assert_eq!(signal.reason, "name=\"q_1234\" id=\"\": no pattern match");
}

#[test]
fn name_id_anchored_patterns_need_the_whole_text() {
    // "{name} {id}" with an empty id leaves a trailing space, trimmed away
    let snap = form_page(vec![input(&[("name", "name")])]);
    let signal = eval(&NameIdEvaluator, &snap).unwrap();
    assert_eq!(signal.suggested_type, FieldType::FullName);
}

// ============================================================================
// Input kind
// ============================================================================

#[test]
fn input_kind_maps_only_meaningful_kinds() {
    let cases = [
        ("email", Some(FieldType::Email)),
        ("tel", Some(FieldType::Phone)),
        ("url", Some(FieldType::WebsiteUrl)),
        ("file", Some(FieldType::ResumeUpload)),
        ("text", None),
        ("number", None),
    ];
    for (kind, expected) in cases {
        let snap = form_page(vec![input(&[("type", kind), ("name", "x")])]);
        let signal = eval(&InputKindEvaluator, &snap).unwrap();
        assert_eq!(signal.raw_value, kind);
        match expected {
            Some(field_type) => {
                assert!(signal.matched, "{} should match", kind);
                assert_eq!(signal.suggested_type, field_type);
            }
            None => assert!(!signal.matched, "{} should not match", kind),
        }
    }
}

#[test]
fn textarea_kind_is_tag_name() {
    let snap = form_page(vec![element("textarea", &[("name", "x")])]);
    let signal = eval(&InputKindEvaluator, &snap).unwrap();
    assert_eq!(signal.raw_value, "textarea");
    assert_eq!(signal.reason, "type=\"textarea\" not in type map");
}

// ============================================================================
// Prose evaluators
// ============================================================================

#[test]
fn placeholder_and_aria_use_prose_patterns() {
    let snap = form_page(vec![input(&[
        ("placeholder", "Your LinkedIn profile"),
        ("aria-label", "Phone number"),
    ])]);

    let placeholder = eval(&PlaceholderEvaluator, &snap).unwrap();
    assert_eq!(placeholder.signal, SignalKind::Placeholder);
    assert_eq!(placeholder.weight, 0.65);
    assert_eq!(placeholder.suggested_type, FieldType::LinkedinUrl);

    let aria = eval(&AriaLabelEvaluator, &snap).unwrap();
    assert_eq!(aria.signal, SignalKind::AriaLabel);
    assert_eq!(aria.weight, 0.75);
    assert_eq!(aria.suggested_type, FieldType::Phone);
}

#[test]
fn empty_prose_attributes_emit_nothing() {
    let snap = form_page(vec![input(&[("placeholder", ""), ("name", "x")])]);
    assert!(eval(&PlaceholderEvaluator, &snap).is_none());
    assert!(eval(&AriaLabelEvaluator, &snap).is_none());
}

// ============================================================================
// Label
// ============================================================================

#[test]
fn label_for_weighs_more_than_parent_label() {
    let snap = form_page(vec![label_for("a", "Email address"), input(&[("id", "a")])]);
    let signal = eval(&LabelEvaluator, &snap).unwrap();
    assert_eq!(signal.signal, SignalKind::LabelFor);
    assert_eq!(signal.weight, 0.75);
    assert_eq!(signal.suggested_type, FieldType::Email);

    let snap = form_page(vec![
        element("label", &[]).with_text("Email address").with_child(input(&[])),
    ]);
    let signal = eval(&LabelEvaluator, &snap).unwrap();
    assert_eq!(signal.signal, SignalKind::ParentLabel);
    assert_eq!(signal.weight, 0.70);
}

#[test]
fn first_matching_label_source_wins() {
    // label[for] text is unrelated, the enclosing Ashby container label matches
    let snap = form_page(vec![
        label_for("q", "Question 4"),
        element("div", &[("data-ui", "phone")]).with_children(vec![
            element("label", &[]).with_text("Phone"),
            input(&[("id", "q")]),
        ]),
    ]);
    let signal = eval(&LabelEvaluator, &snap).unwrap();

    assert!(signal.matched);
    assert_eq!(signal.signal, SignalKind::ParentLabel);
    assert_eq!(signal.suggested_type, FieldType::Phone);
    assert_eq!(signal.raw_value, "Phone");
}

#[test]
fn unmatched_label_reports_first_source() {
    let snap = form_page(vec![
        label_for("q", "Why do you want to join us?"),
        input(&[("id", "q")]),
    ]);
    let signal = eval(&LabelEvaluator, &snap).unwrap();

    assert!(!signal.matched);
    assert_eq!(signal.signal, SignalKind::LabelFor);
    assert_eq!(signal.raw_value, "Why do you want to join us?");
}

#[test]
fn workday_container_label() {
    let snap = form_page(vec![
        element("div", &[("data-automation-id", "legalNameSection_lastName")]).with_children(
            vec![
                element("label", &[]).with_text("Last Name"),
                element("div", &[]).with_child(input(&[("type", "text")])),
            ],
        ),
    ]);
    let signal = eval(&LabelEvaluator, &snap).unwrap();
    assert_eq!(signal.suggested_type, FieldType::LastName);
    assert_eq!(signal.signal, SignalKind::ParentLabel);
}

#[test]
fn no_label_emits_nothing() {
    let snap = form_page(vec![input(&[("name", "x")])]);
    assert!(eval(&LabelEvaluator, &snap).is_none());
}

// ============================================================================
// Class / data attributes
// ============================================================================

#[test]
fn css_data_attr_matches_identifier_patterns() {
    let snap = form_page(vec![input(&[
        ("class", "form-control"),
        ("data-qa", "candidate-email"),
    ])]);
    let signal = eval(&CssDataAttrEvaluator, &snap).unwrap();
    assert!(signal.matched);
    assert_eq!(signal.weight, 0.50);
    assert_eq!(signal.suggested_type, FieldType::Email);
    assert_eq!(signal.raw_value, "form-control data-qa=candidate-email");
}

#[test]
fn css_raw_value_is_truncated() {
    let long = "x".repeat(300);
    let snap = form_page(vec![input(&[("class", long.as_str())])]);
    let signal = eval(&CssDataAttrEvaluator, &snap).unwrap();
    assert_eq!(signal.raw_value.chars().count(), 100);
    assert!(!signal.matched);
}

#[test]
fn data_attrs_join_in_name_order() {
    let snap = DocumentSnapshot::from_json(
        r#"{"url":"u","root":{"tag":"form","children":[
            {"tag":"input","attributes":{"data-test":"zip","data-automation-id":"city"}}
        ]}}"#,
    )
    .unwrap();
    let signal = eval(&CssDataAttrEvaluator, &snap).unwrap();
    assert_eq!(signal.raw_value, "data-automation-id=city data-test=zip");
}

#[test]
fn no_class_or_data_emits_nothing() {
    let snap = form_page(vec![input(&[("name", "x")])]);
    assert!(eval(&CssDataAttrEvaluator, &snap).is_none());
}

// ============================================================================
// Section context
// ============================================================================

#[test]
fn fieldset_legend_is_heading_context() {
    let snap = form_page(vec![
        element("fieldset", &[]).with_children(vec![
            element("legend", &[]).with_text("Voluntary Self-Identification"),
            element("select", &[("name", "q9")]),
        ]),
    ]);
    let signal = eval(&SectionContextEvaluator, &snap).unwrap();

    assert!(signal.matched);
    assert_eq!(signal.signal, SignalKind::HeadingContext);
    assert_eq!(signal.weight, 0.40);
    assert_eq!(signal.suggested_type, FieldType::EeoGender);
}

#[test]
fn section_heading_is_section_context() {
    let snap = form_page(vec![
        element("section", &[]).with_children(vec![
            element("h3", &[]).with_text("Education"),
            element("div", &[]).with_child(input(&[("name", "q1")])),
        ]),
    ]);
    let signal = eval(&SectionContextEvaluator, &snap).unwrap();

    assert_eq!(signal.signal, SignalKind::SectionContext);
    assert_eq!(signal.weight, 0.30);
    assert_eq!(signal.suggested_type, FieldType::Education);
    assert_eq!(signal.reason, "Section heading \"Education\" indicates education");
}

#[test]
fn unrelated_heading_is_unmatched() {
    let snap = form_page(vec![
        element("div", &[]).with_children(vec![
            element("h2", &[]).with_text("A few more questions"),
            input(&[("name", "q1")]),
        ]),
    ]);
    let signal = eval(&SectionContextEvaluator, &snap).unwrap();
    assert!(!signal.matched);
    assert_eq!(signal.raw_value, "A few more questions");
}

#[test]
fn no_heading_emits_nothing() {
    let snap = form_page(vec![input(&[("name", "q1")])]);
    assert!(eval(&SectionContextEvaluator, &snap).is_none());
}

// ============================================================================
// Runner: order and failure containment
// ============================================================================

#[test]
fn evaluate_all_runs_in_vote_order() {
    let snap = form_page(vec![
        label_for("email", "Email"),
        input(&[
            ("id", "email"),
            ("type", "email"),
            ("autocomplete", "email"),
            ("placeholder", "you@example.com"),
            ("aria-label", "Email"),
            ("class", "email-field"),
        ]),
    ]);
    let doc = Document::build(&snap).unwrap();
    let candidate = first_candidate(&doc);
    let cx = EvalContext {
        doc: &doc,
        candidate: &candidate,
    };

    let kinds: Vec<SignalKind> = evaluate_all(&default_evaluators(), &cx)
        .into_iter()
        .map(|s| s.signal)
        .collect();
    assert_eq!(
        kinds,
        vec![
            SignalKind::Autocomplete,
            SignalKind::NameIdRegex,
            SignalKind::InputType,
            SignalKind::Placeholder,
            SignalKind::AriaLabel,
            SignalKind::LabelFor,
            SignalKind::CssDataAttr,
        ]
    );
}

struct Failing;

impl SignalEvaluator for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::CssDataAttr
    }

    fn evaluate(&self, _cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        Err(EvalError::Failed {
            evaluator: "failing",
            message: "attribute unreadable".into(),
        })
    }
}

struct ClaimsUnknown;

impl SignalEvaluator for ClaimsUnknown {
    fn name(&self) -> &'static str {
        "claims-unknown"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Placeholder
    }

    fn evaluate(&self, _cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        Ok(Some(Signal::matched(
            SignalKind::Placeholder,
            "x",
            FieldType::Unknown,
            "bogus",
        )))
    }
}

#[test]
fn failing_evaluators_are_downgraded_to_unmatched() {
    let snap = form_page(vec![input(&[("name", "email")])]);
    let doc = Document::build(&snap).unwrap();
    let candidate = first_candidate(&doc);
    let cx = EvalContext {
        doc: &doc,
        candidate: &candidate,
    };

    let evaluators: Vec<Box<dyn SignalEvaluator>> = vec![
        Box::new(Failing),
        Box::new(NameIdEvaluator),
        Box::new(ClaimsUnknown),
    ];
    let signals = evaluate_all(&evaluators, &cx);

    assert_eq!(signals.len(), 3);
    assert!(!signals[0].matched);
    assert_eq!(signals[0].signal, SignalKind::CssDataAttr);
    assert!(signals[0].reason.contains("attribute unreadable"));
    assert!(signals[1].matched, "Other evaluators are unaffected");
    assert!(!signals[2].matched);
    assert_eq!(signals[2].suggested_type, FieldType::Unknown);
}
