use rstest::rstest;
use serde_json::{Value, json};

use super::utils::Trickle;
use crate::{Error, ErrorSource, ParserOptions, Projector, Schema, SyntaxError, project, schema};

fn run(input: &str, schema: &Schema) -> Value {
    project(input.as_bytes(), schema).unwrap()
}

#[test]
fn absent_schema_takes_everything() {
    assert_eq!(run(r#"{"foo":"bar"}"#, &Schema::All), json!({"foo": "bar"}));
}

#[test]
fn nested_projection() {
    assert_eq!(
        run(r#"{"a":{"b":1,"c":2}}"#, &schema!({ "a": { "b" } })),
        json!({"a": {"b": 1}})
    );
}

#[test]
fn array_elements_share_the_schema() {
    assert_eq!(
        run(
            r#"[{"name":"x","extra":1},{"name":"y","extra":2}]"#,
            &schema!({ "name" })
        ),
        json!([{"name": "x"}, {"name": "y"}])
    );
}

#[test]
fn scalar_where_object_expected_passes_through() {
    assert_eq!(
        run(r#"{"foo": 42}"#, &schema!({ "foo": { "baz" } })),
        json!({"foo": 42})
    );
}

#[rstest]
#[case(Schema::All)]
#[case(Schema::fields())]
#[case(schema!({ "a": { "b" } }))]
fn empty_object_with_any_schema(#[case] schema: Schema) {
    assert_eq!(run("{}", &schema), json!({}));
}

#[test]
fn missing_key_yields_empty_object() {
    assert_eq!(run(r#"{"b": [1, 2]}"#, &schema!({ "a" })), json!({}));
}

#[test]
fn empty_fields_keep_structure_only() {
    assert_eq!(
        run(r#"[{"a": 1}, 2, [{"b": 3}]]"#, &Schema::fields()),
        json!([{}, 2, [{}]])
    );
}

#[test]
fn duplicate_keys_last_wins() {
    let value = run(r#"{"a": 1, "b": 2, "a": {"x": 3}}"#, &Schema::All);
    assert_eq!(value, json!({"a": {"x": 3}, "b": 2}));
}

#[test]
fn key_order_follows_source() {
    let value = run(r#"{"z": 1, "m": 2, "a": 3}"#, &Schema::All);
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["z", "m", "a"]);
}

#[rstest]
#[case::scalar(r#"1"#)]
#[case::string_with_brackets(r#""{[}]""#)]
#[case::empty_containers(r#"[{}, [], {"": []}]"#)]
#[case::deep_arrays(r#"[[[[[[[[1]]]]]]]]"#)]
#[case::deep_objects(r#"{"a":{"a":{"a":{"a":{"a":{"a":{}}}}}}}"#)]
#[case::mixed(r#"{"x": [1, {"y": [true, null, {"z": "]}"}]}], "w": {}}"#)]
fn skipped_subtrees_do_not_disturb_siblings(#[case] skipped: &str) {
    let input = format!(r#"{{"before": 1, "skip": {skipped}, "after": [2, {{"k": 3}}]}}"#);
    assert_eq!(
        run(&input, &schema!({ "before", "after" })),
        json!({"before": 1, "after": [2, {"k": 3}]})
    );
}

#[test_log::test]
fn skipping_under_small_chunks() {
    let input = r#"{"noise": {"a": ["é", {"b": [[], {}]}], "c": 1.5e3}, "signal": "ok"}"#;
    let options = ParserOptions::default().with_chunk_size(3);
    let value = Projector::with_options(Trickle::new(input.as_bytes(), 2), options)
        .project(&schema!({ "signal" }))
        .unwrap();
    assert_eq!(value, json!({"signal": "ok"}));
}

#[test]
fn readme_webhook() {
    let input = r#"{
        "action": "opened",
        "issue": {
            "url": "https://api.github.com/repos/octocat/Hello-World/issues/1347",
            "number": 1347,
            "labels": [{"name": "bug", "color": "f29513"}],
            "user": {"login": "octocat", "id": 1, "site_admin": false}
        },
        "repository": {"id": 1296269, "full_name": "octocat/Hello-World"},
        "sender": {"login": "octocat", "id": 1}
    }"#;
    let schema: Schema = r#"{"action": null, "issue": {"number": null, "labels": {"name": null}, "user": {"login": null}}}"#
        .parse()
        .unwrap();
    assert_eq!(
        run(input, &schema),
        json!({
            "action": "opened",
            "issue": {
                "number": 1347,
                "labels": [{"name": "bug"}],
                "user": {"login": "octocat"}
            }
        })
    );
}

#[test]
fn project_fn_rejects_trailing_data() {
    let err = project(&b"{} []"[..], &Schema::All).unwrap_err();
    assert!(matches!(
        err,
        Error::Parser(ref e) if e.kind() == &ErrorSource::Syntax(SyntaxError::TrailingData('['))
    ));
}

#[test]
fn projector_stops_at_end_document() {
    let mut projector = Projector::from_reader(&b"{\"a\": 1} trailing"[..]);
    assert_eq!(projector.project(&Schema::All).unwrap(), json!({"a": 1}));
    assert!(projector.get_mut().get_ref().is_empty());
    assert!(projector.into_inner().finish().is_err());
}

#[test]
fn parse_errors_surface_from_projection() {
    let err = project(&br#"{"skip": [1, 2 3], "a": 1}"#[..], &schema!({ "a" })).unwrap_err();
    let err = err.as_parser_error().unwrap();
    assert_eq!(err.kind(), &ErrorSource::Syntax(SyntaxError::ExpectedValueSeparator('3')));
    assert_eq!(err.offset, 15);
}

#[test]
fn truncated_input_fails() {
    let err = project(&br#"{"a": {"b": 1}"#[..], &Schema::All).unwrap_err();
    assert_eq!(
        err.as_parser_error().unwrap().kind(),
        &ErrorSource::UnexpectedEndOfInput
    );
}

fn nested_arrays(depth: usize) -> String {
    "[".repeat(depth) + &"]".repeat(depth)
}

#[test]
fn nesting_beyond_limit_is_an_error() {
    let err = project(nested_arrays(100_000).as_bytes(), &Schema::All).unwrap_err();
    let err = err.as_parser_error().unwrap();
    assert_eq!(
        err.kind(),
        &ErrorSource::DepthLimitExceeded(crate::DEFAULT_MAX_DEPTH)
    );
    assert_eq!(err.offset, crate::DEFAULT_MAX_DEPTH);

    let err = project(nested_arrays(100_000).as_bytes(), &schema!({})).unwrap_err();
    assert!(matches!(
        err.as_parser_error().map(crate::ParserError::kind),
        Some(ErrorSource::DepthLimitExceeded(_))
    ));
}

#[test]
fn nesting_within_limit_projects() {
    let input = nested_arrays(crate::DEFAULT_MAX_DEPTH);
    let value = project(input.as_bytes(), &Schema::All).unwrap();
    assert_eq!(serde_json::to_string(&value).unwrap(), input);

    let options = ParserOptions::default().with_max_depth(2_000);
    let input = format!(r#"{{"deep": {}, "a": 1}}"#, nested_arrays(1_999));
    let mut projector = Projector::with_options(input.as_bytes(), options);
    assert_eq!(projector.project(&schema!({ "a" })).unwrap(), json!({"a": 1}));
}
