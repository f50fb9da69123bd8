use std::fs;

use json_view::*;
use tempfile::tempdir;

#[test]
fn loads_a_document_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, r#"{"name": "demo", "items": [1, 2]}"#).unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.name, path.display().to_string());
    assert_eq!(doc.byte_size, 33);
    assert!(matches!(doc.value, JsonValue::Object(_)));
    assert_eq!(doc.value.len(), 2);
}

#[test]
fn missing_files_report_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.json");
    let err = Document::load(&path).unwrap_err();
    match err {
        ViewError::Open { path: p, .. } => assert!(p.contains("nope.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Document::parse("bad.json", "{broken").unwrap_err();
    assert!(matches!(err, ViewError::Parse(_)));
}

#[test]
fn object_keys_keep_their_source_order() {
    let doc = Document::parse("order.json", r#"{"zebra": 1, "apple": 2, "mango": 3}"#).unwrap();
    let JsonValue::Object(entries) = &doc.value else {
        panic!("expected an object");
    };
    let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["zebra", "apple", "mango"]);
}

#[test]
fn non_standard_number_literals_round_trip() {
    let doc = Document::parse("nan.json", r#"{"a": NaN, "b": Infinity, "c": -Infinity}"#).unwrap();
    let JsonValue::Object(entries) = &doc.value else {
        panic!("expected an object");
    };
    assert_eq!(
        entries[0].1,
        JsonValue::Number(JsonNumber::NonFinite(NonFinite::NaN))
    );
    assert_eq!(
        entries[1].1,
        JsonValue::Number(JsonNumber::NonFinite(NonFinite::PosInf))
    );
    assert_eq!(
        entries[2].1,
        JsonValue::Number(JsonNumber::NonFinite(NonFinite::NegInf))
    );

    // The pretty printer re-emits the literals instead of failing.
    let pretty = doc.value.to_pretty_string();
    assert!(pretty.contains("\"a\": NaN"));
    assert!(pretty.contains("\"b\": Infinity"));
    assert!(pretty.contains("\"c\": -Infinity"));
}

#[test]
fn literals_inside_strings_are_left_alone() {
    let doc = Document::parse(
        "strings.json",
        r#"{"s": "NaN is not Infinity", "t": "-Infinity"}"#,
    )
    .unwrap();
    let JsonValue::Object(entries) = &doc.value else {
        panic!("expected an object");
    };
    assert_eq!(entries[0].1, JsonValue::String("NaN is not Infinity".into()));
    assert_eq!(entries[1].1, JsonValue::String("-Infinity".into()));
}

#[test]
fn non_finite_literals_nest_inside_arrays() {
    let doc = Document::parse("arr.json", "[1, NaN, [Infinity], 2.5]").unwrap();
    let JsonValue::Array(items) = &doc.value else {
        panic!("expected an array");
    };
    assert_eq!(items.len(), 4);
    assert_eq!(
        items[1],
        JsonValue::Number(JsonNumber::NonFinite(NonFinite::NaN))
    );
    assert!(NonFinite::NaN.as_f64().is_nan());
    assert_eq!(NonFinite::PosInf.literal(), "Infinity");
}

#[test]
fn pretty_printing_uses_two_space_indentation() {
    let doc = Document::parse("fmt.json", r#"{"a": {"b": [1, "x"]}, "c": null}"#).unwrap();
    let expected = "{\n  \"a\": {\n    \"b\": [\n      1,\n      \"x\"\n    ]\n  },\n  \"c\": null\n}";
    assert_eq!(doc.value.to_pretty_string(), expected);
}

#[test]
fn empty_containers_print_compactly() {
    let doc = Document::parse("empty.json", r#"{"a": [], "b": {}}"#).unwrap();
    assert_eq!(doc.value.to_pretty_string(), "{\n  \"a\": [],\n  \"b\": {}\n}");
}
