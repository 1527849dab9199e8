use quiz_forge::json_utils::{extract_first, find_json_structures, NodeType};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    x: i32,
}

#[test]
fn extract_first_skips_non_matching_objects() {
    let s = r#"prefix {"y":99} middle {"x":10} tail {"x":20} end"#;
    let v: Option<Item> = extract_first(s);
    assert_eq!(v, Some(Item { x: 10 }));
}

#[test]
fn extract_first_descends_into_wrappers() {
    let s = r#"{"result": {"x": 7}, "note": "wrapped"}"#;
    let v: Option<Item> = extract_first(s);
    assert_eq!(v, Some(Item { x: 7 }));
}

#[test]
fn extract_first_reads_markdown_fences() {
    let s = "Sure! Here is the question:\n```json\n{\"x\": 3}\n```\nGood luck.";
    let v: Option<Item> = extract_first(s);
    assert_eq!(v, Some(Item { x: 3 }));
}

#[test]
fn extract_first_none_without_json() {
    let v: Option<Item> = extract_first("I cannot help with that.");
    assert!(v.is_none());
}

#[test]
fn structures_report_nesting() {
    let s = r#"[{"x":1},{"x":2}] {"x":3}"#;
    let roots = find_json_structures(s);
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].kind, NodeType::Array);
    assert_eq!(roots[0].children.len(), 2);
    assert_eq!(roots[1].kind, NodeType::Object);
}

#[test]
fn unbalanced_text_yields_no_structures() {
    assert!(find_json_structures(r#"{"x": 1"#).is_empty());
    assert!(find_json_structures("] }").is_empty());
}

#[test]
fn extract_first_finds_objects_inside_arrays() {
    let s = r#"[{"x":1},{"x":2}]"#;
    let v: Option<Item> = extract_first(s);
    assert_eq!(v, Some(Item { x: 1 }));
}

#[test]
fn stray_quote_in_prose_does_not_hide_json() {
    let s = r#"Measure it with a 5" ruler. {"x": 4}"#;
    let v: Option<Item> = extract_first(s);
    assert_eq!(v, Some(Item { x: 4 }));
}
