use jira_export_core::adf::{flatten, flatten_value, Node, NodeKind};
use serde_json::json;

fn doc(content: serde_json::Value) -> serde_json::Value {
    json!({ "type": "doc", "version": 1, "content": content })
}

#[test]
fn paragraphs_headings_and_breaks() {
    let value = doc(json!([
        { "type": "heading", "attrs": { "level": 2 }, "content": [{ "type": "text", "text": "Steps" }] },
        { "type": "paragraph", "content": [
            { "type": "text", "text": "first" },
            { "type": "hardBreak" },
            { "type": "text", "text": "second" }
        ]}
    ]));
    assert_eq!(flatten_value(Some(&value)), "\n## Steps\nfirst\nsecond\n");
}

#[test]
fn lists_number_per_instance_and_trim_items() {
    let item = |text: &str| json!({ "type": "listItem", "content": [
        { "type": "paragraph", "content": [{ "type": "text", "text": text }] }
    ]});
    let value = doc(json!([
        { "type": "orderedList", "content": [item("one"), item("two")] },
        { "type": "bulletList", "content": [item("dot")] },
        { "type": "orderedList", "content": [item("again")] }
    ]));
    assert_eq!(flatten_value(Some(&value)), "1. one\n2. two\n• dot\n1. again\n");
}

#[test]
fn code_blocks_are_fenced() {
    let value = doc(json!([
        { "type": "codeBlock", "attrs": { "language": "rust" }, "content": [{ "type": "text", "text": "let x = 1;" }] }
    ]));
    assert_eq!(flatten_value(Some(&value)), "\n```\nlet x = 1;\n```\n");
}

#[test]
fn mentions_fall_back_to_user() {
    let value = doc(json!([{ "type": "paragraph", "content": [
        { "type": "mention", "attrs": { "id": "1", "text": "Ada" } },
        { "type": "text", "text": " and " },
        { "type": "mention", "attrs": { "id": "2" } }
    ]}]));
    assert_eq!(flatten_value(Some(&value)), "@Ada and @user\n");
}

#[test]
fn unknown_nodes_keep_their_children() {
    let value = doc(json!([
        { "type": "panel", "attrs": { "panelType": "info" }, "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "inside" }] }
        ]},
        { "type": "rule" }
    ]));
    assert_eq!(flatten_value(Some(&value)), "inside\n");
}

#[test]
fn strings_pass_through_and_absent_is_empty() {
    assert_eq!(flatten_value(Some(&json!("plain text"))), "plain text");
    assert_eq!(flatten_value(None), "");
    assert_eq!(flatten_value(Some(&serde_json::Value::Null)), "");
}

#[test]
fn cards_emoji_and_media() {
    let value = doc(json!([{ "type": "paragraph", "content": [
        { "type": "emoji", "attrs": { "shortName": ":tada:" } },
        { "type": "text", "text": " " },
        { "type": "inlineCard", "attrs": { "url": "https://example.com" } }
    ]}, { "type": "mediaSingle", "content": [{ "type": "media", "attrs": { "id": "x" } }] }]));
    assert_eq!(flatten_value(Some(&value)), ":tada: [https://example.com]\n[Media]");
}

#[test]
fn very_deep_trees_do_not_overflow_the_stack() {
    let mut node = Node::text("leaf");
    for _ in 0..200_000 {
        node = Node::new(NodeKind::Other("wrapper".into()), vec![node]);
    }
    assert_eq!(flatten(&node), "leaf");
}

#[test]
fn flattening_flat_text_again_is_the_identity() {
    let value = doc(json!([
        { "type": "heading", "attrs": { "level": 1 }, "content": [{ "type": "text", "text": "Title" }] },
        { "type": "paragraph", "content": [{ "type": "text", "text": "Body" }] }
    ]));
    let once = flatten_value(Some(&value));
    let twice = flatten_value(Some(&json!(once.clone())));
    assert_eq!(once, twice);
}

#[test]
fn ordered_markers_run_from_one_to_n() {
    let items: Vec<serde_json::Value> = (0..12)
        .map(|n| {
            json!({ "type": "listItem", "content": [{ "type": "text", "text": format!("item {n}") }] })
        })
        .collect();
    let value = doc(json!([{ "type": "orderedList", "content": items }]));
    let flat = flatten_value(Some(&value));
    let markers: Vec<String> = flat
        .lines()
        .map(|line| line.split_once(' ').unwrap().0.to_owned())
        .collect();
    let expected: Vec<String> = (1..=12).map(|n| format!("{n}.")).collect();
    assert_eq!(markers, expected);
}
