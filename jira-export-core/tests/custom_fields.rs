use jira_export_core::custom_fields::{normalize, FieldNames};
use serde_json::{json, Map, Value};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture must be an object"),
    }
}

fn names(pairs: &[(&str, &str)]) -> FieldNames {
    pairs
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

#[test]
fn coerces_each_value_shape() {
    let raw = fields(json!({
        "summary": "not custom",
        "customfield_1": "Customer A",
        "customfield_2": 42,
        "customfield_3": 2.5,
        "customfield_4": [{ "value": "iOS" }, { "name": "Android" }, "Web", null],
        "customfield_5": { "type": "doc", "version": 1, "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "Rich" }] }
        ]},
        "customfield_6": { "displayName": "Grace Hopper", "accountId": "abc" },
        "customfield_7": true,
        "customfield_8": null,
        "customfield_9": [],
        "customfield_10": "",
        "customfield_11": { "id": "1" }
    }));
    let out = normalize(&raw, None);
    let pairs: Vec<(&str, &str)> = out.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        pairs,
        vec![
            ("customfield_1", "Customer A"),
            ("customfield_2", "42"),
            ("customfield_3", "2.5"),
            ("customfield_4", "iOS, Android, Web"),
            ("customfield_5", "Rich"),
            ("customfield_6", "Grace Hopper"),
        ]
    );
}

#[test]
fn resolves_names_and_skips_dedicated_fields() {
    let raw = fields(json!({
        "customfield_10020": [{ "name": "Sprint 7" }],
        "customfield_10016": 5,
        "customfield_10014": "PROJ-1",
        "customfield_10019": "0|i0000f:",
        "customfield_10021": [{ "value": "Impediment" }],
        "customfield_10001": { "name": "Platform" },
        "customfield_10050": "Acme Corp",
        "customfield_10051": "High"
    }));
    let lookup = names(&[
        ("customfield_10020", "Sprint"),
        ("customfield_10016", "Story Points"),
        ("customfield_10014", "Epic Link"),
        ("customfield_10019", "Rank"),
        ("customfield_10021", "Flagged"),
        ("customfield_10001", "Team"),
        ("customfield_10050", "Customer"),
    ]);
    let out = normalize(&raw, Some(&lookup));
    assert_eq!(out.len(), 2);
    assert_eq!(out.get("Customer").map(String::as_str), Some("Acme Corp"));
    // No lookup entry: the raw id is the name.
    assert_eq!(out.get("customfield_10051").map(String::as_str), Some("High"));
}

#[test]
fn later_field_with_same_name_wins_but_keeps_first_position() {
    let raw = fields(json!({
        "customfield_1": "first",
        "customfield_2": "middle",
        "customfield_3": "last"
    }));
    let lookup = names(&[
        ("customfield_1", "Environment"),
        ("customfield_2", "Browser"),
        ("customfield_3", "Environment"),
    ]);
    let out = normalize(&raw, Some(&lookup));
    let pairs: Vec<(&str, &str)> = out.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, vec![("Environment", "last"), ("Browser", "middle")]);
}

#[test]
fn story_points_are_excluded_but_root_cause_is_verbatim() {
    let raw = fields(json!({
        "customfield_10016": 5,
        "customfield_10060": "race condition"
    }));
    let lookup = names(&[
        ("customfield_10016", "Story Points"),
        ("customfield_10060", "Root Cause"),
    ]);
    let out = normalize(&raw, Some(&lookup));
    assert!(!out.contains_key("Story Points"));
    assert_eq!(out.get("Root Cause").map(String::as_str), Some("race condition"));
}
