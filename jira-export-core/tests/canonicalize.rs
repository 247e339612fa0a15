mod common;

use jira_export_core::custom_fields::FieldNames;
use jira_export_core::issue::{canonicalize, CanonicalizeError, StatusTone};
use serde_json::json;

#[test]
fn maps_every_section_of_a_full_payload() {
    let doc = canonicalize(&common::sample_issue("PROJ-1"), None).unwrap();

    assert_eq!(doc.key, "PROJ-1");
    assert_eq!(doc.summary, "Fix login bug");
    assert_eq!(
        doc.description,
        "Users cannot log in with SSO.\n• Open the login page\n• Click SSO"
    );
    assert_eq!(doc.issue_type, "Bug");
    assert_eq!(doc.status.name, "In Progress");
    assert_eq!(doc.status.tone(), StatusTone::InProgress);
    assert_eq!(doc.priority, "High");
    assert_eq!(doc.assignee.as_deref(), Some("Grace Hopper"));
    assert_eq!(doc.reporter.as_deref(), Some("Ada Lovelace"));
    assert_eq!(doc.created.as_deref(), Some("2024-01-15T10:30:45.123+0000"));
    assert_eq!(doc.resolved, None);
    assert_eq!(doc.fix_versions, vec!["1.2.0"]);
    assert_eq!(doc.components, vec!["Auth", "Web"]);
    assert_eq!(doc.labels, vec!["login", "sso"]);

    assert_eq!(doc.story_points, Some(5.0));
    assert_eq!(doc.sprints, vec!["Sprint 7"]);
    assert_eq!(doc.epic.as_deref(), Some("PROJ-100"));
    let parent = doc.parent.as_ref().unwrap();
    assert_eq!((parent.key.as_str(), parent.summary.as_str()), ("PROJ-100", "Authentication epic"));

    assert_eq!(doc.subtasks.len(), 1);
    assert_eq!(doc.subtasks[0].status, "Done");
    let links: Vec<(&str, &str)> = doc
        .links
        .iter()
        .map(|l| (l.relation.as_str(), l.key.as_str()))
        .collect();
    assert_eq!(links, vec![("blocks", "PROJ-3"), ("relates to", "OPS-9")]);

    assert_eq!(doc.attachments.len(), 2);
    assert_eq!(doc.image_attachments().count(), 1);

    assert_eq!(doc.comments.len(), 2);
    assert_eq!(doc.comments[0].body, "Reproduced on staging.");
    assert_eq!(doc.comments[1].body, "Update\nFixed in auth.rs");

    let custom: Vec<(&str, &str)> = doc
        .custom_fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(custom, vec![("Customer", "Acme Corp"), ("Environment", "Production")]);
}

#[test]
fn explicit_lookup_takes_precedence_over_embedded_names() {
    let lookup: FieldNames = [("customfield_10050".to_string(), "Client".to_string())]
        .into_iter()
        .collect();
    let doc = canonicalize(&common::sample_issue("PROJ-1"), Some(&lookup)).unwrap();
    assert_eq!(doc.custom_fields.get("Client").map(String::as_str), Some("Acme Corp"));
    // The explicit lookup replaces the embedded one entirely.
    assert!(doc.custom_fields.contains_key("customfield_10051"));
}

#[test]
fn planning_heuristic_takes_the_first_match_even_on_content() {
    let raw = json!({
        "key": "PROJ-5",
        "fields": {
            "summary": "Heuristic",
            "customfield_1": "Remember to add story points later",
            "customfield_2": 8
        },
        "names": { "customfield_1": "Notes", "customfield_2": "Story Points" }
    });
    let doc = canonicalize(&raw, None).unwrap();
    // "Notes" mentions the term and comes first, and its text is not a number.
    assert_eq!(doc.story_points, None);
}

#[test]
fn story_points_unwrap_objects_and_parse_strings() {
    let raw = json!({
        "key": "PROJ-6",
        "fields": {
            "customfield_2": { "value": "3.5" },
            "customfield_3": { "name": "Parent Epic Alpha" }
        },
        "names": { "customfield_2": "Story point estimate", "customfield_3": "Epic Name" }
    });
    let doc = canonicalize(&raw, None).unwrap();
    assert_eq!(doc.story_points, Some(3.5));
    assert_eq!(doc.epic.as_deref(), Some("Parent Epic Alpha"));
}

#[test]
fn legacy_sprint_strings_yield_their_name() {
    let raw = json!({
        "key": "PROJ-7",
        "fields": {
            "customfield_10020": [
                "com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=1,rapidViewId=2,state=CLOSED,name=Sprint 4,startDate=2024-01-01]"
            ]
        },
        "names": { "customfield_10020": "Sprint" }
    });
    let doc = canonicalize(&raw, None).unwrap();
    assert_eq!(doc.sprints, vec!["Sprint 4"]);
}

#[test]
fn missing_optional_fields_get_defaults() {
    let doc = canonicalize(&json!({ "key": "PROJ-8", "fields": {} }), None).unwrap();
    assert_eq!(doc.summary, "");
    assert_eq!(doc.issue_type, "Unknown");
    assert_eq!(doc.status.name, "Unknown");
    assert_eq!(doc.status.tone(), StatusTone::Neutral);
    assert_eq!(doc.priority, "None");
    assert!(doc.assignee.is_none());
    assert!(doc.custom_fields.is_empty());
    assert!(doc.comments.is_empty());
}

#[test]
fn structural_errors_are_reported() {
    assert_eq!(canonicalize(&json!([]), None), Err(CanonicalizeError::NotAnObject));
    assert_eq!(canonicalize(&json!({ "fields": {} }), None), Err(CanonicalizeError::MissingKey));
    assert_eq!(
        canonicalize(&json!({ "key": "PROJ-9" }), None),
        Err(CanonicalizeError::MissingFields("PROJ-9".into()))
    );
}

#[test]
fn status_tones_follow_name_and_category() {
    use jira_export_core::issue::Status;
    assert_eq!(Status::new("Closed", None).tone(), StatusTone::Resolved);
    assert_eq!(Status::new("Shipped", Some("Done")).tone(), StatusTone::Resolved);
    assert_eq!(Status::new("In Progress", None).tone(), StatusTone::InProgress);
    assert_eq!(Status::new("Review", Some("indeterminate")).tone(), StatusTone::InProgress);
    assert_eq!(Status::new("To Do", Some("new")).tone(), StatusTone::Neutral);
}
