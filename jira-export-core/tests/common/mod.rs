#![allow(dead_code)]

use std::io::Cursor;

use serde_json::{json, Value};

pub fn paragraph_doc(text: &str) -> Value {
    json!({ "type": "doc", "version": 1, "content": [
        { "type": "paragraph", "content": [{ "type": "text", "text": text }] }
    ]})
}

pub fn attachment(id: u32, filename: &str, mime: &str, size: u64) -> Value {
    json!({
        "id": id.to_string(),
        "filename": filename,
        "mimeType": mime,
        "size": size,
        "content": format!("https://acme.atlassian.net/rest/api/3/attachment/content/{id}"),
        "author": { "displayName": "Ada Lovelace" },
        "created": "2024-01-16T08:00:00.000+0000"
    })
}

/// A representative REST v3 payload with every section populated.
pub fn sample_issue(key: &str) -> Value {
    json!({
        "id": "10001",
        "key": key,
        "self": "https://acme.atlassian.net/rest/api/3/issue/10001",
        "names": {
            "customfield_10016": "Story Points",
            "customfield_10020": "Sprint",
            "customfield_10014": "Epic Link",
            "customfield_10050": "Customer",
            "customfield_10051": "Environment"
        },
        "fields": {
            "summary": "Fix login bug",
            "description": { "type": "doc", "version": 1, "content": [
                { "type": "paragraph", "content": [{ "type": "text", "text": "Users cannot log in with SSO." }] },
                { "type": "bulletList", "content": [
                    { "type": "listItem", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "Open the login page" }] }] },
                    { "type": "listItem", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "Click SSO" }] }] }
                ]}
            ]},
            "issuetype": { "name": "Bug" },
            "status": { "name": "In Progress", "statusCategory": { "key": "indeterminate", "name": "In Progress" } },
            "priority": { "name": "High" },
            "assignee": { "displayName": "Grace Hopper" },
            "reporter": { "displayName": "Ada Lovelace" },
            "created": "2024-01-15T10:30:45.123+0000",
            "updated": "2024-01-16T12:00:00.000+0000",
            "resolutiondate": null,
            "fixVersions": [{ "name": "1.2.0" }],
            "components": [{ "name": "Auth" }, { "name": "Web" }],
            "labels": ["login", "sso"],
            "customfield_10016": 5,
            "customfield_10020": [{ "id": 7, "name": "Sprint 7", "state": "active" }],
            "customfield_10014": "PROJ-100",
            "customfield_10050": "Acme Corp",
            "customfield_10051": { "value": "Production" },
            "parent": { "key": "PROJ-100", "fields": { "summary": "Authentication epic" } },
            "subtasks": [
                { "key": "PROJ-2", "fields": { "summary": "Write regression test", "status": { "name": "Done" } } }
            ],
            "issuelinks": [
                { "type": { "name": "Blocks", "inward": "is blocked by", "outward": "blocks" },
                  "outwardIssue": { "key": "PROJ-3", "fields": { "summary": "Release 1.2" } } },
                { "type": { "name": "Relates", "inward": "relates to", "outward": "relates to" },
                  "inwardIssue": { "key": "OPS-9", "fields": { "summary": "SSO certificate rotation" } } }
            ],
            "attachment": [
                attachment(1, "screenshot.png", "image/png", 2048),
                attachment(2, "logs.txt", "text/plain", 3 * 1024 * 1024)
            ],
            "comment": { "comments": [
                { "author": { "displayName": "Grace Hopper" }, "body": paragraph_doc("Reproduced on staging."), "created": "2024-01-15T11:00:00.000+0000" },
                { "author": { "displayName": "Ada Lovelace" }, "body": "h2. Update\n*Fixed* in {{auth.rs}}", "created": "2024-01-16T09:30:00.000+0000" }
            ]}
        }
    })
}

/// Solid-colour PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([0, 82, 204]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
