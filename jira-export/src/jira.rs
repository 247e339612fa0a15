//! # Jira integration (CLI <-> Core)
//!
//! The core pipeline only knows [`IssueSource`]. This module provides the
//! real implementation, [`JiraClient`], talking to Jira Cloud REST v3.
//!
//! ## Client Usage
//!
//! - Construct with [`JiraClient::new_from_env`] (`JIRA_EMAIL`, `JIRA_API_TOKEN`).
//! - [`JiraClient::myself`] verifies the credentials.
//! - Transport errors and non-success statuses become boxed errors carrying
//!   the url, status and response body.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use jira_export_core::contract::{IssueSource, SourceError};
use jira_export_core::custom_fields::FieldNames;
use reqwest::Client;
use serde_json::Value;

pub const EMAIL_ENV: &str = "JIRA_EMAIL";
pub const TOKEN_ENV: &str = "JIRA_API_TOKEN";

pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        email: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            email,
            token,
        })
    }

    pub fn new_from_env(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        match (env::var(EMAIL_ENV), env::var(TOKEN_ENV)) {
            (Ok(email), Ok(token)) => {
                tracing::info!(
                    base_url,
                    token_set = !token.is_empty(),
                    "Initialized JiraClient from environment"
                );
                Self::new(base_url, email, token, timeout)
            }
            (Err(e), _) => {
                tracing::error!(error = ?e, "{EMAIL_ENV} missing in environment");
                Err(format!("{EMAIL_ENV} must be set: {e}").into())
            }
            (_, Err(e)) => {
                tracing::error!(error = ?e, "{TOKEN_ENV} missing in environment");
                Err(format!("{TOKEN_ENV} must be set: {e}").into())
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn issue_url(&self, key: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{key}?fields=*all&expand=names",
            self.base_url
        )
    }

    pub fn fields_url(&self) -> String {
        format!("{}/rest/api/3/field", self.base_url)
    }

    pub fn myself_url(&self) -> String {
        format!("{}/rest/api/3/myself", self.base_url)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        tracing::debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.email, Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(%status, url, "Jira API returned error. Response body: {body}");
            let summary = summarize_error(&body);
            return Err(format!("Jira API error {status} for {url}: {summary}").into());
        }
        Ok(response)
    }

    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        Ok(self.get(url).await?.json::<Value>().await?)
    }

    /// The authenticated user, used to verify credentials.
    pub async fn myself(&self) -> Result<Value, SourceError> {
        self.get_json(&self.myself_url()).await
    }
}

/// Jira error bodies carry `errorMessages` and `errors`; fall back to the raw text.
fn summarize_error(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.chars().take(200).collect();
    };
    let mut messages: Vec<String> = value
        .get("errorMessages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    if let Some(errors) = value.get("errors").and_then(Value::as_object) {
        messages.extend(
            errors
                .iter()
                .filter_map(|(field, msg)| msg.as_str().map(|m| format!("{field}: {m}"))),
        );
    }
    if messages.is_empty() {
        body.chars().take(200).collect()
    } else {
        messages.join("; ")
    }
}

/// Map the `/rest/api/3/field` listing to id → name.
pub fn field_names_from(listing: &Value) -> FieldNames {
    listing
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|field| {
            let id = field.get("id")?.as_str()?;
            let name = field.get("name")?.as_str()?;
            Some((id.to_owned(), name.to_owned()))
        })
        .collect()
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn fetch_issue(&self, key: &str) -> Result<Value, SourceError> {
        tracing::info!(issue = key, "Fetching issue");
        self.get_json(&self.issue_url(key)).await
    }

    async fn field_names(&self) -> Result<FieldNames, SourceError> {
        let listing = self.get_json(&self.fields_url()).await?;
        let names = field_names_from(&listing);
        tracing::info!(fields = names.len(), "Fetched field names");
        Ok(names)
    }

    async fn fetch_attachment(&self, content_url: &str) -> Result<Vec<u8>, SourceError> {
        let bytes = self.get(content_url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> JiraClient {
        JiraClient::new(
            "https://acme.atlassian.net/",
            "me@acme.test".into(),
            "token".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn urls_are_built_from_a_trimmed_base() {
        let client = client();
        assert_eq!(
            client.issue_url("PROJ-1"),
            "https://acme.atlassian.net/rest/api/3/issue/PROJ-1?fields=*all&expand=names"
        );
        assert_eq!(client.fields_url(), "https://acme.atlassian.net/rest/api/3/field");
        assert_eq!(client.myself_url(), "https://acme.atlassian.net/rest/api/3/myself");
    }

    #[test]
    fn field_listing_maps_ids_to_names() {
        let listing = json!([
            { "id": "summary", "name": "Summary", "custom": false },
            { "id": "customfield_10016", "name": "Story Points", "custom": true },
            { "id": "broken" }
        ]);
        let names = field_names_from(&listing);
        assert_eq!(names.len(), 2);
        assert_eq!(names["customfield_10016"], "Story Points");
    }

    #[test]
    fn error_bodies_are_summarized() {
        let body = r#"{"errorMessages":["Issue does not exist."],"errors":{}}"#;
        assert_eq!(summarize_error(body), "Issue does not exist.");
        assert_eq!(summarize_error("<html>Bad gateway</html>"), "<html>Bad gateway</html>");
    }
}
