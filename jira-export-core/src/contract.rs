//! # contract: where issue data comes from
//!
//! The export pipeline never talks HTTP itself. Everything it needs from the
//! tracker goes through [`IssueSource`]: the raw issue payload, the field id
//! to display name lookup, and attachment bytes.
//!
//! ## Implementing
//! - The binary crate provides the reqwest-backed Jira client.
//! - All methods are async and return a boxed error; implementors convert
//!   transport, status and decoding failures into it.
//!
//! ## Mocking & Testing
//! The trait is annotated for `mockall`, so tests build a `MockIssueSource`
//! with canned payloads and failures.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde_json::Value;

use crate::custom_fields::FieldNames;

/// Error type for [`IssueSource`] (simple boxed error).
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Raw issue JSON with all fields and the embedded `names` map.
    async fn fetch_issue(&self, key: &str) -> Result<Value, SourceError>;

    /// Map of field id (e.g. `customfield_10016`) to display name.
    async fn field_names(&self) -> Result<FieldNames, SourceError>;

    /// Bytes behind an attachment's content url.
    async fn fetch_attachment(&self, content_url: &str) -> Result<Vec<u8>, SourceError>;
}
