#![doc = "jira-export-core: core logic library for jira-export."]

//! Turns raw Jira issue JSON into self-contained export documents.
//!
//! The pipeline is: raw payload → [`issue::canonicalize`] (using
//! [`adf`] and [`custom_fields`]) → [`issue::IssueDocument`] →
//! [`render::render`] (PDF through [`layout`] and [`pdf`], or [`docx`], or
//! [`markdown`]) → [`render::RenderOutput`]. [`export::Exporter`] runs it for
//! many keys against an [`contract::IssueSource`].
//!
//! # Usage
//! The `jira-export` binary provides the HTTP source and the CLI; tests use
//! the mock source generated behind the `test-export-mocks` feature.

pub mod adf;
pub mod contract;
pub mod custom_fields;
pub mod docx;
pub mod export;
pub mod format;
pub mod images;
pub mod issue;
pub mod layout;
pub mod markdown;
pub mod markup;
pub mod pdf;
pub mod render;
pub mod sections;
pub mod style;

pub use export::{BulkResult, ExportConfig, ExportError, ExportFailure, Exporter};
pub use issue::{canonicalize, IssueDocument};
pub use render::{render, ExportFormat, RenderOptions, RenderOutput};
pub use style::Style;
