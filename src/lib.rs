pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::{
    credentials::JsonCredentialStore,
    email::WebhookMailer,
    portal::{FileDocumentSource, HttpDocumentSource},
    storage::LocalStorage,
};
pub use crate::config::ReportConfig;
pub use crate::core::{engine::ReportEngine, pipeline::GradebookPipeline, renderer::ReportRenderer};
pub use crate::utils::error::{ReportError, Result};
