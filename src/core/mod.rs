pub mod date_filter;
pub mod engine;
pub mod normalizer;
pub mod pipeline;
pub mod renderer;
pub mod score;

pub use crate::domain::model::{Courses, RawDocument, RenderedReport};
pub use crate::domain::ports::{CredentialSource, DocumentSource, Mailer, Pipeline, Storage};
pub use crate::utils::error::Result;
