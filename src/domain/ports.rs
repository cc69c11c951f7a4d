use crate::domain::model::{Courses, RawDocument, RenderedReport, ReportMode, StudentAccount};
use crate::utils::error::Result;
use async_trait::async_trait;
use indexmap::IndexMap;

/// Filesystem collaborator. Writes are one-shot and overwrite existing files.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Retrieves one student's gradebook document.
pub trait DocumentSource: Send + Sync {
    fn fetch(
        &self,
        account: &StudentAccount,
    ) -> impl std::future::Future<Output = Result<RawDocument>> + Send;
}

/// Student identifier to login, in the order students should be processed.
pub trait CredentialSource {
    fn accounts(&self) -> Result<IndexMap<String, StudentAccount>>;
}

/// Delivers a rendered report. Failures are reported by the caller, never retried.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, report: &RenderedReport) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, account: &StudentAccount) -> Result<RawDocument>;
    async fn transform(&self, student: &str, raw: RawDocument) -> Result<Courses>;
    fn render(&self, student: &str, courses: &Courses, mode: ReportMode) -> Result<RenderedReport>;
    async fn load(&self, report: &RenderedReport) -> Result<String>;
}
