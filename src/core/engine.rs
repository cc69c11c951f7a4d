use crate::core::{Mailer, Pipeline};
use crate::domain::model::{ReportMode, RunSummary, StudentAccount, StudentFailure};
use crate::utils::error::Result;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::Instrument;

/// Runs the fetch, normalize, render and persist steps once per student,
/// strictly in credential-file order. A failure only ends the student (or the
/// single report) it belongs to.
pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    modes: Vec<ReportMode>,
    mailer: Option<Arc<dyn Mailer>>,
    dry_run: bool,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P, modes: Vec<ReportMode>) -> Self {
        Self {
            pipeline,
            modes,
            mailer: None,
            dry_run: false,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Render everything but skip writes and email; reports land in `RunSummary::previews`.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, accounts: &IndexMap<String, StudentAccount>) -> RunSummary {
        tracing::info!(
            "Generating {} report(s) for {} student(s)",
            self.modes.len(),
            accounts.len()
        );

        let mut summary = RunSummary::default();
        for (student, account) in accounts {
            let span = tracing::info_span!("student", name = %student);
            let outcome = self
                .run_student(student, account, &mut summary)
                .instrument(span)
                .await;

            if let Err(e) = outcome {
                tracing::error!(
                    "Skipping {}: {} (Category: {:?})",
                    student,
                    e,
                    e.category()
                );
                summary.failures.push(StudentFailure {
                    student: student.clone(),
                    mode: None,
                    message: e.to_string(),
                });
            }
        }

        tracing::info!(
            "Finished: {} written, {} failure(s)",
            summary.written.len(),
            summary.failures.len()
        );
        summary
    }

    async fn run_student(
        &self,
        student: &str,
        account: &StudentAccount,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let raw = self.pipeline.extract(account).await?;
        let courses = self.pipeline.transform(student, raw).await?;

        for mode in &self.modes {
            let report = match self.pipeline.render(student, &courses, *mode) {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("{} report for {} aborted: {}", mode.label(), student, e);
                    summary.failures.push(StudentFailure {
                        student: student.to_string(),
                        mode: Some(*mode),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if self.dry_run {
                summary.previews.push(report);
                continue;
            }

            let output_path = match self.pipeline.load(&report).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::error!("Writing {} report for {} failed: {}", mode.label(), student, e);
                    summary.failures.push(StudentFailure {
                        student: student.to_string(),
                        mode: Some(*mode),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            match report.anchor {
                Some(anchor) => tracing::info!(
                    "Wrote {} report (due after {}) to {}",
                    mode.label(),
                    anchor,
                    output_path
                ),
                None => tracing::info!("Wrote {} report to {}", mode.label(), output_path),
            }
            summary.written.push(output_path);

            if let Some(mailer) = &self.mailer {
                match mailer.send(&report).await {
                    Ok(()) => summary.emailed.push(student.to_string()),
                    Err(e) => {
                        tracing::warn!("Email for {} failed: {}", student, e);
                        tracing::warn!("Suggestion: {}", e.recovery_suggestion());
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Courses, RawDocument, RenderedReport};
    use crate::core::renderer::ReportRenderer;
    use crate::utils::error::ReportError;
    use serde_json::json;
    use tokio::sync::Mutex;

    /// Pipeline double that serves canned documents per username.
    struct FakePipeline {
        documents: IndexMap<String, serde_json::Value>,
        renderer: ReportRenderer,
        loaded: Mutex<Vec<String>>,
        unwritable: Option<ReportMode>,
    }

    #[async_trait::async_trait]
    impl Pipeline for FakePipeline {
        async fn extract(&self, account: &StudentAccount) -> Result<RawDocument> {
            self.documents
                .get(&account.username)
                .cloned()
                .map(RawDocument::new)
                .ok_or_else(|| ReportError::PortalError {
                    status: 401,
                    message: "unknown user".to_string(),
                })
        }

        async fn transform(&self, _student: &str, raw: RawDocument) -> Result<Courses> {
            crate::core::normalizer::normalize(&raw)
        }

        fn render(&self, student: &str, courses: &Courses, mode: ReportMode) -> Result<RenderedReport> {
            let text = self.renderer.render(student, courses, mode)?;
            Ok(RenderedReport {
                student: student.to_string(),
                mode,
                anchor: None,
                text,
            })
        }

        async fn load(&self, report: &RenderedReport) -> Result<String> {
            if self.unwritable == Some(report.mode) {
                return Err(ReportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only output directory",
                )));
            }
            let path = crate::core::renderer::report_file_name(&report.student, report.mode);
            self.loaded.lock().await.push(path.clone());
            Ok(path)
        }
    }

    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, report: &RenderedReport) -> Result<()> {
            if self.fail {
                return Err(ReportError::EmailError {
                    message: "relay down".to_string(),
                });
            }
            self.sent.lock().await.push(report.student.clone());
            Ok(())
        }
    }

    fn account(username: &str) -> StudentAccount {
        StudentAccount {
            username: username.to_string(),
            password: "pw".to_string(),
            domain: "portal.example.org".to_string(),
        }
    }

    fn document(due_date: &str) -> serde_json::Value {
        json!({"Gradebook": {"Courses": {"Course": {
            "@Title": "Spanish",
            "Marks": {"Mark": {
                "@MarkName": "S2",
                "@CalculatedScoreString": "A",
                "@CalculatedScoreRaw": "95",
                "Assignments": {"Assignment": {
                    "@Measure": "Vocab quiz",
                    "@DueDate": due_date,
                    "@Score": "19 out of 20",
                    "@ScoreType": "Raw Score",
                    "@Points": "19 / 20"
                }}
            }}
        }}}})
    }

    fn fake(documents: Vec<(&str, serde_json::Value)>) -> FakePipeline {
        FakePipeline {
            documents: documents
                .into_iter()
                .map(|(user, doc)| (user.to_string(), doc))
                .collect(),
            renderer: ReportRenderer::default(),
            loaded: Mutex::new(Vec::new()),
            unwritable: None,
        }
    }

    #[tokio::test]
    async fn test_failed_student_does_not_affect_others() {
        let pipeline = fake(vec![
            ("alex", document("01/02/2024")),
            ("casey", document("01/03/2024")),
        ]);
        let engine = ReportEngine::new(pipeline, vec![ReportMode::Full]);

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));
        accounts.insert("Blair".to_string(), account("blair"));
        accounts.insert("Casey".to_string(), account("casey"));

        let summary = engine.run(&accounts).await;

        assert_eq!(summary.written, vec!["Alex.report.txt", "Casey.report.txt"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].student, "Blair");
        assert_eq!(summary.failures[0].mode, None);
    }

    #[tokio::test]
    async fn test_bad_due_date_only_aborts_windowed_report() {
        let pipeline = fake(vec![("alex", document("2024-01-02"))]);
        let engine = ReportEngine::new(
            pipeline,
            vec![ReportMode::Full, ReportMode::Windowed { lookback_days: 14 }],
        );

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));

        let summary = engine.run(&accounts).await;

        assert_eq!(summary.written, vec!["Alex.report.txt"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(
            summary.failures[0].mode,
            Some(ReportMode::Windowed { lookback_days: 14 })
        );
    }

    #[tokio::test]
    async fn test_failed_write_only_aborts_its_own_report() {
        let mut pipeline = fake(vec![("alex", document("01/02/2024"))]);
        pipeline.unwritable = Some(ReportMode::Full);
        let engine = ReportEngine::new(
            pipeline,
            vec![ReportMode::Full, ReportMode::Windowed { lookback_days: 100_000 }],
        );

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));

        let summary = engine.run(&accounts).await;

        assert_eq!(summary.written, vec!["Alex.partial.report.txt"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].mode, Some(ReportMode::Full));
    }

    #[tokio::test]
    async fn test_dry_run_skips_load() {
        let pipeline = fake(vec![("alex", document("01/02/2024"))]);
        let engine = ReportEngine::new(pipeline, vec![ReportMode::Full]).with_dry_run(true);

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));

        let summary = engine.run(&accounts).await;

        assert!(summary.written.is_empty());
        assert_eq!(summary.previews.len(), 1);
        assert!(summary.previews[0].text.starts_with("Alex___"));
        assert!(engine.pipeline.loaded.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_email_failure_is_not_fatal() {
        let pipeline = fake(vec![("alex", document("01/02/2024"))]);
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let engine = ReportEngine::new(pipeline, vec![ReportMode::Full]).with_mailer(mailer);

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));

        let summary = engine.run(&accounts).await;

        assert_eq!(summary.written.len(), 1);
        assert!(summary.emailed.is_empty());
        assert!(summary.is_clean());
    }

    #[tokio::test]
    async fn test_email_sent_per_written_report() {
        let pipeline = fake(vec![("alex", document("01/02/2024"))]);
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let engine =
            ReportEngine::new(pipeline, vec![ReportMode::Full]).with_mailer(mailer.clone());

        let mut accounts = IndexMap::new();
        accounts.insert("Alex".to_string(), account("alex"));

        let summary = engine.run(&accounts).await;

        assert_eq!(summary.emailed, vec!["Alex"]);
        assert_eq!(*mailer.sent.lock().await, vec!["Alex".to_string()]);
    }
}
