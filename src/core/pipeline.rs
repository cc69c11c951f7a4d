use crate::core::normalizer;
use crate::core::renderer::{report_file_name, ReportRenderer};
use crate::core::{Courses, DocumentSource, Pipeline, RawDocument, RenderedReport, Storage};
use crate::domain::model::{ReportMode, StudentAccount};
use crate::utils::error::Result;

pub struct GradebookPipeline<D: DocumentSource, S: Storage> {
    source: D,
    storage: S,
    renderer: ReportRenderer,
    output_path: String,
}

impl<D: DocumentSource, S: Storage> GradebookPipeline<D, S> {
    pub fn new(source: D, storage: S, renderer: ReportRenderer, output_path: String) -> Self {
        Self {
            source,
            storage,
            renderer,
            output_path,
        }
    }
}

#[async_trait::async_trait]
impl<D: DocumentSource, S: Storage> Pipeline for GradebookPipeline<D, S> {
    async fn extract(&self, account: &StudentAccount) -> Result<RawDocument> {
        tracing::debug!(
            "Fetching gradebook for {} at {}",
            account.username,
            account.domain
        );
        self.source.fetch(account).await
    }

    async fn transform(&self, student: &str, raw: RawDocument) -> Result<Courses> {
        if let Some(period) = normalizer::current_reporting_period(&raw) {
            tracing::info!(
                "{}: current reporting period {} ({} - {})",
                student,
                period.grade_period,
                period.start_date,
                period.end_date
            );
        }

        let courses = normalizer::normalize(&raw)?;
        let assignment_count: usize = courses
            .values()
            .flat_map(|course| course.markings.values())
            .map(|marking| marking.assignments.len())
            .sum();
        tracing::debug!(
            "{}: normalized {} courses with {} assignments",
            student,
            courses.len(),
            assignment_count
        );

        Ok(courses)
    }

    fn render(&self, student: &str, courses: &Courses, mode: ReportMode) -> Result<RenderedReport> {
        let today = chrono::Local::now().date_naive();
        let anchor = match mode {
            ReportMode::Full => None,
            ReportMode::Windowed { lookback_days } => {
                Some(crate::core::date_filter::anchor_date(today, lookback_days)?)
            }
        };
        let text = self.renderer.render_as_of(student, courses, mode, today)?;
        tracing::debug!(
            "{}: rendered {} report ({} lines)",
            student,
            mode.label(),
            text.lines().count()
        );

        Ok(RenderedReport {
            student: student.to_string(),
            mode,
            anchor,
            text,
        })
    }

    async fn load(&self, report: &RenderedReport) -> Result<String> {
        let file_name = report_file_name(&report.student, report.mode);
        let output_path = format!("{}/{}", self.output_path, file_name);

        tracing::debug!(
            "Writing {} bytes to {}",
            report.text.len(),
            output_path
        );
        self.storage
            .write_file(&file_name, report.text.as_bytes())
            .await?;

        Ok(output_path)
    }
}
