//! Fixed-width text rendering of a normalized gradebook.
//!
//! Full and windowed reports share every line of layout code; the windowed
//! mode only drops assignments due on or before the anchor date.

use crate::core::{date_filter, score};
use crate::domain::model::{Assignment, Course, Courses, Marking, ReportMode};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const BANNER_FILL: char = '_';
const SUMMARY_FILL: char = '>';
const ELLIPSIS: &str = "...";
const COURSE_MARKER: &str = "<*> ";

/// Column widths, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub report_width: usize,
    pub separator_width: usize,
    pub due_date_width: usize,
    pub score_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            report_width: 120,
            separator_width: 2,
            due_date_width: 10,
            score_width: 20,
        }
    }
}

impl LayoutConfig {
    /// Whatever is left of the report width once the other columns are placed.
    pub fn name_width(&self) -> usize {
        self.report_width
            .saturating_sub(2 * self.separator_width + self.due_date_width + self.score_width)
    }

    fn separator(&self) -> String {
        " ".repeat(self.separator_width)
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("report.layout.score_width", self.score_width, 1)?;
        validate_positive_number("report.layout.due_date_width", self.due_date_width, 1)?;
        let fixed = 2 * self.separator_width + self.due_date_width + self.score_width;
        if self.report_width < fixed + ELLIPSIS.len() + 1 {
            return Err(ReportError::InvalidConfigValueError {
                field: "report.layout.report_width".to_string(),
                value: self.report_width.to_string(),
                reason: format!(
                    "Must leave at least {} characters for assignment names after {} fixed columns",
                    ELLIPSIS.len() + 1,
                    fixed
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    layout: LayoutConfig,
}

impl ReportRenderer {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Renders against today's local date.
    pub fn render(&self, student: &str, courses: &Courses, mode: ReportMode) -> Result<String> {
        self.render_as_of(student, courses, mode, chrono::Local::now().date_naive())
    }

    pub fn render_as_of(
        &self,
        student: &str,
        courses: &Courses,
        mode: ReportMode,
        today: NaiveDate,
    ) -> Result<String> {
        let anchor = match mode {
            ReportMode::Full => None,
            ReportMode::Windowed { lookback_days } => {
                Some(date_filter::anchor_date(today, lookback_days)?)
            }
        };

        let mut report = String::new();
        push_line(
            &mut report,
            ljust(student, self.layout.report_width, BANNER_FILL),
        );

        for course in courses.values() {
            self.render_course(&mut report, course, anchor)?;
        }

        Ok(report)
    }

    fn render_course(
        &self,
        report: &mut String,
        course: &Course,
        anchor: Option<NaiveDate>,
    ) -> Result<()> {
        let layout = &self.layout;
        let separator = layout.separator();

        push_line(report, String::new());
        push_line(report, format!("{COURSE_MARKER}{}", course.title.to_uppercase()));
        push_line(
            report,
            [
                ljust("Assignment", layout.name_width(), ' '),
                ljust("Due Date", layout.due_date_width, ' '),
                rjust("Score", layout.score_width, ' '),
            ]
            .join(separator.as_str()),
        );

        for (mark_name, marking) in &course.markings {
            push_line(report, self.summary_row(mark_name, marking));
            for assignment in &marking.assignments {
                if let Some(anchor) = anchor {
                    if !date_filter::includes(&assignment.due_date, anchor)? {
                        continue;
                    }
                }
                push_line(report, self.assignment_row(assignment, &separator));
            }
        }

        Ok(())
    }

    fn summary_row(&self, mark_name: &str, marking: &Marking) -> String {
        let grade = format!("{} ({})", marking.overall_grade, marking.raw_grade);
        let name_span = self.layout.report_width.saturating_sub(self.layout.score_width);
        format!(
            "{}{}",
            ljust(mark_name, name_span, SUMMARY_FILL),
            rjust(&grade, self.layout.score_width, SUMMARY_FILL)
        )
    }

    fn assignment_row(&self, assignment: &Assignment, separator: &str) -> String {
        let layout = &self.layout;
        let name = truncate(&assignment.name, layout.name_width());
        let score = score::resolve(&assignment.raw_score, assignment.score_type, &assignment.points);
        [
            ljust(&name, layout.name_width(), ' '),
            ljust(&assignment.due_date, layout.due_date_width, ' '),
            rjust(&score, layout.score_width, ' '),
        ]
        .join(separator)
    }
}

/// `<student>.report.txt` or `<student>.partial.report.txt`.
pub fn report_file_name(student: &str, mode: ReportMode) -> String {
    format!("{}.{}", student, mode.file_suffix())
}

fn push_line(report: &mut String, line: String) {
    report.push_str(&line);
    report.push('\n');
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn ljust(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat(fill).take(width.saturating_sub(len)));
    padded
}

fn rjust(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    let mut padded: String = std::iter::repeat(fill).take(width.saturating_sub(len)).collect();
    padded.push_str(text);
    padded
}
