use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The portal's gradebook exactly as fetched: attribute keys carry a leading `@`
/// and nested collections may be a single object, an array, or missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument(pub serde_json::Value);

impl RawDocument {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(content: &str) -> crate::utils::error::Result<Self> {
        Ok(Self(serde_json::from_str(content)?))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreType {
    Percentage,
    RawScore,
    Other,
}

impl ScoreType {
    pub fn from_portal(label: &str) -> Self {
        match label {
            "Percentage" => ScoreType::Percentage,
            "Raw Score" => ScoreType::RawScore,
            _ => ScoreType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub assigned_date: String,
    /// `MM/DD/YYYY`, kept verbatim; only the windowed report parses it.
    pub due_date: String,
    pub raw_score: String,
    pub score_type: ScoreType,
    /// `"<num> / <den>"` or empty.
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marking {
    pub overall_grade: String,
    pub raw_grade: String,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub markings: IndexMap<String, Marking>,
}

/// Courses keyed by title, in document order.
pub type Courses = IndexMap<String, Course>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub grade_period: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportMode {
    Full,
    Windowed { lookback_days: u32 },
}

impl ReportMode {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ReportMode::Full => "report.txt",
            ReportMode::Windowed { .. } => "partial.report.txt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportMode::Full => "full",
            ReportMode::Windowed { .. } => "windowed",
        }
    }
}

/// Login for one student. `Debug` is hand-written so passwords never reach the logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StudentAccount {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl std::fmt::Debug for StudentAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentAccount")
            .field("username", &self.username)
            .field("password", &"***")
            .field("domain", &self.domain)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub student: String,
    pub mode: ReportMode,
    /// Anchor used by the windowed filter; `None` for full reports.
    pub anchor: Option<NaiveDate>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    pub to: Vec<String>,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFailure {
    pub student: String,
    pub mode: Option<ReportMode>,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<String>,
    /// Reports rendered but not persisted (dry runs).
    pub previews: Vec<RenderedReport>,
    pub emailed: Vec<String>,
    pub failures: Vec<StudentFailure>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_type_from_portal_labels() {
        assert_eq!(ScoreType::from_portal("Percentage"), ScoreType::Percentage);
        assert_eq!(ScoreType::from_portal("Raw Score"), ScoreType::RawScore);
        assert_eq!(ScoreType::from_portal("Rubric"), ScoreType::Other);
        assert_eq!(ScoreType::from_portal(""), ScoreType::Other);
    }

    #[test]
    fn test_account_debug_hides_password() {
        let account = StudentAccount {
            username: "jdoe".to_string(),
            password: "hunter2".to_string(),
            domain: "portal.example.org".to_string(),
        };
        let printed = format!("{:?}", account);
        assert!(printed.contains("jdoe"));
        assert!(!printed.contains("hunter2"));
    }
}
