//! Turns the portal's attribute-keyed gradebook into [`Courses`].
//!
//! The portal collapses one-element collections into a bare object and drops
//! empty ones entirely, so every nested collection goes through [`items`],
//! which always yields an ordered slice of entries.

use crate::domain::model::{
    Assignment, Course, Courses, Marking, RawDocument, ReportingPeriod, ScoreType,
};
use crate::utils::error::{ReportError, Result};
use indexmap::IndexMap;
use serde_json::Value;

const ROOT: &str = "Gradebook";

pub fn normalize(raw: &RawDocument) -> Result<Courses> {
    let gradebook = gradebook_root(raw)?;

    let mut courses = Courses::new();
    let course_path = format!("{ROOT}.Courses.Course");
    for (index, entry) in items(gradebook, &["Courses", "Course"]).iter().enumerate() {
        let path = format!("{course_path}[{index}]");
        let course = normalize_course(entry, &path)?;
        tracing::debug!(
            "Normalized course '{}' with {} marks",
            course.title,
            course.markings.len()
        );
        if let Some(previous) = courses.insert(course.title.clone(), course) {
            tracing::warn!("Duplicate course title '{}', keeping the later entry", previous.title);
        }
    }

    Ok(courses)
}

/// The reporting period the portal considers current, when the document names one.
pub fn current_reporting_period(raw: &RawDocument) -> Option<ReportingPeriod> {
    let period = raw.as_value().get(ROOT)?.get("ReportingPeriod")?;
    Some(ReportingPeriod {
        grade_period: scalar_text(period.get("@GradePeriod")?)?,
        start_date: period
            .get("@StartDate")
            .and_then(scalar_text)
            .unwrap_or_default(),
        end_date: period
            .get("@EndDate")
            .and_then(scalar_text)
            .unwrap_or_default(),
    })
}

fn gradebook_root(raw: &RawDocument) -> Result<&Value> {
    match raw.as_value().get(ROOT) {
        Some(value) if value.is_object() => Ok(value),
        Some(_) => Err(ReportError::structural(ROOT, "expected an object")),
        None => Err(ReportError::structural(ROOT, "field is missing")),
    }
}

fn normalize_course(entry: &Value, path: &str) -> Result<Course> {
    let title = required_text(entry, "@Title", path)?;

    let mut markings = IndexMap::new();
    for (index, mark) in items(entry, &["Marks", "Mark"]).iter().enumerate() {
        let mark_path = format!("{path}.Marks.Mark[{index}]");
        let name = required_text(mark, "@MarkName", &mark_path)?;
        let marking = normalize_marking(mark, &mark_path)?;
        markings.insert(name, marking);
    }

    Ok(Course { title, markings })
}

fn normalize_marking(mark: &Value, path: &str) -> Result<Marking> {
    let overall_grade = required_text(mark, "@CalculatedScoreString", path)?;
    let raw_grade = required_text(mark, "@CalculatedScoreRaw", path)?;

    let assignments = items(mark, &["Assignments", "Assignment"])
        .iter()
        .enumerate()
        .map(|(index, assignment)| {
            normalize_assignment(
                assignment,
                &format!("{path}.Assignments.Assignment[{index}]"),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Marking {
        overall_grade,
        raw_grade,
        assignments,
    })
}

fn normalize_assignment(entry: &Value, path: &str) -> Result<Assignment> {
    Ok(Assignment {
        name: required_text(entry, "@Measure", path)?,
        assigned_date: entry.get("@Date").and_then(scalar_text).unwrap_or_default(),
        due_date: required_text(entry, "@DueDate", path)?,
        raw_score: required_text(entry, "@Score", path)?,
        score_type: ScoreType::from_portal(&required_text(entry, "@ScoreType", path)?),
        points: required_text(entry, "@Points", path)?,
    })
}

/// Follows `keys` from `parent` and absorbs the portal's arity quirk: a missing
/// or null node is no entries, a bare object is one entry, an array is itself.
fn items<'a>(parent: &'a Value, keys: &[&str]) -> &'a [Value] {
    let mut node = parent;
    for key in keys {
        match node.get(*key) {
            Some(next) => node = next,
            None => return &[],
        }
    }

    match node {
        Value::Array(entries) => entries.as_slice(),
        Value::Null => &[],
        single => std::slice::from_ref(single),
    }
}

fn required_text(entry: &Value, key: &str, path: &str) -> Result<String> {
    match entry.get(key) {
        Some(value) => scalar_text(value).ok_or_else(|| {
            ReportError::structural(format!("{path}.{key}"), "expected a text value")
        }),
        None => Err(ReportError::structural(
            format!("{path}.{key}"),
            "field is missing",
        )),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
