//! Score resolution for the report's score column.
//!
//! Stages run in order; the first one that produces a value wins. A stage that
//! does not apply, or whose numbers don't parse, hands over to the next one, and
//! when nothing resolves the raw score is echoed back with a trailing `?`.

use crate::domain::model::ScoreType;

const SENTINELS: [&str; 2] = ["Not Graded", "Not Due"];
const RAW_SCORE_SEPARATOR: &str = " out of ";
const POINTS_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreParseError {
    operand: String,
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a usable number", self.operand)
    }
}

/// Outcome of a single stage.
enum Stage {
    Resolved(String),
    NotApplicable,
    Failed(ScoreParseError),
}

struct ScoreInput<'a> {
    raw_score: &'a str,
    score_type: ScoreType,
    points: &'a str,
}

type Resolver = fn(&ScoreInput<'_>) -> Stage;

const CHAIN: [(&str, Resolver); 4] = [
    ("sentinel", sentinel as Resolver),
    ("percentage", percentage as Resolver),
    ("raw score", raw_score_fraction as Resolver),
    ("points", points_fraction as Resolver),
];

/// Display string for one assignment's score. Never fails.
pub fn resolve(raw_score: &str, score_type: ScoreType, points: &str) -> String {
    let input = ScoreInput {
        raw_score,
        score_type,
        points,
    };

    for (stage_name, stage) in CHAIN {
        match stage(&input) {
            Stage::Resolved(display) => return display,
            Stage::NotApplicable => {}
            Stage::Failed(err) => {
                tracing::debug!("Score stage '{}' gave up on '{}': {}", stage_name, raw_score, err);
            }
        }
    }

    format!("{raw_score}?")
}

fn sentinel(input: &ScoreInput<'_>) -> Stage {
    if SENTINELS.contains(&input.raw_score) {
        Stage::Resolved(input.raw_score.to_string())
    } else {
        Stage::NotApplicable
    }
}

fn percentage(input: &ScoreInput<'_>) -> Stage {
    if input.score_type != ScoreType::Percentage {
        return Stage::NotApplicable;
    }
    match parse_operand(input.raw_score) {
        Ok(value) => Stage::Resolved(format!("{value:.2}")),
        Err(err) => Stage::Failed(err),
    }
}

fn raw_score_fraction(input: &ScoreInput<'_>) -> Stage {
    if input.score_type != ScoreType::RawScore {
        return Stage::NotApplicable;
    }
    fraction(input.raw_score, RAW_SCORE_SEPARATOR)
}

fn points_fraction(input: &ScoreInput<'_>) -> Stage {
    fraction(input.points, POINTS_SEPARATOR)
}

fn fraction(text: &str, separator: &str) -> Stage {
    let parts: Vec<&str> = text.split(separator).collect();
    let &[numerator, denominator] = parts.as_slice() else {
        return Stage::NotApplicable;
    };

    match as_percent(numerator, denominator) {
        Ok(percent) => Stage::Resolved(format!("{percent:.2}")),
        Err(err) => Stage::Failed(err),
    }
}

fn as_percent(numerator: &str, denominator: &str) -> Result<f64, ScoreParseError> {
    let num = parse_operand(numerator)?;
    let den = parse_operand(denominator)?;
    let percent = num / den * 100.0;
    if den == 0.0 || !percent.is_finite() {
        return Err(ScoreParseError {
            operand: denominator.to_string(),
        });
    }
    Ok(percent)
}

fn parse_operand(text: &str) -> Result<f64, ScoreParseError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ScoreParseError {
            operand: text.to_string(),
        })
}
