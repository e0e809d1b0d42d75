use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::num::IntErrorKind;

pub const FIELD_REQUIRED: &str = "This field is required.";
pub const NOT_A_NUMBER: &str = "Not a valid number.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const NEGATIVE_VALUE: &str = "Must not be negative.";
pub const TOO_LARGE: &str = "Value is too large.";

/// Upper bound for minutes and calories. Keeps table-wide sums inside `i64`.
pub const MAX_COUNT: i64 = i32::MAX as i64;
/// Upper bound for a single run's distance in kilometres.
pub const MAX_DISTANCE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Run {
    pub id: i64,
    pub user_id: Option<i64>,
    /// Kilometres.
    pub distance: f64,
    /// Minutes.
    pub run_time: i64,
    pub calories_burned: i64,
    pub created_at: DateTime<Utc>,
}

/// Raw add/edit form submission. Every field arrives as text so that empty
/// and malformed values can be reported back inline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub run_time: String,
    #[serde(default)]
    pub calories_burned: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Validated values ready to be written to a run row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunInput {
    pub distance: f64,
    pub run_time: i64,
    pub calories_burned: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormErrors {
    pub distance: Option<String>,
    pub run_time: Option<String>,
    pub calories_burned: Option<String>,
    pub form: Option<String>,
}

impl RunFormErrors {
    pub fn form_error(message: impl Into<String>) -> Self {
        Self {
            form: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_none()
            && self.run_time.is_none()
            && self.calories_burned.is_none()
            && self.form.is_none()
    }
}

impl RunForm {
    /// Pre-fills the form from a stored run.
    pub fn from_run(run: &Run) -> Self {
        Self {
            distance: format_distance(run.distance),
            run_time: run.run_time.to_string(),
            calories_burned: run.calories_burned.to_string(),
            csrf_token: String::new(),
        }
    }

    pub fn validate(&self) -> Result<RunInput, RunFormErrors> {
        let distance = parse_distance(&self.distance);
        let run_time = parse_count(&self.run_time);
        let calories_burned = parse_count(&self.calories_burned);

        match (distance, run_time, calories_burned) {
            (Ok(distance), Ok(run_time), Ok(calories_burned)) => Ok(RunInput {
                distance,
                run_time,
                calories_burned,
            }),
            (distance, run_time, calories_burned) => Err(RunFormErrors {
                distance: distance.err().map(str::to_string),
                run_time: run_time.err().map(str::to_string),
                calories_burned: calories_burned.err().map(str::to_string),
                form: None,
            }),
        }
    }
}

fn parse_distance(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FIELD_REQUIRED);
    }
    let value = raw.parse::<f64>().map_err(|_| NOT_A_NUMBER)?;
    if !value.is_finite() {
        return Err(NOT_A_NUMBER);
    }
    if value < 0.0 {
        return Err(NEGATIVE_VALUE);
    }
    if value > MAX_DISTANCE {
        return Err(TOO_LARGE);
    }
    Ok(value)
}

fn parse_count(raw: &str) -> Result<i64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FIELD_REQUIRED);
    }
    let value = raw.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => TOO_LARGE,
        _ => NOT_AN_INTEGER,
    })?;
    if value < 0 {
        return Err(NEGATIVE_VALUE);
    }
    if value > MAX_COUNT {
        return Err(TOO_LARGE);
    }
    Ok(value)
}

/// Renders a distance with at most two decimals and no trailing zeros.
pub fn format_distance(distance: f64) -> String {
    let rendered = format!("{:.2}", distance);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Aggregates shown on the dashboard and mailed in the weekly report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, FromRow)]
pub struct RunTotals {
    pub run_count: i64,
    pub total_distance: f64,
    pub total_run_time: i64,
    pub total_calories: i64,
}
