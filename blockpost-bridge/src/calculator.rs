//! Derived progress, metrics and validation values
//!
//! All functions here are pure and total. Malformed input degrades to the
//! documented defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{percentage, to_safe_count, to_safe_date, to_safe_number, to_safe_string_list};
use crate::data::{DataSource, EditorStatistics};
use crate::status::StatusColor;

/// Assignment progress for the progress widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub percentage: u8,
    pub color: StatusColor,
    pub label: String,
    pub description: String,
    pub is_complete: bool,
}

pub fn calculate_progress_data(stats: &EditorStatistics) -> ProgressData {
    let prefix = if stats.data_source == DataSource::External {
        "External data: "
    } else {
        ""
    };

    if stats.paragraph_count == 0 {
        return ProgressData {
            percentage: 0,
            color: StatusColor::Default,
            label: "No paragraphs".to_string(),
            description: format!("{}No paragraphs to assign", prefix),
            is_complete: false,
        };
    }

    let pct = stats.assignment_progress.min(100);
    let color = match pct {
        100 => StatusColor::Success,
        75..=99 => StatusColor::Primary,
        50..=74 => StatusColor::Warning,
        _ => StatusColor::Error,
    };

    ProgressData {
        percentage: pct,
        color,
        label: format!("{}%", pct),
        description: format!(
            "{}{} of {} paragraphs assigned",
            prefix, stats.assigned_paragraph_count, stats.paragraph_count
        ),
        is_complete: pct == 100,
    }
}

/// Normalized executor metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetrics {
    pub total_operations: u64,
    pub successful_operations: u64,
    pub failed_operations: u64,
    pub average_execution_time_ms: f64,
    pub last_execution_time: Option<DateTime<Utc>>,
    pub success_rate: u8,
    pub operations_per_minute: u64,
}

/// Minutes the raw operation total is assumed to span
const METRICS_WINDOW_MINUTES: f64 = 10.0;

/// Coerce an untyped metrics record field by field.
///
/// `operations_per_minute` divides the total by a fixed ten-minute window,
/// not by elapsed time.
pub fn calculate_execution_metrics(raw: &Value) -> ExecutionMetrics {
    let Some(obj) = raw.as_object() else {
        return ExecutionMetrics::default();
    };

    let total = to_safe_count(obj.get("totalOperations"), 0);
    let successful = to_safe_count(obj.get("successfulOperations"), 0);
    let average = to_safe_number(obj.get("averageExecutionTime"), 0.0).max(0.0);

    ExecutionMetrics {
        total_operations: total,
        successful_operations: successful,
        failed_operations: to_safe_count(obj.get("failedOperations"), 0),
        average_execution_time_ms: average,
        last_execution_time: to_safe_date(obj.get("lastExecutionTime")),
        success_rate: percentage(successful, total).unwrap_or(0),
        operations_per_minute: (total as f64 / METRICS_WINDOW_MINUTES).round() as u64,
    }
}

/// Error, warning and info messages with their counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    pub error_count: u64,
    pub warning_count: u64,
    pub info_count: u64,
    pub is_valid: bool,
    /// Share of infos among all messages, 100 when there are none
    pub validation_progress: u8,
}

impl Default for ValidationState {
    fn default() -> Self {
        calculate_validation_state(&[], &[], &[])
    }
}

pub fn calculate_validation_state(
    errors: &[String],
    warnings: &[String],
    infos: &[String],
) -> ValidationState {
    let error_count = errors.len() as u64;
    let warning_count = warnings.len() as u64;
    let info_count = infos.len() as u64;
    let total = error_count + warning_count + info_count;

    ValidationState {
        errors: errors.to_vec(),
        warnings: warnings.to_vec(),
        infos: infos.to_vec(),
        error_count,
        warning_count,
        info_count,
        is_valid: error_count == 0,
        validation_progress: percentage(info_count, total).unwrap_or(100),
    }
}

/// Untyped variant: non-sequence inputs count as empty
pub fn validation_state_from_values(
    errors: Option<&Value>,
    warnings: Option<&Value>,
    infos: Option<&Value>,
) -> ValidationState {
    calculate_validation_state(
        &to_safe_string_list(errors),
        &to_safe_string_list(warnings),
        &to_safe_string_list(infos),
    )
}
