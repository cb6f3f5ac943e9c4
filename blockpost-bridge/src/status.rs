//! Prioritized UI status derivation
//!
//! [`calculate_status_info`] walks a fixed decision list and returns the
//! status of the first rule that matches:
//!
//! | # | Condition | Status | Can execute |
//! |---|-----------|--------|-------------|
//! | 1 | executing | loading | no |
//! | 2 | executor error message | error | no |
//! | 3 | validation errors | error | no |
//! | 4 | forward transfer unavailable | warning | no |
//! | 5 | unassigned paragraphs | warning | yes |
//! | 6 | validation warnings | warning | yes |
//! | 7 | otherwise | success | yes |

use serde::{Deserialize, Serialize};

use crate::calculator::ValidationState;
use crate::data::EditorStatistics;

/// Escalation level driving presentational emphasis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Color token for status widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Default,
    Primary,
    Success,
    Warning,
    Error,
}

/// Icon token for status widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusIcon {
    Loading,
    Error,
    Warning,
    Ready,
}

/// The single status currently shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStatusInfo {
    pub is_loading: bool,
    pub has_error: bool,
    pub has_warning: bool,
    pub message: String,
    pub color: StatusColor,
    pub icon: StatusIcon,
    pub can_execute_action: bool,
    pub severity: Severity,
}

impl UiStatusInfo {
    fn loading(message: String) -> Self {
        Self {
            is_loading: true,
            has_error: false,
            has_warning: false,
            message,
            color: StatusColor::Primary,
            icon: StatusIcon::Loading,
            can_execute_action: false,
            severity: Severity::Low,
        }
    }

    fn error(message: String, severity: Severity) -> Self {
        Self {
            is_loading: false,
            has_error: true,
            has_warning: false,
            message,
            color: StatusColor::Error,
            icon: StatusIcon::Error,
            can_execute_action: false,
            severity,
        }
    }

    fn warning(message: String, can_execute: bool, severity: Severity) -> Self {
        Self {
            is_loading: false,
            has_error: false,
            has_warning: true,
            message,
            color: StatusColor::Warning,
            icon: StatusIcon::Warning,
            can_execute_action: can_execute,
            severity,
        }
    }

    fn ready(message: String) -> Self {
        Self {
            is_loading: false,
            has_error: false,
            has_warning: false,
            message,
            color: StatusColor::Success,
            icon: StatusIcon::Ready,
            can_execute_action: true,
            severity: Severity::Low,
        }
    }
}

/// Severity from validation counts and whether the action may run.
pub fn calculate_severity(validation: &ValidationState, can_execute: bool) -> Severity {
    if validation.error_count >= 5 {
        Severity::Critical
    } else if validation.error_count > 0 {
        Severity::High
    } else if validation.warning_count >= 3 {
        Severity::Medium
    } else if !can_execute {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn calculate_status_info(
    is_executing: bool,
    error_message: Option<&str>,
    can_execute_forward: bool,
    stats: &EditorStatistics,
    validation: &ValidationState,
    has_external_data: bool,
) -> UiStatusInfo {
    if is_executing {
        let message = if has_external_data {
            "Transferring external data..."
        } else {
            "Transfer in progress..."
        };
        return UiStatusInfo::loading(message.to_string());
    }

    if let Some(error) = error_message.filter(|e| !e.is_empty()) {
        return UiStatusInfo::error(
            format!("Transfer failed: {}", error),
            calculate_severity(validation, false),
        );
    }

    if validation.error_count > 0 {
        return UiStatusInfo::error(
            format!(
                "{} validation error{} found",
                validation.error_count,
                plural(validation.error_count)
            ),
            calculate_severity(validation, false),
        );
    }

    if !can_execute_forward {
        let message = if has_external_data {
            "External data loaded, but transfer is not available"
        } else {
            "Transfer is not available yet"
        };
        return UiStatusInfo::warning(
            message.to_string(),
            false,
            calculate_severity(validation, false),
        );
    }

    if stats.has_unassigned_content {
        let count = stats.unassigned_paragraph_count;
        let prefix = if has_external_data { "External data: " } else { "" };
        return UiStatusInfo::warning(
            format!(
                "{}{} unassigned paragraph{}",
                prefix,
                count,
                plural(count)
            ),
            true,
            calculate_severity(validation, true),
        );
    }

    if validation.warning_count > 0 {
        return UiStatusInfo::warning(
            format!(
                "{} validation warning{}",
                validation.warning_count,
                plural(validation.warning_count)
            ),
            true,
            calculate_severity(validation, true),
        );
    }

    let message = if has_external_data {
        format!(
            "External data ready to transfer ({} paragraph{})",
            stats.paragraph_count,
            plural(stats.paragraph_count)
        )
    } else {
        "Ready to transfer".to_string()
    };
    UiStatusInfo::ready(message)
}

pub(crate) fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_validation_state;
    use crate::data::DataSource;

    fn validation(errors: usize, warnings: usize) -> ValidationState {
        let errors: Vec<String> = (0..errors).map(|i| format!("error {i}")).collect();
        let warnings: Vec<String> = (0..warnings).map(|i| format!("warning {i}")).collect();
        calculate_validation_state(&errors, &warnings, &[])
    }

    fn stats_with_unassigned(unassigned: u64) -> EditorStatistics {
        EditorStatistics::from_counts(1, 3, 3 - unassigned, 30, DataSource::Store)
    }

    #[test]
    fn test_all_rules_active_picks_loading() {
        let status = calculate_status_info(
            true,
            Some("boom"),
            false,
            &stats_with_unassigned(2),
            &validation(6, 4),
            true,
        );
        assert!(status.is_loading);
        assert_eq!(status.color, StatusColor::Primary);
        assert_eq!(status.icon, StatusIcon::Loading);
        assert!(!status.can_execute_action);
        assert_eq!(status.severity, Severity::Low);
    }

    #[test]
    fn test_priority_order_rule_by_rule() {
        let stats = stats_with_unassigned(2);

        // Rule 2: executor error beats validation errors
        let status = calculate_status_info(false, Some("boom"), false, &stats, &validation(1, 4), false);
        assert!(status.has_error);
        assert_eq!(status.message, "Transfer failed: boom");
        assert_eq!(status.severity, Severity::High);

        // Rule 3: validation errors beat forward unavailability
        let status = calculate_status_info(false, None, false, &stats, &validation(2, 4), false);
        assert!(status.has_error);
        assert_eq!(status.message, "2 validation errors found");
        assert!(!status.can_execute_action);

        // Rule 4: forward unavailable beats unassigned content
        let status = calculate_status_info(false, None, false, &stats, &validation(0, 4), false);
        assert!(status.has_warning);
        assert!(!status.can_execute_action);
        assert_eq!(status.message, "Transfer is not available yet");

        // Rule 5: unassigned content beats validation warnings
        let status = calculate_status_info(false, None, true, &stats, &validation(0, 4), false);
        assert!(status.has_warning);
        assert!(status.can_execute_action);
        assert_eq!(status.message, "2 unassigned paragraphs");

        // Rule 6: validation warnings
        let status = calculate_status_info(
            false,
            None,
            true,
            &stats_with_unassigned(0),
            &validation(0, 1),
            false,
        );
        assert_eq!(status.message, "1 validation warning");
        assert!(status.can_execute_action);
        assert_eq!(status.severity, Severity::Low);

        // Rule 7: ready
        let status = calculate_status_info(
            false,
            None,
            true,
            &stats_with_unassigned(0),
            &validation(0, 0),
            false,
        );
        assert!(!status.has_error && !status.has_warning && !status.is_loading);
        assert_eq!(status.color, StatusColor::Success);
        assert_eq!(status.icon, StatusIcon::Ready);
        assert_eq!(status.message, "Ready to transfer");
    }

    #[test]
    fn test_empty_error_message_is_ignored() {
        let status = calculate_status_info(
            false,
            Some(""),
            true,
            &stats_with_unassigned(0),
            &validation(0, 0),
            false,
        );
        assert_eq!(status.icon, StatusIcon::Ready);
    }

    #[test]
    fn test_external_phrasing_does_not_change_branch() {
        let stats = stats_with_unassigned(1);
        let local = calculate_status_info(false, None, true, &stats, &validation(0, 0), false);
        let external = calculate_status_info(false, None, true, &stats, &validation(0, 0), true);

        assert_eq!(local.message, "1 unassigned paragraph");
        assert_eq!(external.message, "External data: 1 unassigned paragraph");
        assert_eq!(local.color, external.color);
        assert_eq!(local.can_execute_action, external.can_execute_action);
    }

    #[test]
    fn test_severity_rule() {
        assert_eq!(calculate_severity(&validation(5, 0), true), Severity::Critical);
        assert_eq!(calculate_severity(&validation(1, 0), true), Severity::High);
        assert_eq!(calculate_severity(&validation(0, 3), true), Severity::Medium);
        assert_eq!(calculate_severity(&validation(0, 0), false), Severity::Medium);
        assert_eq!(calculate_severity(&validation(0, 2), true), Severity::Low);
    }

    #[test]
    fn test_warning_severity_escalates_with_many_warnings() {
        let status = calculate_status_info(
            false,
            None,
            true,
            &stats_with_unassigned(1),
            &validation(0, 3),
            false,
        );
        assert_eq!(status.severity, Severity::Medium);
    }
}
