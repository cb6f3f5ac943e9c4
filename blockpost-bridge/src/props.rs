//! Presentational properties for status widgets
//!
//! Lookup tables from status and statistics to widget tokens:
//!
//! | Input | Output | Table |
//! |-------|--------|-------|
//! | severity | size | low→md, medium→lg, high→lg, critical→xl |
//! | assignment progress | elevation | >=90→lg, >=50→md, else sm |
//! | severity | notification duration (ms) | low→3000, medium→5000, high→7000, critical→10000 |
//! | status kind | variant | loading→flat, error→solid, warning→bordered, success→shadow |

use serde::{Deserialize, Serialize};

use crate::calculator::ProgressData;
use crate::coerce::Size;
use crate::data::EditorStatistics;
use crate::status::{Severity, StatusColor, StatusIcon, UiStatusInfo};

pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    Sm,
    Md,
    Lg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Solid,
    Bordered,
    Flat,
    Shadow,
}

pub fn size_for_severity(severity: Severity) -> Size {
    match severity {
        Severity::Low => Size::Md,
        Severity::Medium | Severity::High => Size::Lg,
        Severity::Critical => Size::Xl,
    }
}

pub fn elevation_for_progress(progress: u8) -> Elevation {
    match progress {
        90.. => Elevation::Lg,
        50..=89 => Elevation::Md,
        _ => Elevation::Sm,
    }
}

pub fn notification_duration_ms(severity: Severity) -> u64 {
    match severity {
        Severity::Low => 3000,
        Severity::Medium => 5000,
        Severity::High => 7000,
        Severity::Critical => 10000,
    }
}

/// Duration for a raw severity token; unknown tokens get the default.
pub fn notification_duration_for_token(token: &str) -> u64 {
    match token {
        "low" => notification_duration_ms(Severity::Low),
        "medium" => notification_duration_ms(Severity::Medium),
        "high" => notification_duration_ms(Severity::High),
        "critical" => notification_duration_ms(Severity::Critical),
        _ => DEFAULT_NOTIFICATION_DURATION_MS,
    }
}

pub fn variant_for_status(status: &UiStatusInfo) -> Variant {
    if status.is_loading {
        Variant::Flat
    } else if status.has_error {
        Variant::Solid
    } else if status.has_warning {
        Variant::Bordered
    } else {
        Variant::Shadow
    }
}

/// Shared presentational parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProps {
    pub size: Size,
    pub variant: Variant,
    pub elevation: Elevation,
    pub notification_duration_ms: u64,
}

pub fn calculate_component_props(status: &UiStatusInfo, stats: &EditorStatistics) -> ComponentProps {
    ComponentProps {
        size: size_for_severity(status.severity),
        variant: variant_for_status(status),
        elevation: elevation_for_progress(stats.assignment_progress),
        notification_duration_ms: notification_duration_ms(status.severity),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButtonProps {
    pub size: Size,
    pub color: StatusColor,
    pub variant: Variant,
    pub is_disabled: bool,
    pub is_loading: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCardProps {
    pub elevation: Elevation,
    pub color: StatusColor,
    pub icon: StatusIcon,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationProps {
    pub duration_ms: u64,
    pub color: StatusColor,
    pub message: String,
    /// Only errors and warnings are announced
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBarProps {
    pub size: Size,
    pub message: String,
    pub progress_percentage: u8,
    pub progress_color: StatusColor,
}

/// Per-widget bundles built from one derivation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProps {
    pub action_button: ActionButtonProps,
    pub status_card: StatusCardProps,
    pub notification: NotificationProps,
    pub status_bar: StatusBarProps,
}

pub fn calculate_widget_props(
    status: &UiStatusInfo,
    component: &ComponentProps,
    progress: &ProgressData,
) -> WidgetProps {
    let label = if status.is_loading {
        "Transferring..."
    } else if status.can_execute_action {
        "Transfer"
    } else {
        "Transfer unavailable"
    };

    WidgetProps {
        action_button: ActionButtonProps {
            size: component.size,
            color: status.color,
            variant: component.variant,
            is_disabled: !status.can_execute_action || status.is_loading,
            is_loading: status.is_loading,
            label: label.to_string(),
        },
        status_card: StatusCardProps {
            elevation: component.elevation,
            color: status.color,
            icon: status.icon,
            message: status.message.clone(),
            severity: status.severity,
        },
        notification: NotificationProps {
            duration_ms: component.notification_duration_ms,
            color: status.color,
            message: status.message.clone(),
            is_visible: status.has_error || status.has_warning,
        },
        status_bar: StatusBarProps {
            size: Size::Sm,
            message: status.message.clone(),
            progress_percentage: progress.percentage,
            progress_color: progress.color,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{calculate_progress_data, calculate_validation_state};
    use crate::data::DataSource;
    use crate::status::calculate_status_info;

    fn status(is_executing: bool, error: Option<&str>, stats: &EditorStatistics) -> UiStatusInfo {
        calculate_status_info(
            is_executing,
            error,
            true,
            stats,
            &calculate_validation_state(&[], &[], &[]),
            false,
        )
    }

    #[test]
    fn test_size_table() {
        assert_eq!(size_for_severity(Severity::Low), Size::Md);
        assert_eq!(size_for_severity(Severity::Medium), Size::Lg);
        assert_eq!(size_for_severity(Severity::High), Size::Lg);
        assert_eq!(size_for_severity(Severity::Critical), Size::Xl);
    }

    #[test]
    fn test_elevation_thresholds() {
        assert_eq!(elevation_for_progress(100), Elevation::Lg);
        assert_eq!(elevation_for_progress(90), Elevation::Lg);
        assert_eq!(elevation_for_progress(89), Elevation::Md);
        assert_eq!(elevation_for_progress(50), Elevation::Md);
        assert_eq!(elevation_for_progress(49), Elevation::Sm);
        assert_eq!(elevation_for_progress(0), Elevation::Sm);
    }

    #[test]
    fn test_duration_table_and_default() {
        assert_eq!(notification_duration_for_token("low"), 3000);
        assert_eq!(notification_duration_for_token("medium"), 5000);
        assert_eq!(notification_duration_for_token("high"), 7000);
        assert_eq!(notification_duration_for_token("critical"), 10000);
        assert_eq!(notification_duration_for_token("urgent"), 5000);
        assert_eq!(notification_duration_for_token(""), 5000);
    }

    #[test]
    fn test_component_props_for_ready_status() {
        let stats = EditorStatistics::from_counts(1, 2, 2, 10, DataSource::Store);
        let ready = status(false, None, &stats);
        let props = calculate_component_props(&ready, &stats);

        assert_eq!(props.size, Size::Md);
        assert_eq!(props.variant, Variant::Shadow);
        assert_eq!(props.elevation, Elevation::Lg);
        assert_eq!(props.notification_duration_ms, 3000);
    }

    #[test]
    fn test_widget_props_for_error() {
        let stats = EditorStatistics::from_counts(1, 4, 1, 10, DataSource::Store);
        let failed = status(false, Some("disk full"), &stats);
        let component = calculate_component_props(&failed, &stats);
        let widgets = calculate_widget_props(&failed, &component, &calculate_progress_data(&stats));

        assert_eq!(component.variant, Variant::Solid);
        assert!(widgets.action_button.is_disabled);
        assert_eq!(widgets.action_button.label, "Transfer unavailable");
        assert!(widgets.notification.is_visible);
        assert_eq!(widgets.notification.color, StatusColor::Error);
        assert_eq!(widgets.status_card.message, "Transfer failed: disk full");
        assert_eq!(widgets.status_bar.progress_percentage, 25);
        assert_eq!(widgets.status_bar.progress_color, StatusColor::Error);
    }

    #[test]
    fn test_widget_props_while_loading() {
        let stats = EditorStatistics::empty();
        let loading = status(true, None, &stats);
        let component = calculate_component_props(&loading, &stats);
        let widgets = calculate_widget_props(&loading, &component, &calculate_progress_data(&stats));

        assert_eq!(component.variant, Variant::Flat);
        assert!(widgets.action_button.is_loading);
        assert!(widgets.action_button.is_disabled);
        assert!(!widgets.notification.is_visible);
    }
}
