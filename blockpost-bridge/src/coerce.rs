//! Value coercion helpers
//!
//! Pure functions that turn arbitrary JSON input into safe typed values.
//! Each helper takes an explicit fallback; none of them panic.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presentational size token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Sm,
    Md,
    Lg,
    Xl,
}

impl Default for Size {
    fn default() -> Self {
        Size::Md
    }
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Sm => "sm",
            Size::Md => "md",
            Size::Lg => "lg",
            Size::Xl => "xl",
        }
    }

    /// Parse a size token, `None` for anything unrecognized
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "sm" => Some(Size::Sm),
            "md" => Some(Size::Md),
            "lg" => Some(Size::Lg),
            "xl" => Some(Size::Xl),
            _ => None,
        }
    }
}

/// JSON numbers pass through, everything else yields `fallback`.
pub fn to_safe_number(value: Option<&Value>, fallback: f64) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n,
        _ => fallback,
    }
}

/// Non-negative whole numbers only.
pub fn to_safe_count(value: Option<&Value>, fallback: u64) -> u64 {
    let Some(value) = value else {
        return fallback;
    };
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => {
            n as u64
        }
        _ => fallback,
    }
}

pub fn to_safe_string(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

pub fn to_safe_bool(value: Option<&Value>, fallback: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(fallback)
}

/// Accepts RFC 3339 strings or integer Unix-epoch milliseconds.
pub fn to_safe_date(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub fn to_safe_size(value: Option<&Value>, fallback: Size) -> Size {
    value
        .and_then(Value::as_str)
        .and_then(Size::from_token)
        .unwrap_or(fallback)
}

/// Non-sequences become empty; non-string elements are dropped.
pub fn to_safe_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Percentage of `part` in `total`, rounded half away from zero and clamped
/// to [0, 100]. `None` when `total` is zero so callers pick their own policy.
pub fn percentage(part: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = (part as f64 / total as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_safe_number() {
        assert_eq!(to_safe_number(Some(&json!(4.5)), 0.0), 4.5);
        assert_eq!(to_safe_number(Some(&json!("4.5")), 1.0), 1.0);
        assert_eq!(to_safe_number(Some(&Value::Null), 2.0), 2.0);
        assert_eq!(to_safe_number(None, 3.0), 3.0);
    }

    #[test]
    fn test_to_safe_count_rejects_negative_and_fractional() {
        assert_eq!(to_safe_count(Some(&json!(7)), 0), 7);
        assert_eq!(to_safe_count(Some(&json!(7.0)), 0), 7);
        assert_eq!(to_safe_count(Some(&json!(-1)), 3), 3);
        assert_eq!(to_safe_count(Some(&json!(2.5)), 3), 3);
        assert_eq!(to_safe_count(Some(&json!(true)), 3), 3);
    }

    #[test]
    fn test_to_safe_string_and_bool() {
        assert_eq!(to_safe_string(Some(&json!("abc")), "x"), "abc");
        assert_eq!(to_safe_string(Some(&json!(12)), "x"), "x");
        assert!(to_safe_bool(Some(&json!(true)), false));
        assert!(to_safe_bool(Some(&json!("true")), true));
        assert!(!to_safe_bool(Some(&json!(1)), false));
    }

    #[test]
    fn test_to_safe_date() {
        let parsed = to_safe_date(Some(&json!("2024-03-01T10:00:00Z"))).unwrap();
        assert_eq!(parsed.timestamp(), 1_709_287_200);

        let from_ms = to_safe_date(Some(&json!(1_709_287_200_000i64))).unwrap();
        assert_eq!(from_ms, parsed);

        assert!(to_safe_date(Some(&json!("yesterday"))).is_none());
        assert!(to_safe_date(Some(&json!({}))).is_none());
        assert!(to_safe_date(None).is_none());
    }

    #[test]
    fn test_to_safe_size() {
        assert_eq!(to_safe_size(Some(&json!("xl")), Size::Md), Size::Xl);
        assert_eq!(to_safe_size(Some(&json!("huge")), Size::Md), Size::Md);
        assert_eq!(to_safe_size(None, Size::Sm), Size::Sm);
    }

    #[test]
    fn test_to_safe_string_list() {
        let list = to_safe_string_list(Some(&json!(["a", 1, "b", null])));
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
        assert!(to_safe_string_list(Some(&json!("a"))).is_empty());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(1, 3), Some(33));
        assert_eq!(percentage(2, 3), Some(67));
        assert_eq!(percentage(1, 2), Some(50));
        assert_eq!(percentage(5, 4), Some(100));
    }
}
