//! Bridge configuration normalization
//!
//! Any JSON value can be normalized into a [`BridgeConfiguration`]. Known
//! fields are coerced one by one with their own defaults; unknown keys are
//! carried through untouched in [`BridgeConfiguration::extra`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce::{to_safe_bool, to_safe_count};

pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

const KNOWN_KEYS: [&str; 7] = [
    "enableValidation",
    "enableErrorRecovery",
    "debugMode",
    "maxRetryAttempts",
    "timeoutMs",
    "performanceLogging",
    "strictTypeChecking",
];

/// Fully populated bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfiguration {
    pub enable_validation: bool,
    pub enable_error_recovery: bool,
    pub debug_mode: bool,
    pub max_retry_attempts: u32,
    pub timeout_ms: u64,
    pub performance_logging: bool,
    pub strict_type_checking: bool,
    /// Unrecognized keys from the input, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BridgeConfiguration {
    fn default() -> Self {
        Self {
            enable_validation: true,
            enable_error_recovery: true,
            debug_mode: false,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            performance_logging: false,
            strict_type_checking: true,
            extra: Map::new(),
        }
    }
}

impl BridgeConfiguration {
    /// Serialize back to a JSON object (known fields plus extras)
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Normalize an arbitrary value. Non-objects yield the default record.
pub fn normalize_configuration(raw: Option<&Value>) -> BridgeConfiguration {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return BridgeConfiguration::default();
    };
    let defaults = BridgeConfiguration::default();

    let max_retry_attempts = u32::try_from(to_safe_count(
        obj.get("maxRetryAttempts"),
        u64::from(defaults.max_retry_attempts),
    ))
    .unwrap_or(defaults.max_retry_attempts);

    let timeout_ms = match to_safe_count(obj.get("timeoutMs"), defaults.timeout_ms) {
        0 => defaults.timeout_ms,
        ms => ms,
    };

    let extra = obj
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    BridgeConfiguration {
        enable_validation: to_safe_bool(obj.get("enableValidation"), defaults.enable_validation),
        enable_error_recovery: to_safe_bool(
            obj.get("enableErrorRecovery"),
            defaults.enable_error_recovery,
        ),
        debug_mode: to_safe_bool(obj.get("debugMode"), defaults.debug_mode),
        max_retry_attempts,
        timeout_ms,
        performance_logging: to_safe_bool(
            obj.get("performanceLogging"),
            defaults.performance_logging,
        ),
        strict_type_checking: to_safe_bool(
            obj.get("strictTypeChecking"),
            defaults.strict_type_checking,
        ),
        extra,
    }
}
