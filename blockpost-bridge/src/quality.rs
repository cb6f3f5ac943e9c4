//! External data quality analysis
//!
//! Scores a bundle by the share of structurally valid entries and lists the
//! problems found. A bundle with no entries scores 100 but is still rejected
//! because it does not meet the minimum-data requirement.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::ExternalEditorData;
use crate::status::plural;

/// Minimum quality score for a bundle to be considered valid
pub const QUALITY_THRESHOLD: u8 = 80;

pub const ISSUE_MINIMUM_DATA: &str = "No valid containers or paragraphs (minimum data not met)";
pub const ISSUE_NO_DATA: &str = "No external data provided";

/// Quality summary for an external data bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub is_valid: bool,
    pub quality_score: u8,
    pub issues: Vec<String>,
    /// Number of valid containers
    pub container_count: u64,
    /// Number of valid paragraphs
    pub paragraph_count: u64,
}

impl DataQuality {
    /// Result used when no external data was supplied
    pub fn absent() -> Self {
        Self {
            is_valid: false,
            quality_score: 0,
            issues: vec![ISSUE_NO_DATA.to_string()],
            container_count: 0,
            paragraph_count: 0,
        }
    }
}

pub fn analyze_external_data_quality(data: &ExternalEditorData) -> DataQuality {
    let valid_containers = data.valid_containers().len();
    let valid_paragraphs = data.valid_paragraphs().len();
    let invalid_containers = data.local_containers.len() - valid_containers;
    let invalid_paragraphs = data.local_paragraphs.len() - valid_paragraphs;

    let total = data.total_entries() as u64;
    let valid = (valid_containers + valid_paragraphs) as u64;
    let quality_score = crate::coerce::percentage(valid, total).unwrap_or(100);

    let mut issues = Vec::new();
    if invalid_containers > 0 {
        issues.push(format!(
            "{} invalid container{} found",
            invalid_containers,
            plural(invalid_containers as u64)
        ));
    }
    if invalid_paragraphs > 0 {
        issues.push(format!(
            "{} invalid paragraph{} found",
            invalid_paragraphs,
            plural(invalid_paragraphs as u64)
        ));
    }
    if valid_containers == 0 && valid_paragraphs == 0 {
        issues.push(ISSUE_MINIMUM_DATA.to_string());
    }

    let quality = DataQuality {
        is_valid: issues.is_empty() && quality_score >= QUALITY_THRESHOLD,
        quality_score,
        issues,
        container_count: valid_containers as u64,
        paragraph_count: valid_paragraphs as u64,
    };

    debug!(
        "External data quality: score={} valid={} issues={}",
        quality.quality_score,
        quality.is_valid,
        quality.issues.len()
    );

    quality
}
