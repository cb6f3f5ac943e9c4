//! # Data Types for the Editor Bridge
//!
//! This module defines the entities the bridge reads from the editor and the
//! statistics it derives from them.
//!
//! ## Overview
//!
//! | Type | Purpose | Trust |
//! |------|---------|-------|
//! | [`Container`] | Structural grouping of paragraphs | Validated |
//! | [`Paragraph`] | Block of content, optionally assigned to a container | Validated |
//! | [`LocalParagraph`] | Paragraph with creation/update timestamps | Validated |
//! | [`ExternalEditorData`] | Caller-supplied bundle of raw entries | Untrusted elements |
//! | [`EditorSnapshot`] | Raw state read from the editor store | Untrusted elements |
//! | [`EditorStatistics`] | Derived, immutable counts and progress | Derived |
//!
//! ## Untrusted Elements
//!
//! [`ExternalEditorData`] and [`EditorSnapshot`] keep their entries as raw
//! [`serde_json::Value`]s. Only the outer shape is checked when they are built;
//! each element is validated independently by the consumers in
//! [`shape`](crate::shape) and [`statistics`](crate::statistics).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::shape;

/// Structural grouping of paragraphs. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    pub name: String,
    pub order: f64,
}

/// Paragraph of content. `container_id == None` means unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub id: String,
    pub content: String,
    pub order: f64,
    pub container_id: Option<String>,
}

impl Paragraph {
    pub fn is_assigned(&self) -> bool {
        self.container_id.is_some()
    }
}

/// Paragraph as held by a host step component, with timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalParagraph {
    #[serde(flatten)]
    pub paragraph: Paragraph,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocalParagraph {
    pub fn is_assigned(&self) -> bool {
        self.paragraph.is_assigned()
    }
}

/// Externally supplied editor bundle.
///
/// Both sequences are guaranteed to exist; their elements are untrusted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalEditorData {
    pub local_containers: Vec<Value>,
    pub local_paragraphs: Vec<Value>,
}

impl ExternalEditorData {
    /// Valid containers, in their original relative order
    pub fn valid_containers(&self) -> Vec<Container> {
        self.local_containers
            .iter()
            .filter_map(|c| shape::parse_container(c).ok())
            .collect()
    }

    /// Valid local paragraphs, in their original relative order
    pub fn valid_paragraphs(&self) -> Vec<LocalParagraph> {
        self.local_paragraphs
            .iter()
            .filter_map(|p| shape::parse_local_paragraph(p).ok())
            .collect()
    }

    pub fn total_entries(&self) -> usize {
        self.local_containers.len() + self.local_paragraphs.len()
    }

    /// Convert back to the wire shape
    pub fn to_value(&self) -> Value {
        json!({
            "localContainers": self.local_containers,
            "localParagraphs": self.local_paragraphs,
        })
    }
}

/// Raw editor state read from the store.
///
/// Every field defaults to empty when missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    #[serde(default)]
    pub editor_containers: Vec<Value>,
    #[serde(default)]
    pub editor_paragraphs: Vec<Value>,
    #[serde(default)]
    pub editor_completed_content: String,
}

/// Which source produced a statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    External,
    Store,
    Unknown,
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Unknown
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::External => write!(f, "external"),
            DataSource::Store => write!(f, "store"),
            DataSource::Unknown => write!(f, "unknown"),
        }
    }
}

/// Normalized editor statistics.
///
/// # Invariants
///
/// - `assigned_paragraph_count + unassigned_paragraph_count == paragraph_count`
/// - `assignment_progress` is in [0, 100], and 0 when there are no paragraphs
/// - `has_unassigned_content == (unassigned_paragraph_count > 0)`
///
/// Build through [`EditorStatistics::from_counts`] to keep these invariants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorStatistics {
    pub container_count: u64,
    pub paragraph_count: u64,
    pub assigned_paragraph_count: u64,
    pub unassigned_paragraph_count: u64,
    pub total_content_length: u64,
    pub assignment_progress: u8,
    pub has_unassigned_content: bool,
    pub data_source: DataSource,
}

impl EditorStatistics {
    /// Build statistics from raw counts. `assigned` is capped at `paragraphs`.
    pub fn from_counts(
        containers: u64,
        paragraphs: u64,
        assigned: u64,
        content_length: u64,
        data_source: DataSource,
    ) -> Self {
        let assigned = assigned.min(paragraphs);
        let unassigned = paragraphs - assigned;
        Self {
            container_count: containers,
            paragraph_count: paragraphs,
            assigned_paragraph_count: assigned,
            unassigned_paragraph_count: unassigned,
            total_content_length: content_length,
            assignment_progress: crate::coerce::percentage(assigned, paragraphs).unwrap_or(0),
            has_unassigned_content: unassigned > 0,
            data_source,
        }
    }

    /// All-zero snapshot with unknown provenance
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Content length in Unicode scalar values
pub fn content_length(content: &str) -> u64 {
    content.chars().count() as u64
}
