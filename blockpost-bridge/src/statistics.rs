//! Editor statistics extraction
//!
//! Statistics come from the first source that works:
//!
//! 1. validated external data (`DataSource::External`)
//! 2. the editor store through an [`EditorStateExtractor`] (`DataSource::Store`)
//! 3. an all-zero snapshot (`DataSource::Unknown`)
//!
//! Extraction never fails; collaborator errors are logged and degrade to the
//! empty snapshot.

use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::EditorStateExtractor;
use crate::data::{content_length, DataSource, EditorSnapshot, EditorStatistics, ExternalEditorData};

pub fn extract_editor_statistics(
    external: Option<&ExternalEditorData>,
    extractor: &dyn EditorStateExtractor,
) -> EditorStatistics {
    if let Some(data) = external {
        return statistics_from_external(data);
    }

    match extractor.editor_state_with_validation() {
        Ok(Some(snapshot)) => statistics_from_snapshot(&snapshot),
        Ok(None) => {
            debug!("Editor store returned no snapshot, using empty statistics");
            EditorStatistics::empty()
        }
        Err(e) => {
            warn!("Failed to read editor state: {}", e);
            EditorStatistics::empty()
        }
    }
}

/// Statistics computed purely from the valid entries of an external bundle
pub fn statistics_from_external(data: &ExternalEditorData) -> EditorStatistics {
    let containers = data.valid_containers();
    let paragraphs = data.valid_paragraphs();

    let assigned = paragraphs.iter().filter(|p| p.is_assigned()).count() as u64;
    let length = paragraphs
        .iter()
        .map(|p| content_length(&p.paragraph.content))
        .sum();

    EditorStatistics::from_counts(
        containers.len() as u64,
        paragraphs.len() as u64,
        assigned,
        length,
        DataSource::External,
    )
}

/// Statistics from a store snapshot, tolerant of malformed paragraph entries
pub fn statistics_from_snapshot(snapshot: &EditorSnapshot) -> EditorStatistics {
    let assigned = snapshot
        .editor_paragraphs
        .iter()
        .filter(|p| is_assigned_entry(p))
        .count() as u64;
    let length = snapshot
        .editor_paragraphs
        .iter()
        .filter_map(|p| p.get("content").and_then(Value::as_str))
        .map(content_length)
        .sum();

    EditorStatistics::from_counts(
        snapshot.editor_containers.len() as u64,
        snapshot.editor_paragraphs.len() as u64,
        assigned,
        length,
        DataSource::Store,
    )
}

fn is_assigned_entry(entry: &Value) -> bool {
    entry
        .get("containerId")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BridgeError, BridgeResult};
    use crate::shape::parse_external_data;
    use serde_json::json;

    struct FixedExtractor(fn() -> BridgeResult<Option<EditorSnapshot>>);

    impl EditorStateExtractor for FixedExtractor {
        fn editor_state_with_validation(&self) -> BridgeResult<Option<EditorSnapshot>> {
            (self.0)()
        }
    }

    fn unreachable_extractor() -> FixedExtractor {
        FixedExtractor(|| panic!("store must not be queried when external data is present"))
    }

    #[test]
    fn test_external_scenario() {
        let data = parse_external_data(&json!({
            "localContainers": [{"id": "c1", "name": "Intro", "order": 0}],
            "localParagraphs": [{
                "id": "p1",
                "content": "hello",
                "order": 0,
                "containerId": null,
                "createdAt": "2024-03-01T10:00:00Z",
                "updatedAt": "2024-03-01T10:00:00Z",
            }],
        }))
        .unwrap();

        let stats = extract_editor_statistics(Some(&data), &unreachable_extractor());

        assert_eq!(stats.container_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.assigned_paragraph_count, 0);
        assert_eq!(stats.unassigned_paragraph_count, 1);
        assert_eq!(stats.total_content_length, 5);
        assert!(stats.has_unassigned_content);
        assert_eq!(stats.data_source, DataSource::External);
    }

    #[test]
    fn test_external_ignores_invalid_entries() {
        let data = parse_external_data(&json!({
            "localContainers": [{"id": "c1", "name": "Intro", "order": 0}, {"id": 5}],
            "localParagraphs": [
                {
                    "id": "p1",
                    "content": "abc",
                    "order": 0,
                    "containerId": "c1",
                    "createdAt": 1_709_287_200_000i64,
                    "updatedAt": 1_709_287_200_000i64,
                },
                {"id": "p2", "content": "no timestamps", "order": 1, "containerId": null},
            ],
        }))
        .unwrap();

        let stats = statistics_from_external(&data);
        assert_eq!(stats.container_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.assigned_paragraph_count, 1);
        assert_eq!(stats.assignment_progress, 100);
        assert_eq!(stats.total_content_length, 3);
    }

    #[test]
    fn test_store_path() {
        let extractor = FixedExtractor(|| {
            Ok(Some(EditorSnapshot {
                editor_containers: vec![json!({"id": "c1"}), json!({"id": "c2"})],
                editor_paragraphs: vec![
                    json!({"id": "p1", "content": "one", "containerId": "c1"}),
                    json!({"id": "p2", "content": "two", "containerId": null}),
                    json!("garbage"),
                    json!({"id": "p4", "content": 7, "containerId": ""}),
                ],
                editor_completed_content: String::new(),
            }))
        });

        let stats = extract_editor_statistics(None, &extractor);
        assert_eq!(stats.data_source, DataSource::Store);
        assert_eq!(stats.container_count, 2);
        assert_eq!(stats.paragraph_count, 4);
        assert_eq!(stats.assigned_paragraph_count, 1);
        assert_eq!(stats.unassigned_paragraph_count, 3);
        assert_eq!(stats.total_content_length, 6);
        assert_eq!(stats.assignment_progress, 25);
    }

    #[test]
    fn test_missing_snapshot_yields_empty() {
        let stats = extract_editor_statistics(None, &FixedExtractor(|| Ok(None)));
        assert_eq!(stats, EditorStatistics::empty());
        assert_eq!(stats.data_source, DataSource::Unknown);
    }

    #[test]
    fn test_extractor_error_yields_empty() {
        let extractor = FixedExtractor(|| Err(BridgeError::Extractor("store offline".into())));
        let stats = extract_editor_statistics(None, &extractor);
        assert_eq!(stats, EditorStatistics::empty());
    }
}
