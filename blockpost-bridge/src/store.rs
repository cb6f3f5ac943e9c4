//! In-memory editor store and local executor
//!
//! [`EditorStore`] holds the global editor state the bridge reads from.
//! [`LocalExecutor`] moves data between caller-supplied external bundles and
//! that store, recording the raw metrics the calculator normalizes.
//!
//! Bridges write to the store, the view reads from it on the next derivation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::bridge::{BridgeExecutor, EditorStateExtractor, ExecutorStatus};
use crate::config::BridgeConfiguration;
use crate::data::{EditorSnapshot, ExternalEditorData, LocalParagraph};
use crate::error::{BridgeError, BridgeResult};
use crate::shape;

/// Global editor state shared between the executor and the view
#[derive(Default)]
pub struct EditorStore {
    snapshot: RwLock<Option<EditorSnapshot>>,
    failure: RwLock<Option<String>>,
}

impl EditorStore {
    /// Create an empty store
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a store holding `snapshot`
    pub fn with_snapshot(snapshot: EditorSnapshot) -> Arc<Self> {
        let store = Self::default();
        *store.snapshot.write() = Some(snapshot);
        Arc::new(store)
    }

    pub fn replace(&self, snapshot: EditorSnapshot) {
        *self.snapshot.write() = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<EditorSnapshot> {
        self.snapshot.read().clone()
    }

    /// Make every read fail with `reason` until cleared with `None`
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.write() = reason;
    }

    fn has_content(&self) -> bool {
        self.snapshot
            .read()
            .as_ref()
            .is_some_and(|s| !s.editor_containers.is_empty() || !s.editor_paragraphs.is_empty())
    }
}

impl EditorStateExtractor for EditorStore {
    fn editor_state_with_validation(&self) -> BridgeResult<Option<EditorSnapshot>> {
        if let Some(reason) = self.failure.read().clone() {
            return Err(BridgeError::Extractor(reason));
        }
        Ok(self.snapshot())
    }
}

/// Raw operation counters
#[derive(Debug, Clone, Default)]
struct OperationLog {
    total: u64,
    successful: u64,
    failed: u64,
    total_time_ms: f64,
    last_execution: Option<DateTime<Utc>>,
}

impl OperationLog {
    fn to_value(&self) -> Value {
        let average = if self.total == 0 {
            0.0
        } else {
            self.total_time_ms / self.total as f64
        };
        json!({
            "totalOperations": self.total,
            "successfulOperations": self.successful,
            "failedOperations": self.failed,
            "averageExecutionTime": average,
            "lastExecutionTime": self.last_execution.map(|t| t.to_rfc3339()),
        })
    }
}

#[derive(Default)]
struct ExecutorInner {
    config: BridgeConfiguration,
    external: Option<ExternalEditorData>,
    exported: Option<ExternalEditorData>,
    last_error: Option<String>,
    log: OperationLog,
}

/// Clears the executing flag when dropped
struct ExecutingGuard<'a>(&'a AtomicBool);

impl<'a> ExecutingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExecutingGuard(flag))
    }
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Executor transferring between external bundles and an [`EditorStore`]
pub struct LocalExecutor {
    store: Arc<EditorStore>,
    inner: Mutex<ExecutorInner>,
    is_executing: AtomicBool,
}

impl LocalExecutor {
    pub fn new(store: Arc<EditorStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(ExecutorInner::default()),
            is_executing: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<EditorStore> {
        &self.store
    }

    /// Bundle produced by the last reverse transfer
    pub fn exported(&self) -> Option<ExternalEditorData> {
        self.inner.lock().exported.clone()
    }

    async fn run<F>(&self, name: &'static str, op: F) -> BridgeResult<()>
    where
        F: FnOnce(&Self) -> BridgeResult<()> + Send,
    {
        let Some(_guard) = ExecutingGuard::acquire(&self.is_executing) else {
            return Err(BridgeError::Executor(format!(
                "{} rejected: another operation is running",
                name
            )));
        };

        let (timeout, debug_mode) = {
            let inner = self.inner.lock();
            (
                Duration::from_millis(inner.config.timeout_ms),
                inner.config.debug_mode,
            )
        };
        if debug_mode {
            info!("Starting {}", name);
        }

        let started = Instant::now();
        let work = async {
            tokio::task::yield_now().await;
            op(self)
        };
        let result = match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Executor(format!(
                "{} timed out after {}ms",
                name,
                timeout.as_millis()
            ))),
        };

        self.record(name, &result, started.elapsed());
        result
    }

    fn record(&self, name: &str, result: &BridgeResult<()>, elapsed: Duration) {
        let mut inner = self.inner.lock();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        inner.log.total += 1;
        inner.log.total_time_ms += elapsed_ms;
        inner.log.last_execution = Some(Utc::now());
        match result {
            Ok(()) => {
                inner.log.successful += 1;
                inner.last_error = None;
            }
            Err(e) => {
                inner.log.failed += 1;
                inner.last_error = Some(e.to_string());
                warn!("{} failed: {}", name, e);
            }
        }

        if inner.config.performance_logging {
            info!("{} took {:.2}ms", name, elapsed_ms);
        }
    }

    fn forward(&self) -> BridgeResult<()> {
        let external = self
            .inner
            .lock()
            .external
            .clone()
            .ok_or_else(|| BridgeError::Precondition("no external data to transfer".into()))?;

        let containers = external.valid_containers();
        let mut paragraphs = external.valid_paragraphs();
        if containers.is_empty() && paragraphs.is_empty() {
            return Err(BridgeError::Precondition(
                "external data has no valid entries".into(),
            ));
        }
        paragraphs.sort_by(|a, b| a.paragraph.order.total_cmp(&b.paragraph.order));

        let completed = paragraphs
            .iter()
            .filter(|p| p.is_assigned())
            .map(|p| p.paragraph.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let snapshot = EditorSnapshot {
            editor_containers: containers
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            editor_paragraphs: paragraphs
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            editor_completed_content: completed,
        };

        debug!(
            "Forward transfer: {} containers, {} paragraphs",
            snapshot.editor_containers.len(),
            snapshot.editor_paragraphs.len()
        );
        self.store.replace(snapshot);
        Ok(())
    }

    fn reverse(&self) -> BridgeResult<()> {
        let snapshot = self
            .store
            .snapshot()
            .ok_or_else(|| BridgeError::Precondition("editor store is empty".into()))?;

        let now = Utc::now();
        let containers = snapshot
            .editor_containers
            .iter()
            .filter(|c| shape::is_valid_container(c))
            .cloned()
            .collect();
        let paragraphs = snapshot
            .editor_paragraphs
            .iter()
            .filter_map(|p| match shape::parse_local_paragraph(p) {
                Ok(local) => Some(local),
                Err(_) => shape::parse_paragraph(p).ok().map(|paragraph| LocalParagraph {
                    paragraph,
                    created_at: now,
                    updated_at: now,
                }),
            })
            .map(|p| serde_json::to_value(&p))
            .collect::<Result<_, _>>()?;

        let exported = ExternalEditorData {
            local_containers: containers,
            local_paragraphs: paragraphs,
        };
        debug!(
            "Reverse transfer: {} containers, {} paragraphs",
            exported.local_containers.len(),
            exported.local_paragraphs.len()
        );
        self.inner.lock().exported = Some(exported);
        Ok(())
    }
}

impl BridgeExecutor for LocalExecutor {
    fn status(
        &self,
        config: &BridgeConfiguration,
        external: Option<&ExternalEditorData>,
    ) -> ExecutorStatus {
        let mut inner = self.inner.lock();
        inner.config = config.clone();
        inner.external = external.cloned();

        let is_executing = self.is_executing.load(Ordering::Acquire);
        let forward_ready = inner
            .external
            .as_ref()
            .is_some_and(|e| !e.valid_containers().is_empty() || !e.valid_paragraphs().is_empty());
        let reverse_ready = self.store.has_content();

        ExecutorStatus {
            is_executing,
            error_message: inner.last_error.clone(),
            can_execute_forward: forward_ready && !is_executing,
            can_execute_reverse: reverse_ready && !is_executing,
            can_execute_bidirectional: forward_ready && reverse_ready && !is_executing,
            has_external_data: inner.external.is_some(),
            metrics: inner.log.to_value(),
        }
    }

    fn execute_forward_transfer(&self) -> impl std::future::Future<Output = BridgeResult<()>> + Send {
        self.run("forward transfer", Self::forward)
    }

    fn execute_reverse_transfer(&self) -> impl std::future::Future<Output = BridgeResult<()>> + Send {
        self.run("reverse transfer", Self::reverse)
    }

    fn execute_bidirectional_sync(&self) -> impl std::future::Future<Output = BridgeResult<()>> + Send {
        self.run("bidirectional sync", |executor: &Self| {
            executor.forward()?;
            executor.reverse()
        })
    }

    fn reset_state(&self) -> BridgeResult<()> {
        if self.is_executing.load(Ordering::Acquire) {
            return Err(BridgeError::Executor(
                "cannot reset while an operation is running".into(),
            ));
        }
        let mut inner = self.inner.lock();
        inner.last_error = None;
        inner.exported = None;
        inner.log = OperationLog::default();
        info!("Executor state reset");
        Ok(())
    }

    fn refresh_external_data(&self, data: &ExternalEditorData) -> BridgeResult<()> {
        self.inner.lock().external = Some(data.clone());
        Ok(())
    }

    fn configuration(&self) -> Value {
        self.inner.lock().config.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::parse_external_data;

    fn external() -> ExternalEditorData {
        parse_external_data(&json!({
            "localContainers": [{"id": "c1", "name": "Intro", "order": 0}],
            "localParagraphs": [
                {
                    "id": "p2",
                    "content": "second",
                    "order": 1,
                    "containerId": "c1",
                    "createdAt": "2024-03-01T10:00:00Z",
                    "updatedAt": "2024-03-01T10:00:00Z",
                },
                {
                    "id": "p1",
                    "content": "first",
                    "order": 0,
                    "containerId": "c1",
                    "createdAt": "2024-03-01T10:00:00Z",
                    "updatedAt": "2024-03-01T10:00:00Z",
                },
                {"id": "broken"},
            ],
        }))
        .unwrap()
    }

    #[test]
    fn test_store_failure_mode() {
        let store = EditorStore::new();
        assert!(store.editor_state_with_validation().unwrap().is_none());

        store.set_failure(Some("locked".into()));
        assert!(store.editor_state_with_validation().is_err());

        store.set_failure(None);
        assert!(store.editor_state_with_validation().is_ok());
    }

    #[test]
    fn test_status_flags() {
        let executor = LocalExecutor::new(EditorStore::new());
        let config = BridgeConfiguration::default();

        let status = executor.status(&config, None);
        assert!(!status.has_external_data);
        assert!(!status.can_execute_forward);
        assert!(!status.can_execute_reverse);

        let data = external();
        let status = executor.status(&config, Some(&data));
        assert!(status.has_external_data);
        assert!(status.can_execute_forward);
        assert!(!status.can_execute_bidirectional);
        assert_eq!(status.metrics["totalOperations"], 0);
    }

    #[test]
    fn test_forward_transfer_fills_store() {
        let store = EditorStore::new();
        let executor = LocalExecutor::new(store.clone());
        executor.status(&BridgeConfiguration::default(), Some(&external()));

        tokio_test::block_on(executor.execute_forward_transfer()).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.editor_containers.len(), 1);
        assert_eq!(snapshot.editor_paragraphs.len(), 2);
        assert_eq!(snapshot.editor_paragraphs[0]["id"], "p1");
        assert_eq!(snapshot.editor_completed_content, "first\n\nsecond");

        let status = executor.status(&BridgeConfiguration::default(), Some(&external()));
        assert!(status.can_execute_reverse);
        assert_eq!(status.metrics["successfulOperations"], 1);
        assert!(status.error_message.is_none());
    }

    #[test]
    fn test_forward_without_external_records_failure() {
        let executor = LocalExecutor::new(EditorStore::new());
        executor.status(&BridgeConfiguration::default(), None);

        let result = tokio_test::block_on(executor.execute_forward_transfer());
        assert!(matches!(result, Err(BridgeError::Precondition(_))));

        let status = executor.status(&BridgeConfiguration::default(), None);
        assert!(status.error_message.unwrap().contains("no external data"));
        assert_eq!(status.metrics["failedOperations"], 1);
        assert!(!status.is_executing);
    }

    #[test]
    fn test_bidirectional_sync_exports_store() {
        let executor = LocalExecutor::new(EditorStore::new());
        executor.status(&BridgeConfiguration::default(), Some(&external()));

        tokio_test::block_on(executor.execute_bidirectional_sync()).unwrap();

        let exported = executor.exported().unwrap();
        assert_eq!(exported.local_containers.len(), 1);
        assert_eq!(exported.valid_paragraphs().len(), 2);
    }

    #[test]
    fn test_reverse_adds_missing_timestamps() {
        let store = EditorStore::with_snapshot(EditorSnapshot {
            editor_containers: vec![json!({"id": "c1", "name": "Intro", "order": 0})],
            editor_paragraphs: vec![
                json!({"id": "p1", "content": "x", "order": 0, "containerId": null}),
                json!(17),
            ],
            editor_completed_content: String::new(),
        });
        let executor = LocalExecutor::new(store);

        tokio_test::block_on(executor.execute_reverse_transfer()).unwrap();

        let exported = executor.exported().unwrap();
        assert_eq!(exported.local_paragraphs.len(), 1);
        assert!(shape::is_valid_local_paragraph(&exported.local_paragraphs[0]));
    }

    #[test]
    fn test_reset_clears_metrics_and_error() {
        let executor = LocalExecutor::new(EditorStore::new());
        executor.status(&BridgeConfiguration::default(), None);
        let _ = tokio_test::block_on(executor.execute_reverse_transfer());

        executor.reset_state().unwrap();

        let status = executor.status(&BridgeConfiguration::default(), None);
        assert!(status.error_message.is_none());
        assert_eq!(status.metrics["totalOperations"], 0);
    }

    #[test]
    fn test_configuration_reflects_last_status_call() {
        let executor = LocalExecutor::new(EditorStore::new());
        let mut config = BridgeConfiguration::default();
        config.timeout_ms = 750;
        executor.status(&config, None);

        assert_eq!(executor.configuration()["timeoutMs"], 750);
    }
}
