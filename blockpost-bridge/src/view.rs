//! # View-State Orchestrator
//!
//! [`BridgeView`] composes validation, statistics, status and presentation
//! into one [`ViewState`] per derivation pass.
//!
//! ## Derivation Pass
//!
//! ```text
//! external data ──▶ parse ──▶ quality ─────────────────┐
//!                     │                                 ▼
//! custom config ──▶ normalize ──▶ executor.status ──▶ status ──▶ props
//!                     │                                 ▲
//!                     └──▶ statistics ──▶ validation ───┘
//! ```
//!
//! Every derived value is memoized on its own dependency key (see
//! [`Memo`](crate::memo::Memo)), so a pass with unchanged inputs recomputes
//! nothing.
//!
//! ## Actions
//!
//! Action handlers never fail. They are skipped when execution is not allowed
//! or already running, swallow errors from the executor, and request a
//! (rate-limited) refresh once the delegated operation has finished.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bridge::{BridgeExecutor, EditorStateExtractor, ExecutorStatus};
use crate::calculator::{
    calculate_execution_metrics, calculate_progress_data, calculate_validation_state,
    ExecutionMetrics, ProgressData, ValidationState,
};
use crate::config::{normalize_configuration, BridgeConfiguration};
use crate::data::{EditorStatistics, ExternalEditorData};
use crate::error::BridgeResult;
use crate::memo::Memo;
use crate::props::{calculate_component_props, calculate_widget_props, ComponentProps, WidgetProps};
use crate::quality::{analyze_external_data_quality, DataQuality, QUALITY_THRESHOLD};
use crate::refresh::{Clock, MonotonicClock, RefreshLimiter};
use crate::shape::parse_external_data;
use crate::statistics::extract_editor_statistics;
use crate::status::{calculate_status_info, plural, UiStatusInfo};
use crate::ActionKind;

/// Executor flags as seen by the widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub is_executing: bool,
    pub can_execute_forward: bool,
    pub can_execute_reverse: bool,
    pub can_execute_bidirectional: bool,
    pub has_external_data: bool,
}

impl From<&ExecutorStatus> for Capabilities {
    fn from(status: &ExecutorStatus) -> Self {
        Self {
            is_executing: status.is_executing,
            can_execute_forward: status.can_execute_forward,
            can_execute_reverse: status.can_execute_reverse,
            can_execute_bidirectional: status.can_execute_bidirectional,
            has_external_data: status.has_external_data,
        }
    }
}

/// Consolidated state consumed by presentational components
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub status: UiStatusInfo,
    pub progress: ProgressData,
    pub statistics: EditorStatistics,
    pub configuration: BridgeConfiguration,
    pub metrics: ExecutionMetrics,
    pub validation: ValidationState,
    pub external_quality: DataQuality,
    pub component_props: ComponentProps,
    pub widgets: WidgetProps,
    pub capabilities: Capabilities,
    pub refresh_counter: u32,
}

/// Why an action did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An operation is already in flight
    Busy,
    /// The executor does not allow this operation right now
    NotAllowed,
    /// A refresh was accepted less than the refresh window ago
    RateLimited,
    /// The supplied data failed structural validation
    InvalidInput,
}

/// Result of an action handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The operation was handed to the executor (it may still have failed)
    Dispatched,
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, ActionOutcome::Dispatched)
    }
}

/// How many times each derived value has been computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivationCounts {
    pub quality: u64,
    pub configuration: u64,
    pub statistics: u64,
    pub validation: u64,
    pub status: u64,
    pub progress: u64,
    pub metrics: u64,
    pub component_props: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum StatisticsKey {
    External(ExternalEditorData),
    Store(u32),
}

#[derive(Debug, Clone, PartialEq)]
struct StatusKey {
    is_executing: bool,
    error_message: Option<String>,
    can_execute_forward: bool,
    statistics: EditorStatistics,
    validation: ValidationState,
    has_external_data: bool,
}

#[derive(Default)]
struct DerivationCache {
    custom_config: Memo<Option<Value>, BridgeConfiguration>,
    quality: Memo<Option<ExternalEditorData>, DataQuality>,
    configuration: Memo<Value, BridgeConfiguration>,
    statistics: Memo<StatisticsKey, EditorStatistics>,
    validation: Memo<(EditorStatistics, Option<DataQuality>), ValidationState>,
    status: Memo<StatusKey, UiStatusInfo>,
    progress: Memo<EditorStatistics, ProgressData>,
    metrics: Memo<Value, ExecutionMetrics>,
    component_props: Memo<(UiStatusInfo, EditorStatistics), ComponentProps>,
    widgets: Memo<(UiStatusInfo, ComponentProps, ProgressData), WidgetProps>,
}

/// Inputs of the latest derivation, reused by action handlers
#[derive(Clone, Default)]
struct ViewInputs {
    config: BridgeConfiguration,
    external: Option<ExternalEditorData>,
}

/// Derives [`ViewState`] and dispatches bridge actions.
pub struct BridgeView<E, X, C = MonotonicClock> {
    executor: E,
    extractor: X,
    refresh: RefreshLimiter<C>,
    cache: Mutex<DerivationCache>,
    inputs: Mutex<ViewInputs>,
    in_flight: AtomicBool,
}

impl<E, X> BridgeView<E, X, MonotonicClock>
where
    E: BridgeExecutor,
    X: EditorStateExtractor,
{
    pub fn new(executor: E, extractor: X) -> Self {
        Self::with_clock(executor, extractor, MonotonicClock::new())
    }
}

impl<E, X, C> BridgeView<E, X, C>
where
    E: BridgeExecutor,
    X: EditorStateExtractor,
    C: Clock,
{
    pub fn with_clock(executor: E, extractor: X, clock: C) -> Self {
        Self {
            executor,
            extractor,
            refresh: RefreshLimiter::new(clock),
            cache: Mutex::new(DerivationCache::default()),
            inputs: Mutex::new(ViewInputs::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run one derivation pass.
    ///
    /// `external_data` that is null or structurally invalid is treated as
    /// absent and statistics fall back to the editor store.
    pub fn view_state(&self, custom_config: Option<&Value>, external_data: Option<&Value>) -> ViewState {
        let external = validated_external(external_data);
        let refresh_counter = self.refresh.counter();
        let mut cache = self.cache.lock();

        let external_quality = cache.quality.get_or_compute(external.clone(), |data| {
            data.as_ref()
                .map(analyze_external_data_quality)
                .unwrap_or_else(DataQuality::absent)
        });

        let requested_config = cache
            .custom_config
            .get_or_compute(custom_config.cloned(), |raw| normalize_configuration(raw.as_ref()));

        let executor_status = self.executor.status(&requested_config, external.as_ref());
        *self.inputs.lock() = ViewInputs {
            config: requested_config,
            external: external.clone(),
        };

        let configuration = cache
            .configuration
            .get_or_compute(self.executor.configuration(), |raw| {
                normalize_configuration(Some(raw))
            });

        let statistics_key = match &external {
            Some(data) => StatisticsKey::External(data.clone()),
            None => StatisticsKey::Store(refresh_counter),
        };
        let statistics = cache.statistics.get_or_compute(statistics_key, |key| match key {
            StatisticsKey::External(data) => extract_editor_statistics(Some(data), &self.extractor),
            StatisticsKey::Store(_) => extract_editor_statistics(None, &self.extractor),
        });

        let validation_key = (
            statistics.clone(),
            external.is_some().then(|| external_quality.clone()),
        );
        let validation = cache
            .validation
            .get_or_compute(validation_key, |(stats, quality)| {
                derive_validation(stats, quality.as_ref())
            });

        let status_key = StatusKey {
            is_executing: executor_status.is_executing,
            error_message: executor_status.error_message.clone(),
            can_execute_forward: executor_status.can_execute_forward,
            statistics: statistics.clone(),
            validation: validation.clone(),
            has_external_data: executor_status.has_external_data,
        };
        let status = cache.status.get_or_compute(status_key, |key| {
            calculate_status_info(
                key.is_executing,
                key.error_message.as_deref(),
                key.can_execute_forward,
                &key.statistics,
                &key.validation,
                key.has_external_data,
            )
        });

        let progress = cache
            .progress
            .get_or_compute(statistics.clone(), calculate_progress_data);

        let metrics = cache
            .metrics
            .get_or_compute(executor_status.metrics.clone(), calculate_execution_metrics);

        let component_props = cache
            .component_props
            .get_or_compute((status.clone(), statistics.clone()), |(status, stats)| {
                calculate_component_props(status, stats)
            });

        let widgets = cache.widgets.get_or_compute(
            (status.clone(), component_props.clone(), progress.clone()),
            |(status, component, progress)| calculate_widget_props(status, component, progress),
        );

        ViewState {
            status,
            progress,
            statistics,
            configuration,
            metrics,
            validation,
            external_quality,
            component_props,
            widgets,
            capabilities: Capabilities::from(&executor_status),
            refresh_counter,
        }
    }

    pub fn derivation_counts(&self) -> DerivationCounts {
        let cache = self.cache.lock();
        DerivationCounts {
            quality: cache.quality.computations(),
            configuration: cache.configuration.computations(),
            statistics: cache.statistics.computations(),
            validation: cache.validation.computations(),
            status: cache.status.computations(),
            progress: cache.progress.computations(),
            metrics: cache.metrics.computations(),
            component_props: cache.component_props.computations(),
        }
    }

    /// Current rate-limited refresh counter
    pub fn refresh_counter(&self) -> u32 {
        self.refresh.counter()
    }

    /// Request a UI refresh, dropped when inside the rate-limit window
    pub fn refresh(&self) -> ActionOutcome {
        if self.refresh.trigger() {
            debug!("UI refresh accepted ({})", self.refresh.counter());
            ActionOutcome::Dispatched
        } else {
            ActionOutcome::Skipped(SkipReason::RateLimited)
        }
    }

    pub async fn forward_transfer(&self) -> ActionOutcome {
        self.dispatch_transfer(
            ActionKind::ForwardTransfer,
            |status| status.can_execute_forward,
            || self.executor.execute_forward_transfer(),
        )
        .await
    }

    pub async fn reverse_transfer(&self) -> ActionOutcome {
        self.dispatch_transfer(
            ActionKind::ReverseTransfer,
            |status| status.can_execute_reverse,
            || self.executor.execute_reverse_transfer(),
        )
        .await
    }

    pub async fn bidirectional_sync(&self) -> ActionOutcome {
        self.dispatch_transfer(
            ActionKind::BidirectionalSync,
            |status| status.can_execute_bidirectional,
            || self.executor.execute_bidirectional_sync(),
        )
        .await
    }

    pub fn reset(&self) -> ActionOutcome {
        if self.is_busy() {
            return ActionOutcome::Skipped(SkipReason::Busy);
        }
        if let Err(e) = self.executor.reset_state() {
            warn!("Reset failed: {}", e);
        }
        self.refresh();
        ActionOutcome::Dispatched
    }

    /// Drop cached validation so the next pass re-validates
    pub fn validate(&self) -> ActionOutcome {
        if self.is_busy() {
            return ActionOutcome::Skipped(SkipReason::Busy);
        }
        {
            let mut cache = self.cache.lock();
            cache.quality.invalidate();
            cache.validation.invalidate();
        }
        self.refresh();
        ActionOutcome::Dispatched
    }

    /// Hand new external data to the executor
    pub fn refresh_external_data(&self, data: &Value) -> ActionOutcome {
        let Some(external) = validated_external(Some(data)) else {
            return ActionOutcome::Skipped(SkipReason::InvalidInput);
        };
        self.push_external(&external)
    }

    /// Run an action by kind. External refresh re-sends the last valid bundle.
    pub async fn dispatch(&self, kind: ActionKind) -> ActionOutcome {
        match kind {
            ActionKind::ForwardTransfer => self.forward_transfer().await,
            ActionKind::ReverseTransfer => self.reverse_transfer().await,
            ActionKind::BidirectionalSync => self.bidirectional_sync().await,
            ActionKind::Reset => self.reset(),
            ActionKind::Refresh => self.refresh(),
            ActionKind::Validate => self.validate(),
            ActionKind::RefreshExternal => {
                let external = self.inputs.lock().external.clone();
                match external {
                    Some(external) => self.push_external(&external),
                    None => ActionOutcome::Skipped(SkipReason::InvalidInput),
                }
            }
        }
    }

    fn push_external(&self, external: &ExternalEditorData) -> ActionOutcome {
        if self.is_busy() {
            return ActionOutcome::Skipped(SkipReason::Busy);
        }
        // Later status calls must hand the executor this bundle, not the stale one
        self.inputs.lock().external = Some(external.clone());
        if let Err(e) = self.executor.refresh_external_data(external) {
            warn!("External data refresh failed: {}", e);
        }
        self.refresh();
        ActionOutcome::Dispatched
    }

    fn current_status(&self) -> ExecutorStatus {
        let inputs = self.inputs.lock().clone();
        self.executor.status(&inputs.config, inputs.external.as_ref())
    }

    fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) || self.current_status().is_executing
    }

    async fn dispatch_transfer<F, Fut>(
        &self,
        kind: ActionKind,
        allowed: fn(&ExecutorStatus) -> bool,
        operation: F,
    ) -> ActionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BridgeResult<()>>,
    {
        let status = self.current_status();
        if status.is_executing {
            debug!("Skipping {}: executor busy", kind.id());
            return ActionOutcome::Skipped(SkipReason::Busy);
        }
        if !allowed(&status) {
            debug!("Skipping {}: not allowed", kind.id());
            return ActionOutcome::Skipped(SkipReason::NotAllowed);
        }
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Skipping {}: another action in flight", kind.id());
            return ActionOutcome::Skipped(SkipReason::Busy);
        };

        info!("Running {}", kind.id());
        if let Err(e) = operation().await {
            warn!("{} failed: {}", kind.id(), e);
        }
        drop(guard);

        self.refresh();
        ActionOutcome::Dispatched
    }
}

/// Clears the in-flight flag when dropped, including when the handler
/// future is dropped mid-transfer
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn validated_external(data: Option<&Value>) -> Option<ExternalEditorData> {
    let value = data.filter(|v| !v.is_null())?;
    match parse_external_data(value) {
        Ok(external) => Some(external),
        Err(e) => {
            debug!("Ignoring external data: {}", e);
            None
        }
    }
}

/// Error, warning and info messages for the current statistics and quality
fn derive_validation(stats: &EditorStatistics, quality: Option<&DataQuality>) -> ValidationState {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    if stats.paragraph_count > 0 && stats.container_count == 0 {
        errors.push(format!(
            "{} paragraph{} but no containers to assign {} to",
            stats.paragraph_count,
            plural(stats.paragraph_count),
            if stats.paragraph_count == 1 { "it" } else { "them" }
        ));
    }
    if let Some(quality) = quality {
        if quality.quality_score < QUALITY_THRESHOLD {
            errors.push(format!(
                "External data quality is {}% (minimum {}%)",
                quality.quality_score, QUALITY_THRESHOLD
            ));
        }
        warnings.extend(quality.issues.iter().cloned());
    }

    if stats.has_unassigned_content {
        warnings.push(format!(
            "{} paragraph{} not assigned to a container",
            stats.unassigned_paragraph_count,
            plural(stats.unassigned_paragraph_count)
        ));
    }
    if stats.paragraph_count == 0 {
        warnings.push("No paragraphs to transfer".to_string());
    }

    if stats.container_count > 0 {
        infos.push(format!(
            "{} container{} ready",
            stats.container_count,
            plural(stats.container_count)
        ));
    }
    if stats.paragraph_count > 0 {
        infos.push(format!(
            "{} paragraph{} ready",
            stats.paragraph_count,
            plural(stats.paragraph_count)
        ));
    }
    if stats.assigned_paragraph_count > 0 {
        infos.push(format!(
            "{} paragraph{} assigned",
            stats.assigned_paragraph_count,
            plural(stats.assigned_paragraph_count)
        ));
    }
    if stats.total_content_length > 0 {
        infos.push(format!(
            "{} character{} of content",
            stats.total_content_length,
            plural(stats.total_content_length)
        ));
    }

    calculate_validation_state(&errors, &warnings, &infos)
}
