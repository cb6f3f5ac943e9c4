//! # Blockpost Bridge
//!
//! Bridge layer between the blockpost editor store, an optional external
//! data bundle, and the status widgets. It validates untyped editor data,
//! grades its quality, extracts statistics, and derives one immutable
//! [`ViewState`] for presentational components.
//!
//! ## Architecture
//!
//! ```text
//! external data (untyped)        editor store (extractor)
//!          │                              │
//!          ▼                              ▼
//!     shape / quality ──────────▶ statistics
//!                                        │
//!     executor status ──▶ status ◀── validation
//!                           │
//!                           ▼
//!                 progress / metrics / props
//!                           │
//!                           ▼
//!                       ViewState
//! ```
//!
//! ## Usage
//!
//! 1. Implement [`EditorStateExtractor`] and [`BridgeExecutor`] (or use the
//!    in-memory [`EditorStore`] and [`LocalExecutor`])
//! 2. Wrap them in a [`BridgeView`]
//! 3. Call [`BridgeView::view_state`] whenever inputs change
//! 4. Route user actions through the handlers or [`BridgeView::dispatch`]

pub mod bridge;
pub mod calculator;
pub mod coerce;
pub mod config;
pub mod data;
pub mod error;
pub mod loader;
pub mod memo;
pub mod props;
pub mod quality;
pub mod refresh;
pub mod shape;
pub mod statistics;
pub mod status;
pub mod store;
pub mod view;

// Re-exports
pub use bridge::{BridgeExecutor, EditorStateExtractor, ExecutorStatus};
pub use calculator::{
    calculate_execution_metrics, calculate_progress_data, calculate_validation_state,
    ExecutionMetrics, ProgressData, ValidationState,
};
pub use coerce::Size;
pub use config::{normalize_configuration, BridgeConfiguration};
pub use data::{
    Container, DataSource, EditorSnapshot, EditorStatistics, ExternalEditorData, LocalParagraph,
    Paragraph,
};
pub use error::{BridgeError, BridgeResult};
pub use memo::Memo;
pub use props::{calculate_component_props, calculate_widget_props, ComponentProps, WidgetProps};
pub use quality::{analyze_external_data_quality, DataQuality};
pub use refresh::{Clock, ManualClock, MonotonicClock, RefreshLimiter};
pub use shape::ShapeError;
pub use statistics::extract_editor_statistics;
pub use status::{calculate_status_info, Severity, StatusColor, StatusIcon, UiStatusInfo};
pub use store::{EditorStore, LocalExecutor};
pub use view::{ActionOutcome, BridgeView, Capabilities, SkipReason, ViewState};

/// User actions the bridge can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Copy external data into the editor store
    ForwardTransfer,
    /// Export the editor store to the external shape
    ReverseTransfer,
    /// Forward then reverse
    BidirectionalSync,
    /// Clear executor error state and metrics
    Reset,
    /// Rate-limited UI refresh
    Refresh,
    /// Re-run validation on the next derivation
    Validate,
    /// Re-send the current external bundle to the executor
    RefreshExternal,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::ForwardTransfer,
        ActionKind::ReverseTransfer,
        ActionKind::BidirectionalSync,
        ActionKind::Reset,
        ActionKind::Refresh,
        ActionKind::Validate,
        ActionKind::RefreshExternal,
    ];

    /// Stable id used on the command line and in logs
    pub fn id(&self) -> &'static str {
        match self {
            ActionKind::ForwardTransfer => "forward",
            ActionKind::ReverseTransfer => "reverse",
            ActionKind::BidirectionalSync => "bidirectional",
            ActionKind::Reset => "reset",
            ActionKind::Refresh => "refresh",
            ActionKind::Validate => "validate",
            ActionKind::RefreshExternal => "refresh-external",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
