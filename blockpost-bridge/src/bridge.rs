//! # Collaborator Traits
//!
//! The bridge derives view-state from two collaborators it does not own:
//!
//! | Trait | Provides |
//! |-------|----------|
//! | [`EditorStateExtractor`] | Raw snapshot of the editor store |
//! | [`BridgeExecutor`] | Execution flags, raw metrics, transfer operations |
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ Editor store     │────▶│  BridgeView     │────▶│ ViewState       │
//! │ (extractor)      │     │  (derivation)   │     │ (widgets read)  │
//! └──────────────────┘     └─────────────────┘     └─────────────────┘
//!                                  ▲   │
//!                                  │   ▼
//!                          ┌─────────────────┐
//!                          │ BridgeExecutor  │
//!                          │ (transfers)     │
//!                          └─────────────────┘
//! ```
//!
//! ## Failure Contract
//!
//! Collaborators report failure through [`BridgeResult`]. The bridge never
//! propagates these errors: extraction failures degrade to empty statistics,
//! operation failures surface on the next [`ExecutorStatus::error_message`].

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::config::BridgeConfiguration;
use crate::data::{EditorSnapshot, ExternalEditorData};
use crate::error::BridgeResult;

/// Reads the current editor state.
pub trait EditorStateExtractor: Send + Sync {
    /// Snapshot of the editor store, `Ok(None)` when no state exists yet
    fn editor_state_with_validation(&self) -> BridgeResult<Option<EditorSnapshot>>;
}

/// Flags and raw metrics reported by a [`BridgeExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorStatus {
    pub is_executing: bool,
    /// Error from the most recent failed operation
    pub error_message: Option<String>,
    pub can_execute_forward: bool,
    pub can_execute_reverse: bool,
    pub can_execute_bidirectional: bool,
    pub has_external_data: bool,
    /// Untyped metrics record, normalized by the calculator
    pub metrics: Value,
}

impl Default for ExecutorStatus {
    fn default() -> Self {
        Self {
            is_executing: false,
            error_message: None,
            can_execute_forward: false,
            can_execute_reverse: false,
            can_execute_bidirectional: false,
            has_external_data: false,
            metrics: Value::Null,
        }
    }
}

/// Executes transfers between the external data, the store and the preview.
///
/// # Implementation Notes
///
/// - [`status`](Self::status) is called once per derivation with the current
///   inputs; implementations may keep them for the next operation
/// - Transfer operations may fail; the bridge logs and swallows the error
/// - The bridge never runs two transfers at once
///
/// # Example
///
/// ```rust,ignore
/// struct NullExecutor;
///
/// impl BridgeExecutor for NullExecutor {
///     fn status(&self, _: &BridgeConfiguration, _: Option<&ExternalEditorData>) -> ExecutorStatus {
///         ExecutorStatus::default()
///     }
///     async fn execute_forward_transfer(&self) -> BridgeResult<()> { Ok(()) }
///     // ... other methods
/// }
/// ```
pub trait BridgeExecutor: Send + Sync {
    /// Report flags and metrics for the given inputs
    fn status(
        &self,
        config: &BridgeConfiguration,
        external: Option<&ExternalEditorData>,
    ) -> ExecutorStatus;

    /// Copy external data into the editor store
    fn execute_forward_transfer(&self) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Copy the editor store back out to the external shape
    fn execute_reverse_transfer(&self) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Run forward and reverse transfers in sequence
    fn execute_bidirectional_sync(&self) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Clear error state and metrics
    fn reset_state(&self) -> BridgeResult<()>;

    /// Replace the external data the executor works with
    fn refresh_external_data(&self, data: &ExternalEditorData) -> BridgeResult<()>;

    /// Raw configuration as the executor currently applies it
    fn configuration(&self) -> Value;
}

impl<T: EditorStateExtractor + ?Sized> EditorStateExtractor for Arc<T> {
    fn editor_state_with_validation(&self) -> BridgeResult<Option<EditorSnapshot>> {
        (**self).editor_state_with_validation()
    }
}

impl<T: BridgeExecutor> BridgeExecutor for Arc<T> {
    fn status(
        &self,
        config: &BridgeConfiguration,
        external: Option<&ExternalEditorData>,
    ) -> ExecutorStatus {
        (**self).status(config, external)
    }

    fn execute_forward_transfer(&self) -> impl Future<Output = BridgeResult<()>> + Send {
        (**self).execute_forward_transfer()
    }

    fn execute_reverse_transfer(&self) -> impl Future<Output = BridgeResult<()>> + Send {
        (**self).execute_reverse_transfer()
    }

    fn execute_bidirectional_sync(&self) -> impl Future<Output = BridgeResult<()>> + Send {
        (**self).execute_bidirectional_sync()
    }

    fn reset_state(&self) -> BridgeResult<()> {
        (**self).reset_state()
    }

    fn refresh_external_data(&self, data: &ExternalEditorData) -> BridgeResult<()> {
        (**self).refresh_external_data(data)
    }

    fn configuration(&self) -> Value {
        (**self).configuration()
    }
}
