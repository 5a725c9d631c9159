// src/events.rs
//! Stage-result events.
//!
//! Each pipeline stage reports an explicit event instead of printing
//! progress markers; whatever needs progress subscribes to a channel and
//! consumes events, no console parsing. The pure kernel never emits —
//! only the orchestrator does.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Pipeline stages, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classified,
    Extracted,
    Consolidated,
    Clustered,
    SuggesterQueried,
    Scored,
}

/// One stage result. `category` is None for whole-batch stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StageEvent {
    pub stage: Stage,
    pub category: Option<String>,
    /// Items entering the stage.
    pub items_in: usize,
    /// Items surviving the stage.
    pub items_out: usize,
    /// Unix seconds.
    pub ts_unix: u64,
}

impl StageEvent {
    pub fn now(stage: Stage, category: Option<String>, items_in: usize, items_out: usize) -> Self {
        Self {
            stage,
            category,
            items_in,
            items_out,
            ts_unix: chrono::Utc::now().timestamp().max(0) as u64,
        }
    }
}

/// Event consumer seam. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StageEvent);
}

/// Default sink: events only reach the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, event: StageEvent) {
        debug!(stage = ?event.stage, category = ?event.category,
               items_in = event.items_in, items_out = event.items_out, "stage event");
    }
}

/// Queue-backed sink for live progress consumers. A closed receiver is
/// tolerated: progress reporting must never fail a run.
pub struct ChannelSink {
    tx: UnboundedSender<StageEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<StageEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: StageEvent) {
        let _ = self.tx.send(event);
    }
}
