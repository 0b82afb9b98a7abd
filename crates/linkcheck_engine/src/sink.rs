use std::sync::mpsc;

use crate::{BatchEvent, RowId, Verdict};

/// Receives batch lifecycle events. Passed to the orchestrator and fetcher.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<BatchEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<BatchEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: BatchEvent) {}
}

/// Write-back target for finished batches, one call per row with a token.
pub trait ResultSink {
    type Error;

    fn write(&mut self, row_id: RowId, verdict: &Verdict) -> Result<(), Self::Error>;
}
