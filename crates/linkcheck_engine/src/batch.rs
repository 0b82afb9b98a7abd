use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use engine_logging::{engine_info, engine_warn};

use crate::config::Clock;
use crate::engine::ValidationEngine;
use crate::sink::{ProgressSink, ResultSink};
use crate::{
    BatchError, BatchEvent, EngineConfig, RowProgress, RowVerdict, ValidationRequest,
    VerdictCounts,
};

/// Stop and pause flags shared between the control surface and the worker.
///
/// Both flags use `SeqCst`; the worker reads them at row boundaries only, so a
/// late write costs at most one extra row.
#[derive(Debug, Default)]
pub struct BatchControl {
    stop: AtomicBool,
    pause: AtomicBool,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.pause.store(false, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }
}

/// Result of a batch that ran to the end; the only thing that may be written back.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub counts: VerdictCounts,
    pub verdicts: Vec<RowVerdict>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Hand each row with a sheet token to `sink`, in row order. Returns the
    /// number of writes.
    pub fn write_back<S>(&self, sink: &mut S) -> Result<usize, S::Error>
    where
        S: ResultSink + ?Sized,
    {
        let mut written = 0;
        for row in &self.verdicts {
            if row.verdict.sheet_token().is_none() {
                continue;
            }
            sink.write(row.row_id, &row.verdict)?;
            written += 1;
        }
        Ok(written)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Completed(BatchReport),
    /// Abandoned by the user. `processed` is informational only and is never
    /// written back.
    Stopped {
        processed: Vec<RowVerdict>,
        total: usize,
    },
}

impl BatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BatchOutcome::Completed(_))
    }

    pub fn processed(&self) -> &[RowVerdict] {
        match self {
            BatchOutcome::Completed(report) => &report.verdicts,
            BatchOutcome::Stopped { processed, .. } => processed,
        }
    }

    /// Writes a completed batch; a stopped batch writes nothing.
    pub fn write_back<S>(&self, sink: &mut S) -> Result<usize, S::Error>
    where
        S: ResultSink + ?Sized,
    {
        match self {
            BatchOutcome::Completed(report) => report.write_back(sink),
            BatchOutcome::Stopped { .. } => Ok(0),
        }
    }
}

/// Runs requests through a [`ValidationEngine`] strictly one at a time.
pub struct BatchRunner {
    engine: ValidationEngine,
    pause_poll_interval: Duration,
    checked_at: Clock,
}

impl BatchRunner {
    pub fn new(engine: ValidationEngine, config: &EngineConfig) -> Self {
        Self {
            engine,
            pause_poll_interval: config.pause_poll_interval,
            checked_at: config.checked_at.clone(),
        }
    }

    pub async fn run(
        &self,
        requests: Vec<ValidationRequest>,
        control: &BatchControl,
        sink: &dyn ProgressSink,
    ) -> Result<BatchOutcome, BatchError> {
        if requests.is_empty() {
            return Err(BatchError::NoRows);
        }

        let total = requests.len();
        let started = Instant::now();
        let mut counts = VerdictCounts::default();
        let mut verdicts = Vec::with_capacity(total);

        engine_info!(
            "Validating {} rows, delay {:?} between requests",
            total,
            self.engine.request_delay()
        );
        sink.emit(BatchEvent::Started { total });

        for (offset, request) in requests.into_iter().enumerate() {
            let index = offset + 1;
            if control.is_stop_requested() || !self.wait_while_paused(index, control, sink).await
            {
                engine_warn!(
                    "Batch stopped by user after {}/{} rows; results discarded",
                    verdicts.len(),
                    total
                );
                sink.emit(BatchEvent::Stopped {
                    processed: verdicts.len(),
                    total,
                });
                return Ok(BatchOutcome::Stopped {
                    processed: verdicts,
                    total,
                });
            }

            let ValidationRequest { row_id, raw_value } = request;
            sink.emit(BatchEvent::RowStarted {
                index,
                total,
                row_id,
                display: raw_value.display(),
            });

            let verdict = self.engine.validate(&raw_value, sink).await;
            counts.record(&verdict);

            sink.emit(BatchEvent::RowValidated(RowProgress {
                raw_value: raw_value.clone(),
                index,
                total,
                verdict: verdict.clone(),
                row_id,
            }));
            verdicts.push(RowVerdict {
                row_id,
                raw_value,
                verdict,
                checked_at: (self.checked_at)(),
            });
        }

        sink.emit(BatchEvent::Completed { counts });
        Ok(BatchOutcome::Completed(BatchReport {
            counts,
            verdicts,
            elapsed: started.elapsed(),
        }))
    }

    /// Blocks while paused, polling every `pause_poll_interval`. Returns
    /// `false` when a stop arrives during the wait.
    async fn wait_while_paused(
        &self,
        index: usize,
        control: &BatchControl,
        sink: &dyn ProgressSink,
    ) -> bool {
        if !control.is_paused() {
            return true;
        }

        engine_info!("Batch paused before row {}", index);
        sink.emit(BatchEvent::Paused { index });
        while control.is_paused() {
            if control.is_stop_requested() {
                return false;
            }
            tokio::time::sleep(self.pause_poll_interval).await;
        }
        if control.is_stop_requested() {
            return false;
        }

        engine_info!("Batch resumed at row {}", index);
        sink.emit(BatchEvent::Resumed { index });
        true
    }
}
