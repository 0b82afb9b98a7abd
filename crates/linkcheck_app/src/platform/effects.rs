use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use linkcheck_core::{Effect, Msg, VerdictKind};
use linkcheck_engine::{
    BatchError, BatchEvent, BatchHandle, BatchOutcome, BatchRunner, ChannelProgressSink,
    RowProgress, ValidationRequest, VerdictCategory,
};

/// Carries out [`Effect`]s against a single batch.
pub struct EffectRunner {
    pending: Option<(BatchRunner, Vec<ValidationRequest>)>,
    handle: Option<BatchHandle>,
    msg_tx: mpsc::Sender<Msg>,
    persist_requested: bool,
}

impl EffectRunner {
    pub fn new(
        runner: BatchRunner,
        requests: Vec<ValidationRequest>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        Self {
            pending: Some((runner, requests)),
            handle: None,
            msg_tx,
            persist_requested: false,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartBatch => self.start(),
                Effect::PauseBatch => {
                    engine_info!("Pause requested");
                    if let Some(handle) = &self.handle {
                        handle.pause();
                    }
                }
                Effect::ResumeBatch => {
                    engine_info!("Resume requested");
                    if let Some(handle) = &self.handle {
                        handle.resume();
                    }
                }
                Effect::StopBatch => {
                    engine_warn!("Stop requested; results of this run will be discarded");
                    if let Some(handle) = &self.handle {
                        handle.stop();
                    }
                }
                Effect::PersistResults => self.persist_requested = true,
            }
        }
    }

    /// Whether the finished batch should be written back.
    pub fn persist_requested(&self) -> bool {
        self.persist_requested
    }

    /// Wait for the worker. `None` when no batch was ever started.
    pub fn finish(&mut self) -> Option<Result<BatchOutcome, BatchError>> {
        self.handle.take().map(BatchHandle::join)
    }

    fn start(&mut self) {
        let Some((runner, requests)) = self.pending.take() else {
            engine_warn!("Start requested twice; ignored");
            return;
        };
        let (event_tx, event_rx) = mpsc::channel();
        self.handle = Some(BatchHandle::spawn(
            runner,
            requests,
            ChannelProgressSink::new(event_tx),
        ));
        spawn_event_loop(event_rx, self.msg_tx.clone());
    }
}

/// Forwards batch events as [`Msg`]s and logs each verdict. Ends when the
/// worker drops its sender.
fn spawn_event_loop(event_rx: mpsc::Receiver<BatchEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let mut ended = false;
        while let Ok(event) = event_rx.recv() {
            ended |= matches!(
                event,
                BatchEvent::Stopped { .. } | BatchEvent::Completed { .. }
            );
            if msg_tx.send(map_event(event)).is_err() {
                return;
            }
        }
        if !ended {
            let _ = msg_tx.send(Msg::BatchFailed {
                message: "batch worker ended without a result".to_string(),
            });
        }
    });
}

fn map_event(event: BatchEvent) -> Msg {
    match event {
        BatchEvent::Started { total } => {
            engine_info!("Validation started: {} rows", total);
            Msg::Tick
        }
        BatchEvent::RowStarted {
            index,
            total,
            row_id,
            display,
        } => Msg::RowStarted {
            index,
            total,
            row_id,
            display,
        },
        BatchEvent::RetryScheduled { url, attempt, .. } => Msg::RetryScheduled { url, attempt },
        BatchEvent::RowValidated(progress) => {
            log_verdict(&progress);
            let RowProgress {
                raw_value,
                index,
                total,
                verdict,
                row_id,
            } = progress;
            Msg::RowValidated {
                index,
                total,
                row_id,
                display: raw_value.display(),
                kind: map_category(verdict.category()),
                detail: verdict.detail(),
            }
        }
        BatchEvent::Paused { index } => {
            engine_info!("Paused before row {}", index);
            Msg::Tick
        }
        BatchEvent::Resumed { index } => {
            engine_info!("Resumed at row {}", index);
            Msg::Tick
        }
        BatchEvent::Stopped { processed, total } => {
            engine_warn!("Stopped after {}/{} rows", processed, total);
            Msg::BatchStopped { processed }
        }
        BatchEvent::Completed { .. } => Msg::BatchCompleted,
    }
}

fn log_verdict(progress: &RowProgress) {
    let RowProgress {
        raw_value,
        index,
        total,
        verdict,
        row_id,
    } = progress;
    let display = raw_value.display();
    match (verdict.category(), verdict.sheet_token()) {
        (VerdictCategory::Valid, Some(token)) => {
            engine_info!("[{}/{}] row {}: {} {} ({})", index, total, row_id, token, display, verdict)
        }
        (VerdictCategory::Review, Some(token)) => {
            engine_warn!("[{}/{}] row {}: {} {} ({})", index, total, row_id, token, display, verdict)
        }
        (VerdictCategory::Invalid, Some(token)) => {
            engine_error!("[{}/{}] row {}: {} {} ({})", index, total, row_id, token, display, verdict)
        }
        _ => engine_debug!("[{}/{}] row {}: skipped {} ({})", index, total, row_id, display, verdict),
    }
}

fn map_category(category: VerdictCategory) -> VerdictKind {
    match category {
        VerdictCategory::Valid => VerdictKind::Valid,
        VerdictCategory::Invalid => VerdictKind::Invalid,
        VerdictCategory::Review => VerdictKind::Review,
        VerdictCategory::Skipped => VerdictKind::Skipped,
    }
}
