use std::sync::Arc;
use std::thread;

use crate::batch::{BatchControl, BatchOutcome, BatchRunner};
use crate::sink::ProgressSink;
use crate::{BatchError, ValidationRequest};

/// A batch running on its own worker thread with its own tokio runtime.
pub struct BatchHandle {
    control: Arc<BatchControl>,
    worker: thread::JoinHandle<Result<BatchOutcome, BatchError>>,
}

impl BatchHandle {
    pub fn spawn<S>(runner: BatchRunner, requests: Vec<ValidationRequest>, sink: S) -> Self
    where
        S: ProgressSink + 'static,
    {
        let control = Arc::new(BatchControl::new());
        let worker_control = control.clone();

        let worker = thread::spawn(move || -> Result<BatchOutcome, BatchError> {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(runner.run(requests, &worker_control, &sink))
        });

        Self { control, worker }
    }

    pub fn control(&self) -> Arc<BatchControl> {
        self.control.clone()
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn stop(&self) {
        self.control.request_stop();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and take its outcome.
    pub fn join(self) -> Result<BatchOutcome, BatchError> {
        self.worker
            .join()
            .map_err(|_| BatchError::WorkerPanicked)?
    }
}
