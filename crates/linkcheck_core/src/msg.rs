use crate::VerdictKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Rows were read from the sheet and are ready to validate.
    RowsLoaded { total: usize },
    /// User asked to start the batch.
    StartClicked,
    /// User toggled pause/resume.
    PauseToggled,
    /// User asked to stop; results are discarded.
    StopClicked,
    /// Worker began a row.
    RowStarted {
        index: usize,
        total: usize,
        row_id: u32,
        display: String,
    },
    /// Worker is about to retry a transport failure.
    RetryScheduled { url: String, attempt: u32 },
    /// Worker finished a row.
    RowValidated {
        index: usize,
        total: usize,
        row_id: u32,
        display: String,
        kind: VerdictKind,
        detail: String,
    },
    /// Worker honoured a stop request.
    BatchStopped { processed: usize },
    /// Worker validated every row.
    BatchCompleted,
    /// Worker ended with an error.
    BatchFailed { message: String },
    /// Render tick.
    Tick,
    NoOp,
}
