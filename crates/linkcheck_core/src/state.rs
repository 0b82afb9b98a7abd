use crate::view_model::{truncate_display, AppViewModel, DISPLAY_LIMIT};

/// Batch session lifecycle as seen by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Paused,
    /// Stop requested; waiting for the worker to reach a row boundary.
    Stopping,
    Finished,
    Cancelled,
}

impl SessionState {
    /// A worker exists for the session.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionState::Running | SessionState::Paused | SessionState::Stopping
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Stopping => "stopping",
            SessionState::Finished => "finished",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Verdict category, mirrored here so the core stays free of engine types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    Valid,
    Invalid,
    Review,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub valid: usize,
    pub invalid: usize,
    pub review: usize,
    pub skipped: usize,
}

impl Tally {
    pub fn record(&mut self, kind: VerdictKind) {
        match kind {
            VerdictKind::Valid => self.valid += 1,
            VerdictKind::Invalid => self.invalid += 1,
            VerdictKind::Review => self.review += 1,
            VerdictKind::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.review + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRow {
    pub index: usize,
    pub total: usize,
    pub row_id: u32,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    total_rows: usize,
    processed: usize,
    current: Option<CurrentRow>,
    tally: Tally,
    last_detail: Option<String>,
    retries: usize,
    error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn view(&self) -> AppViewModel {
        let percent = if self.total_rows == 0 {
            0
        } else {
            (self.processed * 100 / self.total_rows).min(100) as u8
        };
        AppViewModel {
            session: self.session,
            total_rows: self.total_rows,
            processed: self.processed,
            percent,
            tally: self.tally,
            current_line: self.current.as_ref().map(|row| {
                format!(
                    "[{}/{}] row {}: {}",
                    row.index,
                    row.total,
                    row.row_id,
                    truncate_display(&row.display, DISPLAY_LIMIT)
                )
            }),
            last_detail: self.last_detail.clone(),
            retries: self.retries,
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.mark_dirty();
    }

    pub(crate) fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        if self.session != next {
            self.session = next;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_row(&mut self, row: CurrentRow) {
        self.total_rows = row.total;
        self.current = Some(row);
        self.mark_dirty();
    }

    pub(crate) fn note_retry(&mut self) {
        self.retries += 1;
        self.mark_dirty();
    }

    pub(crate) fn finish_row(&mut self, index: usize, kind: VerdictKind, detail: String) {
        self.processed = index;
        self.tally.record(kind);
        self.last_detail = Some(detail);
        self.current = None;
        self.mark_dirty();
    }

    pub(crate) fn end(&mut self, next: SessionState, error: Option<String>) {
        self.current = None;
        self.error = error;
        self.transition(next);
        self.mark_dirty();
    }
}
