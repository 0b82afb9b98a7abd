/// Side effects requested by [`crate::update`]; the shell carries them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartBatch,
    PauseBatch,
    ResumeBatch,
    StopBatch,
    /// Write the finished batch back to the sheet.
    PersistResults,
}
