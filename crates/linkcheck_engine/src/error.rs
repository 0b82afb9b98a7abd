use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid request header {0:?}")]
    InvalidHeader(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no rows to process")]
    NoRows,
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("batch worker panicked")]
    WorkerPanicked,
}
