use thiserror::Error;

/// Errors surfaced by the endpoint loops and the dispatcher. Transport and
/// service-unknown failures are handled locally (the dispatcher just
/// retries); this enum exists for the failures that must reach `main`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("wire protocol error")]
    Wire(#[from] titanic_core::Error),

    #[error("malformed queue record at offset {0}")]
    MalformedQueueRecord(u64),

    #[error("request message is missing its target-service frame")]
    MissingServiceFrame,
}

pub type Result<T> = std::result::Result<T, Error>;
