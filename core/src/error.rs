use thiserror::Error;

/// Generic `titanic-core` error: wire codec and disk I/O failures shared by the
/// broker and the three Titanic endpoints.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("malformed frame on the wire: {0}")]
    Malformed(String),

    #[error("communication error: {0}")]
    Communication(#[from] Communication),
}

/// Failures talking to the broker: either the transport itself, or the
/// broker refusing/timing out a request.
#[derive(Error, Debug)]
pub enum Communication {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("timed out waiting for a reply")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
