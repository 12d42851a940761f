use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("wire protocol error")]
    Wire(#[from] titanic_core::Error),

    #[error("connection sent an empty first message")]
    EmptyHandshake,

    #[error("unrecognized connection tag '{0}'")]
    UnknownTag(String),
}
