use std::io;

use orders::wire::WireError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid town size {0}x{1}")]
    InvalidTown(i32, i32),
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
