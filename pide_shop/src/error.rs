//! Errors of the shop.
//!
//! Only `ShopError` is fatal, and only at startup. Everything that goes wrong with a
//! single order is contained in the worker handling it and ends in that order's cancellation.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
    #[error("failed to open log file '{}': {source}", path.display())]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why an order was not taken
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("maximum of {0} orders reached, cannot accept new order")]
    CapacityExhausted(usize),
    #[error("the shop is closing, no more orders")]
    ShuttingDown,
}
