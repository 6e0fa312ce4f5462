use std::io;

use thiserror::Error;

/// Errors the prober can report. Nothing here is fatal to a [`crate::session::Session`]:
/// every operation leaves it in a well-defined state that can be reset and rebound.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("device not bound")]
    NoDevice,

    #[error("value store is full")]
    ValueStoreFull,

    #[error("value name too long: {0:?}")]
    NameTooLong(&'static str),

    #[error("requested byte range out of bounds: off={off} len={len}")]
    OutOfBounds { off: u64, len: usize },
}

pub type Result<T> = std::result::Result<T, ProbeError>;
