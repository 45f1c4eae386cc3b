// Copyright (c) 2026 rezky_nightky

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The terminal could not be switched into drawing mode.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(#[source] io::Error),

    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to open log file {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
