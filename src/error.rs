//! Error types.
//!
//! Rendering itself is infallible: diff writes degrade silently at the I/O
//! boundary. Errors surface only from terminal setup/teardown and from
//! configuration.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("unrecognized color: {0:?}")]
    Color(String),
}

pub type Result<T> = std::result::Result<T, Error>;
