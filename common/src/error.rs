//! Error taxonomy.
//!
//! Per-endpoint network failures are not errors here: they travel as
//! [`FailureReason`](crate::scanning::FailureReason) data inside a probe outcome.
//! Only malformed input lines, invalid options, setup problems and write
//! failures are modelled as error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single input line could not be turned into an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line is empty")]
    Empty,
    #[error("host is empty")]
    EmptyHost,
    #[error("invalid host '{0}'")]
    InvalidHost(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("unterminated IPv6 literal '{0}'")]
    UnterminatedBracket(String),
}

/// A [`ScanConfig`](crate::config::ScanConfig) option outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("confirmation attempts must be between 1 and {max}, got {got}")]
    AttemptsOutOfRange { got: u32, max: u32 },
    #[error("default port must be between 1 and 65535")]
    ZeroPort,
}

/// Run-aborting failures.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read input file {}: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot prepare output directory {}: {source}", path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

/// A single output file that could not be written.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct WriteFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
