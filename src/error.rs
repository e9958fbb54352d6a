//! Error types.
//!
//! Matching itself never fails. Errors come from the edges: reading input,
//! writing the journal, setting up instrumentation.

use std::io;

use thiserror::Error;

/// A line that does not follow `<trader> <B|S> <qty> <price>`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid {field} `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unknown side `{0}`")]
    UnknownSide(String),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to create latency histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    #[error("failed to install log subscriber: {0}")]
    Logging(String),

    #[error("journal writer thread panicked")]
    JournalThread,

    #[error("order feed thread panicked")]
    FeedThread,
}

pub type Result<T> = std::result::Result<T, Error>;
