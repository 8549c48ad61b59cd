//! Error types for normalizer construction and base-time parsing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("invalid grammar pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("cannot read grammar file {path}: {source}")]
    GrammarIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base time '{0}', expected YYYY-MM-DD-HH-mm-ss")]
    BaseTime(String),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
