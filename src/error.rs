//! Error types for the DEEPN library.

use thiserror::Error;

/// Errors that can occur during junction search and hit classification.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A parse error occurred while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),

    /// A file format error was detected.
    #[error("{0}")]
    Format(String),

    /// A read contained a symbol outside {A, C, G, T, N} while building its
    /// reverse complement. Fatal for that read only.
    #[error("undefined base '{symbol}' at offset {offset}")]
    UndefinedBase { symbol: char, offset: usize },

    /// Search results reference accessions that the gene list does not contain.
    #[error("{} accession(s) missing from gene list: {}", .0.len(), .0.join(", "))]
    UnknownAccessions(Vec<String>),
}
