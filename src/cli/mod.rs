//! CLI support for formula-lang
//!
//! Provides programmatic access to the `formula` commands for embedding in
//! other tools (rule editors, catalog validators).

mod check;
mod convert;
mod docs;

pub use check::{execute_check, execute_tokens, CheckOptions, CheckResult};
pub use convert::expr_to_json;
pub use docs::{get_doc_category, get_docs_overview, get_docs_reference, DocCategory};

use std::io;

use crate::catalog::CatalogError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parser error
    Parse(crate::ParseError),
    /// Environment catalog error
    Catalog(CatalogError),
    /// JSON rendering error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "{}", e),
            CliError::Catalog(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No expression provided. Pass it as an argument or pipe it to stdin."),
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'formula docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::LexError> for CliError {
    fn from(e: crate::LexError) -> Self {
        CliError::Parse(e.into())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
