//! Lowering and loading errors

use std::path::PathBuf;
use thiserror::Error;

pub type LowerResult<T> = Result<T, LowerError>;

/// Errors that abort a lowering run.
///
/// Descriptions are expected to be validated before lowering, so all of these
/// point at either a registry defect or an unvalidated description.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LowerError {
    #[error("Internal compiler error: type {type_name} can't be a bitfield")]
    NotBitfield { type_name: String },

    #[error("Struct {name} is used but not declared")]
    UnknownStruct { name: String },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Bad arguments for type {name}: {reason}")]
    BadTypeArgs { name: String, reason: String },

    #[error("Resource {name} has a cyclic base chain")]
    ResourceCycle { name: String },
}

impl LowerError {
    pub(crate) fn bad_args(name: &str, reason: impl Into<String>) -> Self {
        LowerError::BadTypeArgs {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading a description document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read description: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML description: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported description format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
