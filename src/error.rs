//! Error taxonomy for the public mutation surface.
//!
//! Nothing here is fatal: every public operation returns a `ChartResult`,
//! and the store additionally records the message as an advisory string the
//! caller clears explicitly.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Assigning {person_id} to {manager_id} would create a reporting cycle")]
    CycleRejected {
        person_id: String,
        manager_id: String,
    },

    #[error("{person_id} cannot report to themselves")]
    SelfManager { person_id: String },

    #[error("Unknown person: {0}")]
    UnknownPerson(String),

    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error("Unknown role template: {0}")]
    UnknownTemplate(String),

    #[error("Cannot delete non-custom role {0}")]
    NotCustom(String),

    #[error("Import rejected: {0}")]
    ImportFormat(String),

    #[error("Unsupported export version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Result type for store operations
pub type ChartResult<T> = Result<T, ChartError>;
