//! Custom error types for the selafin-reader crate.

use thiserror::Error;

use super::models::LoadState;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum SelafinError {
    /// An error originating from I/O operations, including writing exports.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The format tag in the first record is not `SERAFIN`.
    #[error("Unsupported format tag {0:?}. Only single-precision SERAFIN files are supported.")]
    UnsupportedFormat(String),

    /// The leading and trailing length markers of a Fortran record differ,
    /// which means the read is misaligned (usually a wrong count upstream).
    #[error("Record framing mismatch in {record}: leading marker {start}, trailing marker {end}")]
    RecordFraming {
        record: &'static str,
        start: u32,
        end: u32,
    },

    /// The stream ended in the middle of a record.
    #[error("Unexpected end of file while reading {record}")]
    UnexpectedEof { record: &'static str },

    /// A declared count implies an allocation the file cannot possibly back.
    #[error("Unreasonable count for {record}: {count} items")]
    AllocationOrCount { record: &'static str, count: u64 },

    /// An operation was attempted before its prerequisite decode stage.
    #[error("{operation} requires the decoder to be {expected}, but it is {found}")]
    InvalidState {
        operation: &'static str,
        expected: LoadState,
        found: LoadState,
    },

    /// Bytes remain after the last whole timestep.
    #[error("Trailing data: expected end of file at {expected_end:#x}, but the file is {file_len} bytes")]
    TrailingData { expected_end: u64, file_len: u64 },

    /// A timestep index at or beyond the timestep count.
    #[error("Timestep {index} is out of range: the file holds {count} timesteps")]
    TimestepOutOfRange { index: u32, count: u32 },

    /// A variable index at or beyond the number of declared variables.
    #[error("Variable {index} is out of range: the file declares {count} variables")]
    VariableOutOfRange { index: usize, count: usize },
}

/// A convenience `Result` type alias using the crate's `SelafinError` type.
pub type Result<T> = std::result::Result<T, SelafinError>;
