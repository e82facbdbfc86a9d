//! Crate-wide error type and `Result` alias.

/// Errors produced by the chunk-group write path.
#[derive(Debug)]
pub enum TsFileError {
    /// A series with the given measurement id already exists under a different
    /// schema (type, encoding, or compression).
    SchemaConflict(String),
    /// A typed write targeted a writer whose data type does not match.
    TypeMismatch(String),
    /// The encoder rejected a value (e.g. overflow in a delta encoder).
    EncodingFailure(String),
    /// Splicing a pre-encoded page into a chunk found its compressed size did
    /// not match its own header.
    PageFailure(String),
    /// The input is malformed in a way not covered by the other variants
    /// (used by the symmetric reader when decoding invalid bytes).
    OutOfSpec(String),
    /// The underlying file writer failed.
    Io(std::io::Error),
}

impl std::fmt::Display for TsFileError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TsFileError::SchemaConflict(message) => write!(fmt, "schema conflict: {}", message),
            TsFileError::TypeMismatch(message) => write!(fmt, "type mismatch: {}", message),
            TsFileError::EncodingFailure(message) => write!(fmt, "encoding failure: {}", message),
            TsFileError::PageFailure(message) => write!(fmt, "page failure: {}", message),
            TsFileError::OutOfSpec(message) => write!(fmt, "out of spec: {}", message),
            TsFileError::Io(e) => write!(fmt, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for TsFileError {}

impl From<std::io::Error> for TsFileError {
    fn from(e: std::io::Error) -> Self {
        TsFileError::Io(e)
    }
}

/// A specialized `Result` for chunk-group write errors.
pub type Result<T> = std::result::Result<T, TsFileError>;

macro_rules! schema_conflict_err {
    ($fmt:expr) => ($crate::error::TsFileError::SchemaConflict($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::TsFileError::SchemaConflict(format!($fmt, $($args),*)));
}

macro_rules! type_mismatch_err {
    ($fmt:expr) => ($crate::error::TsFileError::TypeMismatch($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::TsFileError::TypeMismatch(format!($fmt, $($args),*)));
}

macro_rules! encoding_err {
    ($fmt:expr) => ($crate::error::TsFileError::EncodingFailure($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::TsFileError::EncodingFailure(format!($fmt, $($args),*)));
}

macro_rules! out_of_spec_err {
    ($fmt:expr) => ($crate::error::TsFileError::OutOfSpec($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::TsFileError::OutOfSpec(format!($fmt, $($args),*)));
}

macro_rules! page_failure_err {
    ($fmt:expr) => ($crate::error::TsFileError::PageFailure($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::TsFileError::PageFailure(format!($fmt, $($args),*)));
}

pub(crate) use {encoding_err, out_of_spec_err, page_failure_err, schema_conflict_err, type_mismatch_err};
