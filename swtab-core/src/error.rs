//! Error taxonomy for the alignment tabulation pipeline

use thiserror::Error;

/// Which side of a pairwise alignment an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Query,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Query => write!(f, "query"),
            Side::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SwtabError {
    #[error("Missing field '{field}' in alignment record")]
    MissingField { field: String },

    #[error("Invalid numeric value for '{field}': {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Sequence '{name}' not found in run-length tables")]
    UnknownSequence { name: String },

    #[error("Aligned sequences differ in length: {query} vs {target} columns")]
    AlignmentLengthMismatch { query: usize, target: usize },

    #[error("Run-length table for the {side} sequence exhausted at alignment column {column}")]
    RunTableExhausted { side: Side, column: usize },

    #[error("Run-length table for the {side} sequence has {table} entries, but the sequence has {sequence} residues")]
    RunTableLength { side: Side, table: usize, sequence: usize },

    #[error("The {side} sequence is displayed from residue {start}, beyond its {len}-entry run-length table")]
    RunTableOffset { side: Side, start: usize, len: usize },

    #[error("Aligned {side} sequence has {residues} residues, inconsistent with coordinates {start}-{stop}")]
    SpanMismatch { side: Side, residues: usize, start: usize, stop: usize },

    #[error("Failed to decode alignment of '{query}' against '{target}': {source}")]
    Decode {
        query: String,
        target: String,
        #[source]
        source: Box<SwtabError>,
    },

    #[error("Aligned regions differ in length: query {query} vs target {target}")]
    CoordinateMismatch { query: usize, target: usize },

    #[error("Invalid run-length code byte {byte:#04x} at offset {offset}")]
    InvalidRunCode { byte: u8, offset: usize },

    #[error("Homopolymer run of {length} exceeds the maximum encodable run of {max}")]
    RunTooLong { length: usize, max: u32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Sequence file error: {0}")]
    Sequence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SwtabError {
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn invalid_number<S: Into<String>>(field: S, value: S) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn unknown_sequence<S: Into<String>>(name: S) -> Self {
        Self::UnknownSequence { name: name.into() }
    }
}

/// Result type for swtab core operations
pub type Result<T> = std::result::Result<T, SwtabError>;
