//! swtab Core Library
//!
//! Streaming parser for ssearch36 `-m 10` output, homopolymer run-length
//! codec, ambiguity-aware diffing, record selection and tabular output.

pub mod ambiguity;
pub mod diff;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod rle;
pub mod types;

// Re-export commonly used types and functions
pub use ambiguity::is_similar;
pub use diff::add_diff;
pub use error::{Result, SwtabError};
pub use io::ssearch::SsearchReader;
pub use io::table::{resolve_columns, write_table, TableOptions, TableWriter};
pub use pipeline::{GroupMode, PipelineOptions, Pushback};
pub use rle::{decode_alignment, AlignedSpan, RunLengthTable, RunLengthTables, RunPadding};
pub use types::AlignmentRecord;

/// Version information for the swtab core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
