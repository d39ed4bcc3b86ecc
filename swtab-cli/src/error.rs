//! Error handling for swtab CLI

use std::path::PathBuf;
use swtab_core::SwtabError;
use thiserror::Error;

/// Main error type for swtab CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Malformed alignment input: {message}")]
    InvalidFormat { message: String },

    #[error("Run-length decoding failed: {message}")]
    Decode { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<SwtabError> for CliError {
    fn from(err: SwtabError) -> Self {
        match err {
            SwtabError::InvalidArgument(message) => Self::invalid_argument(message),
            e @ (SwtabError::Decode { .. }
            | SwtabError::UnknownSequence { .. }
            | SwtabError::RunTableExhausted { .. }
            | SwtabError::RunTableLength { .. }
            | SwtabError::RunTableOffset { .. }
            | SwtabError::SpanMismatch { .. }
            | SwtabError::AlignmentLengthMismatch { .. }) => Self::decode(e.to_string()),
            SwtabError::Io(e) => Self::io(e.to_string()),
            SwtabError::Csv(e) if !e.is_io_error() => Self::invalid_format(e.to_string()),
            SwtabError::Csv(e) => Self::io(e.to_string()),
            e => Self::invalid_format(e.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Use '-' to read from standard input",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Alignments must be ssearch36 output produced with -m 10\n\
                 • Check that the file is not truncated",
            );
        }

        CliError::Decode { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Pass the run-length tables written by 'swtab rle-encode' for both query and library\n\
                 • Align the compressed FASTA files, not the original sequences",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your swtab.toml configuration file\n\
                 • Remove the file to fall back to the defaults",
            );
        }

        CliError::Io { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the output location is writable and has free space",
            );
        }

        CliError::InvalidArgument { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
