//! Error types for quill-editor.
//!
//! Only setup can fail: loading a file, compiling a pattern, reading the
//! settings file. A search that finds nothing is a normal result, never an
//! error.

use std::path::PathBuf;

use thiserror::Error;

/// Every error quill-editor can produce.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("{}: not valid UTF-8 text", path.display())]
    Encoding { path: PathBuf },

    #[error("buffer has no file path")]
    NoPath,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_names_the_file() {
        let err = Error::Encoding {
            path: PathBuf::from("/tmp/latin1.txt"),
        };
        assert_eq!(err.to_string(), "/tmp/latin1.txt: not valid UTF-8 text");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn regex_error_converts() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::InvalidPattern(_)));
        assert!(err.to_string().starts_with("invalid search pattern"));
    }
}
