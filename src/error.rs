use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaggerError>;

#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Unable to read catalog {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed catalog {}: {message}", path.display())]
    CatalogParse { path: PathBuf, message: String },

    #[error("Unable to read file {}: {source}", path.display())]
    ScoreFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to write file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TaggerError {
    /// Missing inputs abort the run with 2; a report that could not be
    /// written exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OutputWrite { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_failures_exit_with_one() {
        let err = TaggerError::OutputWrite {
            path: PathBuf::from("/nope/out.csv"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("/nope/out.csv"));
    }

    #[test]
    fn unreadable_score_file_is_fatal() {
        let err = TaggerError::ScoreFileRead {
            path: PathBuf::from("scores.txt"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Unable to read file scores.txt"));
    }
}
