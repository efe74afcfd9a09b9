//! Error types for classification and file placement

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A field of the normalized record that classification could not fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Board,
    Code,
    Level,
    Subject,
    Session,
    Year,
    Type,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Code => "code",
            Self::Level => "level",
            Self::Subject => "subject",
            Self::Session => "session",
            Self::Year => "year",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a name was not classified. Every variant is an abstention:
/// the file is left where it is and the batch moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// No grammar matched and the heuristic scan found no document type
    #[error("no naming pattern matched")]
    NoPatternMatch,

    /// Something matched but a required field is empty
    #[error("missing details: no {0}")]
    MissingRequiredField(Field),

    /// Board and code parsed but the pair is not in the registry
    #[error("code {board}_{code} not found in codes")]
    UnknownCode { board: String, code: String },

    /// The year token is not numeric
    #[error("invalid year: {0:?}")]
    InvalidYear(String),
}

impl ClassifyError {
    /// Short label used to group abstentions in the batch summary
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoPatternMatch => "no pattern match",
            Self::MissingRequiredField(_) => "missing details",
            Self::UnknownCode { .. } => "unknown code",
            Self::InvalidYear(_) => "invalid year",
        }
    }
}

/// I/O failure while placing one file
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: fs_extra::error::Error,
    },
}

impl FileOpError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
