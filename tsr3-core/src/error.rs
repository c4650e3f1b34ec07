use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which attribute stream a face corner failed to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Uv,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Position => write!(f, "position"),
            AttributeKind::Uv => write!(f, "uv"),
            AttributeKind::Normal => write!(f, "normal"),
        }
    }
}

/// Every variant renders as one self-contained line. Causes are folded into
/// the message, never exposed through `Error::source`.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An input or output path could not be opened, read or written.
    #[error("cannot open \"{}\": {io}", .path.display())]
    FileOpen { path: PathBuf, io: io::Error },

    #[error("face declared before any material was selected")]
    NoActiveMaterial,

    /// `index` is the 1-based value as written in the face, `len` the stream
    /// length at the time the face was read.
    #[error("{kind} index {index} out of range (valid: 1..={len})")]
    IndexOutOfRange {
        kind: AttributeKind,
        index: u64,
        len: usize,
    },

    #[error("face has {corners} corners, only triangles are supported")]
    UnsupportedFace { corners: usize },

    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("invalid IA data: {0}")]
    IaFormat(String),

    #[error("invalid scene descriptor: {0}")]
    Descriptor(String),

    /// Wraps an error raised while processing one line of a text file.
    #[error("{}:{line}: {inner}", .path.display())]
    Line {
        path: PathBuf,
        line: usize,
        inner: Box<ConvertError>,
    },
}

impl ConvertError {
    pub fn file_open(path: impl Into<PathBuf>, io: io::Error) -> Self {
        Self::FileOpen { path: path.into(), io }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        Self::Malformed(details.into())
    }

    pub fn ia_format(details: impl Into<String>) -> Self {
        Self::IaFormat(details.into())
    }

    pub fn at_line(self, path: impl Into<PathBuf>, line: usize) -> Self {
        Self::Line { path: path.into(), line, inner: Box::new(self) }
    }

    /// The underlying error with any line location stripped.
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Line { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Line number of the innermost located error, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConvertError::Line { inner, line, .. } => inner.line().or(Some(*line)),
            _ => None,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
