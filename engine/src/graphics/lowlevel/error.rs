//! Errors and diagnostics produced while building shader programs.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::graphics::lowlevel::shader::StageKind;

/// Why a shader source file could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    PermissionDenied,
    /// The file exists but is not valid UTF-8 text.
    InvalidUtf8,
    Other,
}

impl From<io::ErrorKind> for SourceErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            io::ErrorKind::InvalidData => SourceErrorKind::InvalidUtf8,
            _ => SourceErrorKind::Other,
        }
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::NotFound => write!(f, "file not found"),
            SourceErrorKind::PermissionDenied => write!(f, "permission denied"),
            SourceErrorKind::InvalidUtf8 => write!(f, "not valid UTF-8"),
            SourceErrorKind::Other => write!(f, "read failed"),
        }
    }
}

/// A shader stage's source file could not be read.
#[derive(Debug, Error)]
#[error("failed to read {stage} shader source {}: {kind}", path.display())]
pub struct SourceError {
    pub stage: StageKind,
    pub path: PathBuf,
    pub kind: SourceErrorKind,
    #[source]
    pub io: io::Error,
}

impl SourceError {
    pub fn new(stage: StageKind, path: impl Into<PathBuf>, io: io::Error) -> Self {
        Self {
            stage,
            path: path.into(),
            kind: io.kind().into(),
            io,
        }
    }
}

/// Errors returned when building or rebuilding a [`crate::graphics::ShaderProgram`].
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("{kind} shader failed to compile:\n{log}")]
    Compile { kind: StageKind, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
    /// The driver refused to hand out a stage or program object.
    #[error("driver error: {0}")]
    Driver(String),
    #[error("shader program `{0}` was built from inline source and has no files to reload")]
    NotReloadable(String),
}

/// What a [`Diagnostic`] was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Vertex,
    Fragment,
    Geometry,
    Program,
}

impl DiagnosticKind {
    /// The tag printed in front of the driver log.
    pub const fn tag(&self) -> &'static str {
        match self {
            DiagnosticKind::Vertex => "VERTEX",
            DiagnosticKind::Fragment => "FRAGMENT",
            DiagnosticKind::Geometry => "GEOMETRY",
            DiagnosticKind::Program => "PROGRAM",
        }
    }
}

impl From<StageKind> for DiagnosticKind {
    fn from(kind: StageKind) -> Self {
        match kind {
            StageKind::Vertex => DiagnosticKind::Vertex,
            StageKind::Fragment => DiagnosticKind::Fragment,
            StageKind::Geometry => DiagnosticKind::Geometry,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A failed compile or link, with the driver's info log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub log: String,
}

impl Diagnostic {
    pub fn new(kind: impl Into<DiagnosticKind>, log: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            log: log.into(),
        }
    }

    /// Converts the diagnostic into the error a strict build returns.
    pub fn into_error(self) -> ShaderError {
        match self.kind {
            DiagnosticKind::Vertex => ShaderError::Compile {
                kind: StageKind::Vertex,
                log: self.log,
            },
            DiagnosticKind::Fragment => ShaderError::Compile {
                kind: StageKind::Fragment,
                log: self.log,
            },
            DiagnosticKind::Geometry => ShaderError::Compile {
                kind: StageKind::Geometry,
                log: self.log,
            },
            DiagnosticKind::Program => ShaderError::Link { log: self.log },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.log.trim_end())
    }
}
