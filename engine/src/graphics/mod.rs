pub mod lowlevel;
pub mod program;

pub use lowlevel::{
    Diagnostic, DiagnosticKind, GraphicsContext, ShaderError, ShaderSource, SourceError,
    SourceErrorKind, SourceOrigin, StageKind, Uniform,
};
pub use program::{FailurePolicy, ProgramBuilder, ProgramOptions, ShaderProgram};
