//! Thin wrappers over the driver's shader objects.

pub mod context;
pub mod error;
pub mod gl;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod shader;
pub mod uniform;

pub use context::GraphicsContext;
pub use error::{Diagnostic, DiagnosticKind, ShaderError, SourceError, SourceErrorKind};
pub use shader::{ShaderSource, SourceOrigin, StageKind};
pub use uniform::Uniform;
