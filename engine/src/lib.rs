//! Shader program loading and a small GLFW/OpenGL host to run them in.

use std::sync::Arc;

/// A read-only string type.
pub type ReadOnlyString = Arc<str>;

pub mod graphics;
pub mod input;
pub mod window;
