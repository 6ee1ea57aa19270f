//! The driver seam every shader object talks through.

use std::fmt::Debug;

use crate::graphics::lowlevel::shader::StageKind;

/// The subset of an OpenGL-style driver needed to build and feed shader programs.
///
/// Every call acts on driver state that is shared by everything using the same context
/// (most notably the current program), so a context must only be used from the thread it
/// was made current on. Handles are plain values; releasing them is the caller's job.
pub trait GraphicsContext {
    /// A compiled (or failed) shader stage object.
    type Shader: Copy + Debug + Eq;
    /// A program object.
    type Program: Copy + Debug + Eq;
    /// A uniform slot inside a linked program.
    type UniformLocation: Clone + Debug;

    /// Creates an empty stage object.
    fn create_shader(&self, kind: StageKind) -> Result<Self::Shader, String>;
    /// Replaces the source text of a stage object.
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    /// Flags a stage object for deletion. The driver frees it once no program holds it.
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Associates a vertex attribute index with a named input. Takes effect at the next link.
    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    /// Makes `program` current, or unbinds any program when `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Looks up a uniform by name, `None` when the linked program has no such active uniform.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    // Uploads target the *current* program. A `None` location is silently ignored.
    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, value: i32);
    fn uniform_1_i32_slice(&self, location: Option<&Self::UniformLocation>, values: &[i32]);
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32);
    fn uniform_1_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]);
    fn uniform_2_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]);
    fn uniform_3_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]);
    fn uniform_4_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]);
    fn uniform_matrix_2_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    );
    fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    );
    fn uniform_matrix_4_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    );

    /// Reads back the current value of a float-based uniform of `program`.
    fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    );
    /// Reads back the current value of an int/bool-based uniform of `program`.
    fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    );
}
