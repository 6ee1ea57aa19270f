//! [`GraphicsContext`] over a live OpenGL context loaded by `glow`.
//!
//! Every method forwards to the matching `glow` call. The calls are `unsafe` in `glow` because
//! they require the GL context to be current on the calling thread; a `glow::Context` is only
//! ever created right after [`crate::window::GlfwWindow`] made its context current, and it is
//! handed around in an `Rc`, so it cannot leave that thread.

use glow::HasContext;

use crate::graphics::lowlevel::{context::GraphicsContext, shader::StageKind};

impl GraphicsContext for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, kind: StageKind) -> Result<Self::Shader, String> {
        let shader_type = match kind {
            StageKind::Vertex => glow::VERTEX_SHADER,
            StageKind::Fragment => glow::FRAGMENT_SHADER,
            StageKind::Geometry => glow::GEOMETRY_SHADER,
        };
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str) {
        unsafe { HasContext::bind_attrib_location(self, program, index, name) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, value: i32) {
        unsafe { HasContext::uniform_1_i32(self, location, value) }
    }

    fn uniform_1_i32_slice(&self, location: Option<&Self::UniformLocation>, values: &[i32]) {
        unsafe { HasContext::uniform_1_i32_slice(self, location, values) }
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32) {
        unsafe { HasContext::uniform_1_f32(self, location, value) }
    }

    fn uniform_1_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        unsafe { HasContext::uniform_1_f32_slice(self, location, values) }
    }

    fn uniform_2_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        unsafe { HasContext::uniform_2_f32_slice(self, location, values) }
    }

    fn uniform_3_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        unsafe { HasContext::uniform_3_f32_slice(self, location, values) }
    }

    fn uniform_4_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        unsafe { HasContext::uniform_4_f32_slice(self, location, values) }
    }

    fn uniform_matrix_2_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        unsafe { HasContext::uniform_matrix_2_f32_slice(self, location, transpose, values) }
    }

    fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        unsafe { HasContext::uniform_matrix_3_f32_slice(self, location, transpose, values) }
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, location, transpose, values) }
    }

    fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    ) {
        unsafe { HasContext::get_uniform_f32(self, program, location, out) }
    }

    fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    ) {
        unsafe { HasContext::get_uniform_i32(self, program, location, out) }
    }
}
