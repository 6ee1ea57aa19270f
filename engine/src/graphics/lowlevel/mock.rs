//! A software stand-in for an OpenGL driver.
//!
//! [`MockContext`] keeps just enough driver state to observe what shader objects do with it:
//! which stage and program objects exist, what is attached and current, which uniforms and
//! attributes a linked program exposes, and what values its uniforms hold. "Compiling" scans
//! the source for declarations:
//!
//! - an empty source or a line starting with `#error` fails the compile,
//! - `uniform <type> <name>;` (optionally `<name>[N]`) declares a uniform,
//! - `in <type> <name>;` / `attribute <type> <name>;` in a vertex stage declares an attribute.
//!   A `layout(location = N)` prefix pins its index, overriding `bind_attrib_location`.
//!
//! Everything else is ignored. Calls the real driver would reject bump [`MockContext::error_count`]
//! and otherwise do nothing, like a GL error flag.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::graphics::lowlevel::{context::GraphicsContext, shader::StageKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockShader(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockProgram(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockLocation(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UniformType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler,
}

impl UniformType {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "bool" => UniformType::Bool,
            "int" => UniformType::Int,
            "float" => UniformType::Float,
            "vec2" => UniformType::Vec2,
            "vec3" => UniformType::Vec3,
            "vec4" => UniformType::Vec4,
            "mat2" => UniformType::Mat2,
            "mat3" => UniformType::Mat3,
            "mat4" => UniformType::Mat4,
            t if t.starts_with("sampler") => UniformType::Sampler,
            _ => return None,
        })
    }

    fn components(self) -> usize {
        match self {
            UniformType::Bool | UniformType::Int | UniformType::Float | UniformType::Sampler => 1,
            UniformType::Vec2 => 2,
            UniformType::Vec3 => 3,
            UniformType::Vec4 | UniformType::Mat2 => 4,
            UniformType::Mat3 => 9,
            UniformType::Mat4 => 16,
        }
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            UniformType::Bool | UniformType::Int | UniformType::Sampler
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Declaration {
    name: String,
    ty: UniformType,
    len: usize,
}

/// A vertex stage input, with the index from its `layout(location = N)` qualifier if any.
#[derive(Clone, Debug, PartialEq)]
struct Input {
    name: String,
    location: Option<u32>,
}

#[derive(Clone, Debug)]
enum Values {
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

#[derive(Debug)]
struct ActiveUniform {
    decl: Declaration,
    values: Values,
}

impl ActiveUniform {
    fn new(decl: Declaration) -> Self {
        let size = decl.ty.components() * decl.len;
        let values = if decl.ty.is_integer() {
            Values::Ints(vec![0; size])
        } else {
            Values::Floats(vec![0.0; size])
        };
        Self { decl, values }
    }
}

#[derive(Debug)]
struct ShaderObject {
    kind: StageKind,
    source: String,
    compiled: bool,
    log: String,
    flagged: bool,
    uniforms: Vec<Declaration>,
    inputs: Vec<Input>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<MockShader>,
    bindings: FxHashMap<String, u32>,
    linked: bool,
    log: String,
    flagged: bool,
    uniforms: Vec<ActiveUniform>,
    attributes: FxHashMap<String, u32>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    shaders: FxHashMap<MockShader, ShaderObject>,
    programs: FxHashMap<MockProgram, ProgramObject>,
    current: Option<MockProgram>,
    created: Vec<StageKind>,
    location_queries: usize,
    errors: usize,
}

impl State {
    fn name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn is_attached(&self, shader: MockShader) -> bool {
        self.programs
            .values()
            .any(|program| program.attached.contains(&shader))
    }

    /// Frees a flagged shader once nothing holds it anymore.
    fn collect_shader(&mut self, shader: MockShader) {
        let flagged = self.shaders.get(&shader).is_some_and(|s| s.flagged);
        if flagged && !self.is_attached(shader) {
            self.shaders.remove(&shader);
        }
    }

    fn free_program(&mut self, program: MockProgram) {
        if let Some(object) = self.programs.remove(&program) {
            for shader in object.attached {
                self.collect_shader(shader);
            }
        }
    }

    fn current_uniform(&mut self, location: &MockLocation) -> Option<&mut ActiveUniform> {
        let current = self.current?;
        self.programs
            .get_mut(&current)?
            .uniforms
            .get_mut(location.0 as usize)
    }
}

/// A recording driver for tests; see the module docs for what it understands.
#[derive(Debug, Default)]
pub struct MockContext {
    state: RefCell<State>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The program made current by the last `use_program` call.
    pub fn current_program(&self) -> Option<MockProgram> {
        self.state.borrow().current
    }

    /// Programs that exist and have not been deleted.
    pub fn live_programs(&self) -> usize {
        let state = self.state.borrow();
        state.programs.values().filter(|p| !p.flagged).count()
    }

    /// Stage objects that exist and have not been deleted.
    pub fn live_shaders(&self) -> usize {
        let state = self.state.borrow();
        state.shaders.values().filter(|s| !s.flagged).count()
    }

    /// Every stage object ever created, in creation order.
    pub fn created_stages(&self) -> Vec<StageKind> {
        self.state.borrow().created.clone()
    }

    /// Stages currently attached to `program`.
    pub fn attached_stages(&self, program: MockProgram) -> Vec<StageKind> {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)
            .map(|p| {
                p.attached
                    .iter()
                    .filter_map(|s| state.shaders.get(s).map(|s| s.kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The float components stored for a uniform of `program`, `None` if it has no such uniform.
    pub fn uniform_f32s(&self, program: MockProgram, name: &str) -> Option<Vec<f32>> {
        let state = self.state.borrow();
        let uniform = Self::find_uniform(&state, program, name)?;
        match &uniform.values {
            Values::Floats(values) => Some(values.clone()),
            Values::Ints(values) => Some(values.iter().map(|&v| v as f32).collect()),
        }
    }

    /// The integer components stored for a uniform of `program`.
    pub fn uniform_i32s(&self, program: MockProgram, name: &str) -> Option<Vec<i32>> {
        let state = self.state.borrow();
        let uniform = Self::find_uniform(&state, program, name)?;
        match &uniform.values {
            Values::Ints(values) => Some(values.clone()),
            Values::Floats(values) => Some(values.iter().map(|&v| v as i32).collect()),
        }
    }

    /// How many times a uniform location was looked up by name.
    pub fn location_queries(&self) -> usize {
        self.state.borrow().location_queries
    }

    /// How many calls the driver would have rejected.
    pub fn error_count(&self) -> usize {
        self.state.borrow().errors
    }

    fn find_uniform<'s>(
        state: &'s State,
        program: MockProgram,
        name: &str,
    ) -> Option<&'s ActiveUniform> {
        state
            .programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.decl.name == name)
    }

    fn upload_ints(&self, location: Option<&MockLocation>, values: &[i32]) {
        let Some(location) = location else {
            return;
        };
        let state = &mut *self.state.borrow_mut();
        let accepted = match state.current_uniform(location) {
            Some(uniform) if uniform.decl.ty.is_integer() && fits(&uniform.decl, 1, values) => {
                if let Values::Ints(stored) = &mut uniform.values {
                    let is_bool = uniform.decl.ty == UniformType::Bool;
                    for (slot, &value) in stored.iter_mut().zip(values) {
                        *slot = if is_bool { i32::from(value != 0) } else { value };
                    }
                }
                true
            }
            _ => false,
        };
        if !accepted {
            state.errors += 1;
        }
    }

    fn upload_floats(
        &self,
        location: Option<&MockLocation>,
        ty: UniformType,
        transpose: bool,
        values: &[f32],
    ) {
        let Some(location) = location else {
            return;
        };
        let state = &mut *self.state.borrow_mut();
        let accepted = match state.current_uniform(location) {
            Some(uniform)
                if uniform.decl.ty == ty && fits(&uniform.decl, ty.components(), values) =>
            {
                let values = if transpose {
                    transposed(values, ty)
                } else {
                    values.to_vec()
                };
                if let Values::Floats(stored) = &mut uniform.values {
                    for (slot, value) in stored.iter_mut().zip(values) {
                        *slot = value;
                    }
                }
                true
            }
            _ => false,
        };
        if !accepted {
            state.errors += 1;
        }
    }

    fn read_back<T: Copy>(
        &self,
        program: MockProgram,
        location: &MockLocation,
        out: &mut [T],
        convert: impl Fn(&Values, usize) -> Option<T>,
    ) {
        let state = &mut *self.state.borrow_mut();
        let uniform = state
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.get(location.0 as usize));
        match uniform {
            Some(uniform) => {
                for (index, slot) in out.iter_mut().enumerate() {
                    if let Some(value) = convert(&uniform.values, index) {
                        *slot = value;
                    }
                }
            }
            None => state.errors += 1,
        }
    }
}

/// Whether an upload of `values` matches the declared shape of a uniform.
fn fits<T>(decl: &Declaration, components: usize, values: &[T]) -> bool {
    let elements = values.len() / components;
    !values.is_empty()
        && values.len() % components == 0
        && (decl.len > 1 || elements == 1)
}

fn transposed(values: &[f32], ty: UniformType) -> Vec<f32> {
    let n = match ty {
        UniformType::Mat2 => 2,
        UniformType::Mat3 => 3,
        UniformType::Mat4 => 4,
        _ => return values.to_vec(),
    };
    values
        .chunks(n * n)
        .flat_map(|m| (0..n * n).map(move |i| m[(i % n) * n + i / n]))
        .collect()
}

/// Scans a stage source for declarations, or returns the compile log.
fn scan_source(
    kind: StageKind,
    source: &str,
) -> Result<(Vec<Declaration>, Vec<Input>), String> {
    if source.trim().is_empty() {
        return Err("0:0(0): error: empty shader source".to_owned());
    }

    let mut uniforms = Vec::new();
    let mut inputs = Vec::new();

    for (number, raw) in source.lines().enumerate() {
        let line = raw.split("//").next().unwrap_or_default().trim();

        if let Some(message) = line.strip_prefix("#error") {
            return Err(format!("0:{}(1): error: {}", number + 1, message.trim()));
        }

        let Some(statement) = line.strip_suffix(';') else {
            continue;
        };

        if let Some(rest) = statement.strip_prefix("uniform ") {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            let [.., ty, name] = tokens.as_slice() else {
                return Err(format!("0:{}(1): error: malformed uniform", number + 1));
            };
            let ty = UniformType::parse(ty).ok_or_else(|| {
                format!("0:{}(1): error: unknown uniform type `{}`", number + 1, ty)
            })?;
            let (name, len) = match name.split_once('[') {
                Some((name, len)) => (
                    name,
                    len.trim_end_matches(']').parse().map_err(|_| {
                        format!("0:{}(1): error: bad array size for `{}`", number + 1, name)
                    })?,
                ),
                None => (*name, 1),
            };
            uniforms.push(Declaration {
                name: name.to_owned(),
                ty,
                len,
            });
            continue;
        }

        if kind == StageKind::Vertex {
            let (location, statement) = match statement
                .strip_prefix("layout")
                .and_then(|s| s.split_once(')'))
            {
                Some((qualifiers, rest)) => (
                    layout_location(qualifiers).map_err(|message| {
                        format!("0:{}(1): error: {}", number + 1, message)
                    })?,
                    rest.trim(),
                ),
                None => (None, statement),
            };
            let declared = statement
                .strip_prefix("in ")
                .or_else(|| statement.strip_prefix("attribute "));
            if let Some(name) = declared.and_then(|d| d.split_whitespace().last()) {
                inputs.push(Input {
                    name: name.to_owned(),
                    location,
                });
            }
        }
    }

    Ok((uniforms, inputs))
}

/// Reads `location = N` out of the qualifiers of a `layout(...)`.
fn layout_location(qualifiers: &str) -> Result<Option<u32>, String> {
    for qualifier in qualifiers.trim_start_matches(['(', ' ']).split(',') {
        let Some((key, value)) = qualifier.split_once('=') else {
            continue;
        };
        if key.trim() == "location" {
            return value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| format!("bad layout location `{}`", value.trim()));
        }
    }
    Ok(None)
}

impl GraphicsContext for MockContext {
    type Shader = MockShader;
    type Program = MockProgram;
    type UniformLocation = MockLocation;

    fn create_shader(&self, kind: StageKind) -> Result<Self::Shader, String> {
        let mut state = self.state.borrow_mut();
        let shader = MockShader(state.name());
        state.shaders.insert(
            shader,
            ShaderObject {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
                flagged: false,
                uniforms: Vec::new(),
                inputs: Vec::new(),
            },
        );
        state.created.push(kind);
        Ok(shader)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        let state = &mut *self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(object) => object.source = source.to_owned(),
            None => state.errors += 1,
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        let state = &mut *self.state.borrow_mut();
        let Some(object) = state.shaders.get_mut(&shader) else {
            state.errors += 1;
            return;
        };
        match scan_source(object.kind, &object.source) {
            Ok((uniforms, inputs)) => {
                object.compiled = true;
                object.log.clear();
                object.uniforms = uniforms;
                object.inputs = inputs;
            }
            Err(log) => {
                object.compiled = false;
                object.log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        let state = self.state.borrow();
        state.shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        let state = self.state.borrow();
        state
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let state = &mut *self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(object) => {
                object.flagged = true;
                state.collect_shader(shader);
            }
            None => state.errors += 1,
        }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut state = self.state.borrow_mut();
        let program = MockProgram(state.name());
        state.programs.insert(program, ProgramObject::default());
        Ok(program)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let state = &mut *self.state.borrow_mut();
        let valid = state.shaders.contains_key(&shader);
        match state.programs.get_mut(&program) {
            Some(object) if valid && !object.attached.contains(&shader) => {
                object.attached.push(shader)
            }
            _ => state.errors += 1,
        }
    }

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str) {
        let state = &mut *self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(object) => {
                object.bindings.insert(name.to_owned(), index);
            }
            None => state.errors += 1,
        }
    }

    fn link_program(&self, program: Self::Program) {
        let state = &mut *self.state.borrow_mut();
        let Some(object) = state.programs.get(&program) else {
            state.errors += 1;
            return;
        };

        let stages: Vec<&ShaderObject> = object
            .attached
            .iter()
            .filter_map(|s| state.shaders.get(s))
            .collect();
        let count = |kind| stages.iter().filter(|s| s.kind == kind).count();

        let mut result = Ok(());
        if count(StageKind::Vertex) != 1 {
            result = Err("error: program needs exactly one vertex shader".to_owned());
        } else if count(StageKind::Fragment) != 1 {
            result = Err("error: program needs exactly one fragment shader".to_owned());
        } else if stages.iter().any(|s| !s.compiled) {
            result = Err("error: linking with uncompiled shader".to_owned());
        }

        let mut uniforms: Vec<ActiveUniform> = Vec::new();
        let mut inputs: Vec<Input> = Vec::new();
        if result.is_ok() {
            for stage in &stages {
                for decl in &stage.uniforms {
                    match uniforms.iter().find(|u| u.decl.name == decl.name) {
                        Some(existing) if existing.decl != *decl => {
                            result = Err(format!(
                                "error: uniform `{}` declared with conflicting types",
                                decl.name
                            ));
                        }
                        Some(_) => {}
                        None => uniforms.push(ActiveUniform::new(decl.clone())),
                    }
                }
                if stage.kind == StageKind::Vertex {
                    inputs.extend(stage.inputs.iter().cloned());
                }
            }
        }

        // Explicit layout locations beat bindings; bindings beat automatic assignment.
        let mut attributes = FxHashMap::default();
        if result.is_ok() {
            for input in &inputs {
                let bound = object.bindings.get(&input.name).copied();
                if let Some(index) = input.location.or(bound) {
                    attributes.insert(input.name.clone(), index);
                }
            }
            let mut next = 0;
            for input in &inputs {
                if attributes.contains_key(&input.name) {
                    continue;
                }
                while attributes.values().any(|&index| index == next) {
                    next += 1;
                }
                attributes.insert(input.name.clone(), next);
            }
        }

        let Some(object) = state.programs.get_mut(&program) else {
            return;
        };
        match result {
            Ok(()) => {
                object.linked = true;
                object.log.clear();
                object.uniforms = uniforms;
                object.attributes = attributes;
            }
            Err(log) => {
                object.linked = false;
                object.log = log;
                object.uniforms.clear();
                object.attributes.clear();
            }
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        let state = self.state.borrow();
        state.programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let state = &mut *self.state.borrow_mut();
        if !state.programs.contains_key(&program) {
            state.errors += 1;
            return;
        }
        if state.current == Some(program) {
            if let Some(object) = state.programs.get_mut(&program) {
                object.flagged = true;
            }
        } else {
            state.free_program(program);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let state = &mut *self.state.borrow_mut();
        if let Some(program) = program {
            if !state.programs.get(&program).is_some_and(|p| p.linked) {
                state.errors += 1;
                return;
            }
        }
        let previous = std::mem::replace(&mut state.current, program);
        if let Some(previous) = previous.filter(|&p| Some(p) != program) {
            if state.programs.get(&previous).is_some_and(|p| p.flagged) {
                state.free_program(previous);
            }
        }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let state = &mut *self.state.borrow_mut();
        state.location_queries += 1;
        let Some(object) = state.programs.get(&program).filter(|p| p.linked) else {
            state.errors += 1;
            return None;
        };
        let name = name.strip_suffix("[0]").unwrap_or(name);
        object
            .uniforms
            .iter()
            .position(|u| u.decl.name == name)
            .map(|index| MockLocation(index as u32))
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let object = state.programs.get(&program).filter(|p| p.linked)?;
        object.attributes.get(name).copied()
    }

    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, value: i32) {
        self.upload_ints(location, &[value]);
    }

    fn uniform_1_i32_slice(&self, location: Option<&Self::UniformLocation>, values: &[i32]) {
        self.upload_ints(location, values);
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32) {
        self.upload_floats(location, UniformType::Float, false, &[value]);
    }

    fn uniform_1_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        self.upload_floats(location, UniformType::Float, false, values);
    }

    fn uniform_2_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        self.upload_floats(location, UniformType::Vec2, false, values);
    }

    fn uniform_3_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        self.upload_floats(location, UniformType::Vec3, false, values);
    }

    fn uniform_4_f32_slice(&self, location: Option<&Self::UniformLocation>, values: &[f32]) {
        self.upload_floats(location, UniformType::Vec4, false, values);
    }

    fn uniform_matrix_2_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_floats(location, UniformType::Mat2, transpose, values);
    }

    fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_floats(location, UniformType::Mat3, transpose, values);
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_floats(location, UniformType::Mat4, transpose, values);
    }

    fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    ) {
        self.read_back(program, location, out, |values, index| match values {
            Values::Floats(v) => v.get(index).copied(),
            Values::Ints(v) => v.get(index).map(|&i| i as f32),
        });
    }

    fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    ) {
        self.read_back(program, location, out, |values, index| match values {
            Values::Ints(v) => v.get(index).copied(),
            Values::Floats(v) => v.get(index).map(|&f| f as i32),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "#version 330 core
layout(location = 3) in vec3 a_normal;
in vec2 a_position;
in vec2 a_uv;
uniform mat4 u_mvp; // model-view-projection
void main() {}
";

    const FS: &str = "#version 330 core
uniform sampler2D u_texture;
uniform mat4 u_mvp;
void main() {}
";

    fn stage(ctx: &MockContext, kind: StageKind, source: &str) -> MockShader {
        let shader = ctx.create_shader(kind).unwrap();
        ctx.shader_source(shader, source);
        ctx.compile_shader(shader);
        shader
    }

    fn program(ctx: &MockContext, stages: &[MockShader]) -> MockProgram {
        let program = ctx.create_program().unwrap();
        for &shader in stages {
            ctx.attach_shader(program, shader);
        }
        program
    }

    #[test]
    fn scans_uniforms_and_inputs() {
        let (uniforms, inputs) = scan_source(StageKind::Vertex, VS).unwrap();
        let names: Vec<_> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a_normal", "a_position", "a_uv"]);
        assert_eq!(inputs[0].location, Some(3));
        assert_eq!(inputs[1].location, None);
        assert_eq!(
            uniforms,
            [Declaration {
                name: "u_mvp".to_owned(),
                ty: UniformType::Mat4,
                len: 1
            }]
        );
    }

    #[test]
    fn error_directive_fails_compile_with_line() {
        let ctx = MockContext::new();
        let shader = stage(&ctx, StageKind::Fragment, "void main() {}\n#error broken\n");
        assert!(!ctx.shader_compile_status(shader));
        assert_eq!(ctx.shader_info_log(shader), "0:2(1): error: broken");
    }

    #[test]
    fn empty_and_unknown_types_fail() {
        assert!(scan_source(StageKind::Vertex, "  \n").is_err());
        assert!(scan_source(StageKind::Fragment, "uniform quat q;").is_err());
    }

    #[test]
    fn link_merges_shared_uniforms() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let fs = stage(&ctx, StageKind::Fragment, FS);
        let program = program(&ctx, &[vs, fs]);
        ctx.link_program(program);

        assert!(ctx.program_link_status(program));
        assert_eq!(
            ctx.uniform_location(program, "u_mvp"),
            Some(MockLocation(0))
        );
        assert_eq!(
            ctx.uniform_location(program, "u_texture"),
            Some(MockLocation(1))
        );
        assert_eq!(ctx.uniform_location(program, "u_missing"), None);
    }

    #[test]
    fn link_without_fragment_stage_fails() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let program = program(&ctx, &[vs]);
        ctx.link_program(program);

        assert!(!ctx.program_link_status(program));
        assert!(ctx.program_info_log(program).contains("fragment"));
    }

    #[test]
    fn bound_attributes_win_and_the_rest_fill_gaps() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let fs = stage(&ctx, StageKind::Fragment, FS);
        let program = program(&ctx, &[vs, fs]);
        ctx.bind_attrib_location(program, 0, "a_uv");
        ctx.link_program(program);

        assert_eq!(ctx.attrib_location(program, "a_uv"), Some(0));
        assert_eq!(ctx.attrib_location(program, "a_normal"), Some(3));
        assert_eq!(ctx.attrib_location(program, "a_position"), Some(1));
    }

    #[test]
    fn layout_location_overrides_binding() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let fs = stage(&ctx, StageKind::Fragment, FS);
        let program = program(&ctx, &[vs, fs]);
        ctx.bind_attrib_location(program, 0, "a_normal");
        ctx.link_program(program);

        assert!(ctx.program_link_status(program));
        assert_eq!(ctx.attrib_location(program, "a_normal"), Some(3));
        assert_eq!(ctx.attrib_location(program, "a_position"), Some(0));
        assert_eq!(ctx.attrib_location(program, "a_uv"), Some(1));
    }

    #[test]
    fn bad_layout_location_fails_compile() {
        let ctx = MockContext::new();
        let shader = stage(
            &ctx,
            StageKind::Vertex,
            "layout(location = x) in vec2 a_position;\n",
        );
        assert!(!ctx.shader_compile_status(shader));
        assert!(ctx.shader_info_log(shader).contains("bad layout location"));
    }

    #[test]
    fn uploads_target_the_current_program() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let fs = stage(&ctx, StageKind::Fragment, FS);
        let first = program(&ctx, &[vs, fs]);
        let second = program(&ctx, &[vs, fs]);
        ctx.link_program(first);
        ctx.link_program(second);

        let location = ctx.uniform_location(first, "u_texture");
        ctx.use_program(Some(second));
        ctx.uniform_1_i32(location.as_ref(), 4);

        assert_eq!(ctx.uniform_i32s(first, "u_texture"), Some(vec![0]));
        assert_eq!(ctx.uniform_i32s(second, "u_texture"), Some(vec![4]));
    }

    #[test]
    fn upload_without_location_is_ignored() {
        let ctx = MockContext::new();
        ctx.uniform_1_f32(None, 1.0);
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn transpose_flips_each_matrix() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(transposed(&values, UniformType::Mat2), [1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn deleted_objects_linger_while_in_use() {
        let ctx = MockContext::new();
        let vs = stage(&ctx, StageKind::Vertex, VS);
        let fs = stage(&ctx, StageKind::Fragment, FS);
        let program = program(&ctx, &[vs, fs]);
        ctx.link_program(program);
        ctx.delete_shader(vs);
        ctx.delete_shader(fs);
        assert_eq!(ctx.live_shaders(), 0);

        ctx.use_program(Some(program));
        ctx.delete_program(program);
        assert_eq!(ctx.live_programs(), 0);
        assert!(ctx.program_link_status(program));

        ctx.use_program(None);
        assert!(!ctx.program_link_status(program));
        assert!(ctx.attached_stages(program).is_empty());
    }
}
