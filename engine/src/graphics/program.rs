//! Linked shader programs and their uniform interface.
//!
//! A [`ShaderProgram`] owns one program object for as long as it lives. Building one reads or
//! takes the stage sources, compiles every stage, links them and releases the stage objects
//! again. Uniforms can be set by name, which looks the location up (and by default remembers
//! it), or through a location fetched once with [`ShaderProgram::uniform_location`].

use std::{cell::RefCell, fmt, path::Path, rc::Rc};

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;

use crate::{
    ReadOnlyString,
    graphics::lowlevel::{
        context::GraphicsContext,
        error::{Diagnostic, DiagnosticKind, ShaderError},
        shader::{ShaderSource, SourceOrigin, StageObject},
        uniform::Uniform,
    },
};

/// What a build does when a stage fails to compile or the program fails to link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Return the first failure as an error. Nothing created for the build is kept.
    #[default]
    Strict,
    /// Keep the unlinked program and report through the log and [`ShaderProgram::diagnostics`].
    ///
    /// Uniform setters on such a program do nothing and draws with it produce no output.
    BestEffort,
}

impl FailurePolicy {
    fn resolve(self, diagnostics: &[Diagnostic]) -> Result<(), ShaderError> {
        match (self, diagnostics.first()) {
            (FailurePolicy::Strict, Some(first)) => Err(first.clone().into_error()),
            _ => Ok(()),
        }
    }
}

/// Knobs for building a [`ShaderProgram`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramOptions {
    pub policy: FailurePolicy,
    /// Remember uniform locations resolved by name until the program is relinked.
    pub cache_uniforms: bool,
    /// Name used in log lines. Defaults to the prefix or vertex path the sources came from.
    pub label: Option<ReadOnlyString>,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::Strict,
            cache_uniforms: true,
            label: None,
        }
    }
}

impl ProgramOptions {
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_uniform_cache(mut self, enabled: bool) -> Self {
        self.cache_uniforms = enabled;
        self
    }

    pub fn with_label(mut self, label: impl Into<ReadOnlyString>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn label_for(&self, source: &ShaderSource) -> ReadOnlyString {
        self.label
            .clone()
            .unwrap_or_else(|| source.label().into())
    }
}

/// Collects everything needed to build a [`ShaderProgram`], including attribute bindings that
/// have to be in place before the first link.
#[derive(Clone, Debug)]
pub struct ProgramBuilder {
    source: ShaderSource,
    attributes: Vec<(ReadOnlyString, u32)>,
    options: ProgramOptions,
}

impl ProgramBuilder {
    pub fn new(source: ShaderSource) -> Self {
        Self {
            source,
            attributes: Vec::new(),
            options: ProgramOptions::default(),
        }
    }

    /// Binds the vertex input `name` to attribute `index` before linking.
    pub fn bind_attribute(mut self, name: impl Into<ReadOnlyString>, index: u32) -> Self {
        record_attribute(&mut self.attributes, name.into(), index);
        self
    }

    pub fn options(mut self, options: ProgramOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.options.policy = policy;
        self
    }

    pub fn label(mut self, label: impl Into<ReadOnlyString>) -> Self {
        self.options.label = Some(label.into());
        self
    }

    pub fn build<C: GraphicsContext>(self, ctx: Rc<C>) -> Result<ShaderProgram<C>, ShaderError> {
        ShaderProgram::create(ctx, &self.source, self.options, self.attributes)
    }
}

fn record_attribute(
    attributes: &mut Vec<(ReadOnlyString, u32)>,
    name: ReadOnlyString,
    index: u32,
) {
    match attributes.iter_mut().find(|(bound, _)| *bound == name) {
        Some(entry) => entry.1 = index,
        None => attributes.push((name, index)),
    }
}

struct Linked<P> {
    program: P,
    linked: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Compiles every stage of `source` and links them into a fresh program object.
///
/// All stages are compiled and reported even when an earlier one fails. The stage objects stay
/// attached so the program can be relinked, but are flagged for deletion before returning.
fn build_program<C: GraphicsContext>(
    ctx: &C,
    source: &ShaderSource,
    attributes: &[(ReadOnlyString, u32)],
    label: &str,
) -> Result<Linked<C::Program>, ShaderError> {
    info!("Building shader: {label}");
    let mut diagnostics = Vec::new();

    let stages = source
        .stages()
        .map(|(kind, text)| -> Result<_, ShaderError> {
            let stage = StageObject::compile(ctx, kind, text)?;
            if stage.compiled() {
                let log = stage.info_log();
                if !log.trim().is_empty() {
                    debug!("Shader `{label}` {} stage: {}", stage.kind(), log.trim_end());
                }
            } else {
                let diagnostic = Diagnostic::new(stage.kind(), stage.info_log());
                error!("Shader `{label}` {diagnostic}");
                diagnostics.push(diagnostic);
            }
            Ok(stage)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let program = ctx
        .create_program()
        .map_err(|e| ShaderError::Driver(format!("creating program: {e}")))?;
    for stage in &stages {
        ctx.attach_shader(program, stage.raw());
    }
    for (name, index) in attributes {
        ctx.bind_attrib_location(program, *index, name);
    }
    ctx.link_program(program);
    let linked = check_link(ctx, program, label, &mut diagnostics);
    drop(stages);

    Ok(Linked {
        program,
        linked,
        diagnostics,
    })
}

fn check_link<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
    label: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    if ctx.program_link_status(program) {
        debug!("Linked shader `{label}`");
        return true;
    }
    let diagnostic = Diagnostic::new(DiagnosticKind::Program, ctx.program_info_log(program));
    error!("Shader `{label}` {diagnostic}");
    diagnostics.push(diagnostic);
    false
}

/// A compiled and linked shader program.
///
/// The program object is deleted when this is dropped. Every call goes to the context the
/// program was built with, which has to be current on the calling thread.
pub struct ShaderProgram<C: GraphicsContext> {
    ctx: Rc<C>,
    program: C::Program,
    origin: SourceOrigin,
    label: ReadOnlyString,
    options: ProgramOptions,
    attributes: Vec<(ReadOnlyString, u32)>,
    linked: bool,
    diagnostics: Vec<Diagnostic>,
    locations: RefCell<FxHashMap<ReadOnlyString, Option<C::UniformLocation>>>,
}

macro_rules! uniform_setters {
    ($($name:ident, $name_at:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Uploads a `", stringify!($ty), "` to the uniform called `name`.")]
            pub fn $name(&self, name: &str, value: impl Into<$ty>) {
                self.set_uniform(name, &value.into());
            }

            #[doc = concat!("Uploads a `", stringify!($ty), "` to a location from [`Self::uniform_location`].")]
            pub fn $name_at(&self, location: Option<&C::UniformLocation>, value: impl Into<$ty>) {
                self.set_uniform_at(location, &value.into());
            }
        )*
    };
}

impl<C: GraphicsContext> ShaderProgram<C> {
    /// Builds a program from already loaded sources.
    pub fn new(
        ctx: Rc<C>,
        source: &ShaderSource,
        options: ProgramOptions,
    ) -> Result<Self, ShaderError> {
        Self::create(ctx, source, options, Vec::new())
    }

    /// Builds a program from `<prefix>.vs` and `<prefix>.fs`.
    pub fn from_prefix(
        ctx: Rc<C>,
        prefix: impl AsRef<Path>,
        options: ProgramOptions,
    ) -> Result<Self, ShaderError> {
        let source = ShaderSource::from_prefix(prefix)?;
        Self::new(ctx, &source, options)
    }

    /// Builds a program from explicit stage paths. The geometry stage is optional.
    pub fn from_paths(
        ctx: Rc<C>,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
        options: ProgramOptions,
    ) -> Result<Self, ShaderError> {
        let source = ShaderSource::from_paths(vertex, fragment, geometry)?;
        Self::new(ctx, &source, options)
    }

    pub fn from_strings(
        ctx: Rc<C>,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
        options: ProgramOptions,
    ) -> Result<Self, ShaderError> {
        Self::new(
            ctx,
            &ShaderSource::from_strings(vertex, fragment, geometry),
            options,
        )
    }

    fn create(
        ctx: Rc<C>,
        source: &ShaderSource,
        options: ProgramOptions,
        attributes: Vec<(ReadOnlyString, u32)>,
    ) -> Result<Self, ShaderError> {
        let label = options.label_for(source);
        let built = build_program(&*ctx, source, &attributes, &label)?;
        if let Err(err) = options.policy.resolve(&built.diagnostics) {
            ctx.delete_program(built.program);
            return Err(err);
        }

        Ok(Self {
            ctx,
            program: built.program,
            origin: source.origin().clone(),
            label,
            options,
            attributes,
            linked: built.linked,
            diagnostics: built.diagnostics,
            locations: RefCell::default(),
        })
    }

    /// Makes this the current program. Uniform uploads go to the current program.
    pub fn use_program(&self) {
        self.ctx.use_program(Some(self.program));
    }

    /// The raw program object.
    pub fn handle(&self) -> C::Program {
        self.program
    }

    pub fn context(&self) -> &Rc<C> {
        &self.ctx
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// Whether the last link succeeded. Only ever `false` under [`FailurePolicy::BestEffort`].
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Compile and link failures of the last build or link, in the order they happened.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Looks up the location of an active uniform.
    ///
    /// `None` for names the program does not use; passing that on to a setter is a no-op.
    pub fn uniform_location(&self, name: &str) -> Option<C::UniformLocation> {
        if !self.linked {
            return None;
        }
        if !self.options.cache_uniforms {
            return self.ctx.uniform_location(self.program, name);
        }
        if let Some(location) = self.locations.borrow().get(name) {
            return location.clone();
        }
        let location = self.ctx.uniform_location(self.program, name);
        if location.is_none() {
            debug!("Shader `{}` has no active uniform `{name}`", self.label);
        }
        self.locations
            .borrow_mut()
            .insert(name.into(), location.clone());
        location
    }

    /// Uploads `value` to the uniform called `name` of the current program.
    ///
    /// Call [`Self::use_program`] first. Unknown names are ignored.
    pub fn set_uniform<U: Uniform + ?Sized>(&self, name: &str, value: &U) {
        let location = self.uniform_location(name);
        value.upload(&*self.ctx, location.as_ref());
    }

    pub fn set_uniform_at<U: Uniform + ?Sized>(
        &self,
        location: Option<&C::UniformLocation>,
        value: &U,
    ) {
        value.upload(&*self.ctx, location);
    }

    /// Uploads a bool, stored by the driver as an int.
    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, &value);
    }

    pub fn set_bool_at(&self, location: Option<&C::UniformLocation>, value: bool) {
        self.set_uniform_at(location, &value);
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, &value);
    }

    pub fn set_int_at(&self, location: Option<&C::UniformLocation>, value: i32) {
        self.set_uniform_at(location, &value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, &value);
    }

    pub fn set_float_at(&self, location: Option<&C::UniformLocation>, value: f32) {
        self.set_uniform_at(location, &value);
    }

    uniform_setters! {
        set_vec2, set_vec2_at => Vec2;
        set_vec3, set_vec3_at => Vec3;
        set_vec4, set_vec4_at => Vec4;
        set_mat2, set_mat2_at => Mat2;
        set_mat3, set_mat3_at => Mat3;
        set_mat4, set_mat4_at => Mat4;
    }

    /// Reads the current value of a float-based uniform into `out`.
    ///
    /// Returns `false` without touching `out` when the program has no such uniform.
    pub fn read_uniform_f32(&self, name: &str, out: &mut [f32]) -> bool {
        match self.uniform_location(name) {
            Some(location) => {
                self.ctx.get_uniform_f32(self.program, &location, out);
                true
            }
            None => false,
        }
    }

    /// Reads the current value of an int or bool uniform into `out`.
    pub fn read_uniform_i32(&self, name: &str, out: &mut [i32]) -> bool {
        match self.uniform_location(name) {
            Some(location) => {
                self.ctx.get_uniform_i32(self.program, &location, out);
                true
            }
            None => false,
        }
    }

    /// Binds the vertex input `name` to attribute `index`.
    ///
    /// Takes effect at the next link, so call [`Self::relink`] afterwards. The binding is kept
    /// across [`Self::rebuild`] and [`Self::reload`].
    pub fn bind_attribute(&mut self, name: &str, index: u32) {
        self.ctx.bind_attrib_location(self.program, index, name);
        record_attribute(&mut self.attributes, name.into(), index);
    }

    /// The attribute index the linker gave to the vertex input `name`.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        if !self.linked {
            return None;
        }
        self.ctx.attrib_location(self.program, name)
    }

    /// Links the program again, picking up attribute bindings made since the last link.
    ///
    /// Cached uniform locations are dropped, linking may move them.
    pub fn relink(&mut self) -> Result<(), ShaderError> {
        debug!("Relinking shader `{}`", self.label);
        self.ctx.link_program(self.program);
        self.locations.get_mut().clear();

        let mut diagnostics = Vec::new();
        self.linked = check_link(&*self.ctx, self.program, &self.label, &mut diagnostics);
        let result = self.options.policy.resolve(&diagnostics);
        self.diagnostics = diagnostics;
        result
    }

    /// Replaces the program with one built from `source`, keeping options and attribute bindings.
    ///
    /// Under [`FailurePolicy::Strict`] a failed build leaves the current program untouched. The
    /// new program is not made current.
    pub fn rebuild(&mut self, source: &ShaderSource) -> Result<(), ShaderError> {
        let label = self.options.label_for(source);
        let built = build_program(&*self.ctx, source, &self.attributes, &label)?;
        if let Err(err) = self.options.policy.resolve(&built.diagnostics) {
            warn!("Keeping previous build of shader `{}`", self.label);
            self.ctx.delete_program(built.program);
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.program, built.program);
        self.ctx.delete_program(previous);
        self.linked = built.linked;
        self.diagnostics = built.diagnostics;
        self.origin = source.origin().clone();
        self.label = label;
        self.locations.get_mut().clear();
        Ok(())
    }

    /// Reads the sources again from the files the program was built from and rebuilds it.
    pub fn reload(&mut self) -> Result<(), ShaderError> {
        let source = ShaderSource::reread(&self.origin)
            .ok_or_else(|| ShaderError::NotReloadable(self.label.to_string()))??;
        self.rebuild(&source)
    }
}

impl<C: GraphicsContext> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("label", &self.label)
            .field("program", &self.program)
            .field("linked", &self.linked)
            .field("attributes", &self.attributes)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl<C: GraphicsContext> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        debug!("Deleting shader `{}`", self.label);
        self.ctx.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::lowlevel::{mock::MockContext, shader::StageKind};

    const VERTEX: &str = "#version 330 core
in vec3 a_position;
in vec2 a_uv;
uniform mat4 u_mvp;
uniform float u_time;
void main() {}
";

    const FRAGMENT: &str = "#version 330 core
uniform vec3 u_tint;
uniform float u_time;
uniform bool u_debug;
uniform int u_mode;
void main() {}
";

    const GEOMETRY: &str = "#version 330 core
uniform float u_spread;
void main() {}
";

    const BROKEN: &str = "#version 330 core
#error missing semicolon
";

    fn build(ctx: &Rc<MockContext>, options: ProgramOptions) -> ShaderProgram<MockContext> {
        ShaderProgram::from_strings(ctx.clone(), VERTEX, FRAGMENT, None, options)
            .expect("program should build")
    }

    #[test]
    fn use_program_makes_it_current() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        assert!(program.is_linked());
        assert!(program.diagnostics().is_empty());

        program.use_program();
        assert_eq!(ctx.current_program(), Some(program.handle()));
    }

    #[test]
    fn setters_reach_the_current_program() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        program.use_program();

        program.set_float("u_time", 1.5);
        program.set_int("u_mode", 3);
        program.set_bool("u_debug", true);
        program.set_vec3("u_tint", Vec3::new(0.25, 0.5, 1.0));
        program.set_mat4("u_mvp", Mat4::from_scale(Vec3::splat(2.0)));

        let id = program.handle();
        assert_eq!(ctx.uniform_f32s(id, "u_time"), Some(vec![1.5]));
        assert_eq!(ctx.uniform_i32s(id, "u_mode"), Some(vec![3]));
        assert_eq!(ctx.uniform_i32s(id, "u_debug"), Some(vec![1]));
        assert_eq!(ctx.uniform_f32s(id, "u_tint"), Some(vec![0.25, 0.5, 1.0]));
        assert_eq!(
            ctx.uniform_f32s(id, "u_mvp"),
            Some(Mat4::from_scale(Vec3::splat(2.0)).to_cols_array().to_vec())
        );
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn unknown_uniform_is_ignored() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        program.use_program();
        program.set_float("u_time", 4.0);

        program.set_float("u_missing", 9.0);
        program.set_vec2("u_missing_too", [1.0, 2.0]);

        assert!(program.uniform_location("u_missing").is_none());
        assert_eq!(ctx.uniform_f32s(program.handle(), "u_time"), Some(vec![4.0]));
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn location_setters_match_named_ones() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        program.use_program();

        let time = program.uniform_location("u_time");
        assert!(time.is_some());
        program.set_float_at(time.as_ref(), 2.5);

        let mut out = [0.0];
        assert!(program.read_uniform_f32("u_time", &mut out));
        assert_eq!(out, [2.5]);

        program.set_int_at(None, 7);
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn read_back_reports_missing_uniforms() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        program.use_program();
        program.set_int("u_mode", 5);

        let mut ints = [0];
        assert!(program.read_uniform_i32("u_mode", &mut ints));
        assert_eq!(ints, [5]);

        let mut floats = [42.0];
        assert!(!program.read_uniform_f32("u_nothing", &mut floats));
        assert_eq!(floats, [42.0]);
    }

    #[test]
    fn name_lookups_are_cached() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        program.use_program();

        for frame in 0..10 {
            program.set_float("u_time", frame as f32);
            program.set_float("u_missing", 1.0);
        }
        assert_eq!(ctx.location_queries(), 2);
    }

    #[test]
    fn cache_can_be_disabled() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default().with_uniform_cache(false));
        program.use_program();

        for frame in 0..4 {
            program.set_float("u_time", frame as f32);
        }
        assert_eq!(ctx.location_queries(), 4);
    }

    #[test]
    fn geometry_stage_only_when_given() {
        let ctx = Rc::new(MockContext::new());
        let plain = build(&ctx, ProgramOptions::default());
        assert_eq!(
            ctx.attached_stages(plain.handle()),
            vec![StageKind::Vertex, StageKind::Fragment]
        );
        assert!(!ctx.created_stages().contains(&StageKind::Geometry));

        let full = ShaderProgram::from_strings(
            ctx.clone(),
            VERTEX,
            FRAGMENT,
            Some(GEOMETRY),
            ProgramOptions::default(),
        )
        .unwrap();
        assert_eq!(
            ctx.attached_stages(full.handle()),
            vec![StageKind::Vertex, StageKind::Fragment, StageKind::Geometry]
        );
        assert!(full.uniform_location("u_spread").is_some());
    }

    #[test]
    fn stage_objects_are_released_after_build() {
        let ctx = Rc::new(MockContext::new());
        let _program = ShaderProgram::from_strings(
            ctx.clone(),
            VERTEX,
            FRAGMENT,
            Some(GEOMETRY),
            ProgramOptions::default(),
        )
        .unwrap();
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_programs(), 1);
    }

    #[test]
    fn strict_build_reports_compile_failure() {
        let ctx = Rc::new(MockContext::new());
        let err = ShaderProgram::from_strings(
            ctx.clone(),
            BROKEN,
            FRAGMENT,
            None,
            ProgramOptions::default(),
        )
        .unwrap_err();

        match err {
            ShaderError::Compile { kind, log } => {
                assert_eq!(kind, StageKind::Vertex);
                assert!(log.contains("missing semicolon"), "{log}");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The fragment stage was still compiled and reported.
        assert_eq!(
            ctx.created_stages(),
            vec![StageKind::Vertex, StageKind::Fragment]
        );
        assert_eq!(ctx.live_programs(), 0);
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn strict_build_reports_link_failure() {
        let ctx = Rc::new(MockContext::new());
        let fragment = "uniform int u_time;\nvoid main() {}\n";
        let err = ShaderProgram::from_strings(
            ctx.clone(),
            VERTEX,
            fragment,
            None,
            ProgramOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ShaderError::Link { ref log } if log.contains("u_time")));
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn best_effort_keeps_unlinked_program() {
        let ctx = Rc::new(MockContext::new());
        let program = ShaderProgram::from_strings(
            ctx.clone(),
            VERTEX,
            BROKEN,
            None,
            ProgramOptions::default().with_policy(FailurePolicy::BestEffort),
        )
        .unwrap();

        assert!(!program.is_linked());
        let kinds: Vec<_> = program.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::Fragment, DiagnosticKind::Program]);
        assert!(program.diagnostics()[0].to_string().starts_with("[FRAGMENT]"));

        program.set_float("u_time", 1.0);
        assert!(program.uniform_location("u_time").is_none());
        assert!(program.attribute_location("a_position").is_none());
        assert_eq!(ctx.error_count(), 0);
        assert_eq!(ctx.live_programs(), 1);
    }

    #[test]
    fn component_tuples_fill_vectors() {
        let ctx = Rc::new(MockContext::new());
        let fragment = "uniform vec2 u_a;\nuniform vec3 u_b;\nuniform vec4 u_c;\nvoid main() {}\n";
        let program =
            ShaderProgram::from_strings(ctx.clone(), VERTEX, fragment, None, Default::default())
                .unwrap();
        program.use_program();

        program.set_vec2("u_a", (1.0, 2.0));
        program.set_vec3("u_b", (1.0, 2.0, 3.0));
        program.set_vec4("u_c", (1.0, 2.0, 3.0, 4.0));

        let id = program.handle();
        assert_eq!(ctx.uniform_f32s(id, "u_a"), Some(vec![1.0, 2.0]));
        assert_eq!(ctx.uniform_f32s(id, "u_b"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(ctx.uniform_f32s(id, "u_c"), Some(vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn layout_location_beats_bound_attribute() {
        let ctx = Rc::new(MockContext::new());
        let vertex = "layout(location = 0) in vec2 a_position;\nvoid main() {}\n";
        let program = ProgramBuilder::new(ShaderSource::from_strings(vertex, FRAGMENT, None))
            .bind_attribute("a_position", 2)
            .build(ctx.clone())
            .unwrap();

        assert_eq!(program.attribute_location("a_position"), Some(0));
    }

    #[test]
    fn builder_binds_attributes_before_link() {
        let ctx = Rc::new(MockContext::new());
        let program = ProgramBuilder::new(ShaderSource::from_strings(VERTEX, FRAGMENT, None))
            .bind_attribute("a_uv", 0)
            .bind_attribute("a_position", 3)
            .label("quad")
            .build(ctx.clone())
            .unwrap();

        assert_eq!(program.label(), "quad");
        assert_eq!(program.attribute_location("a_uv"), Some(0));
        assert_eq!(program.attribute_location("a_position"), Some(3));
    }

    #[test]
    fn bind_attribute_applies_on_relink() {
        let ctx = Rc::new(MockContext::new());
        let mut program = build(&ctx, ProgramOptions::default());
        assert_eq!(program.attribute_location("a_position"), Some(0));

        program.bind_attribute("a_position", 5);
        assert_eq!(program.attribute_location("a_position"), Some(0));

        program.relink().unwrap();
        assert!(program.is_linked());
        assert_eq!(program.attribute_location("a_position"), Some(5));
        assert_eq!(program.attribute_location("a_uv"), Some(0));
    }

    #[test]
    fn relink_drops_cached_locations() {
        let ctx = Rc::new(MockContext::new());
        let mut program = build(&ctx, ProgramOptions::default());
        program.uniform_location("u_time");
        program.uniform_location("u_time");
        assert_eq!(ctx.location_queries(), 1);

        program.relink().unwrap();
        program.uniform_location("u_time");
        assert_eq!(ctx.location_queries(), 2);
    }

    #[test]
    fn drop_deletes_the_program() {
        let ctx = Rc::new(MockContext::new());
        let program = build(&ctx, ProgramOptions::default());
        assert_eq!(ctx.live_programs(), 1);
        drop(program);
        assert_eq!(ctx.live_programs(), 0);
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn rebuild_swaps_program_and_keeps_bindings() {
        let ctx = Rc::new(MockContext::new());
        let mut program = ProgramBuilder::new(ShaderSource::from_strings(VERTEX, FRAGMENT, None))
            .bind_attribute("a_uv", 0)
            .build(ctx.clone())
            .unwrap();
        let before = program.handle();
        program.uniform_location("u_time");

        let fragment = "uniform float u_time;\nuniform vec4 u_fade;\nvoid main() {}\n";
        program
            .rebuild(&ShaderSource::from_strings(VERTEX, fragment, None))
            .unwrap();

        assert_ne!(program.handle(), before);
        assert_eq!(ctx.live_programs(), 1);
        assert_eq!(program.attribute_location("a_uv"), Some(0));
        assert!(program.uniform_location("u_fade").is_some());
        assert!(program.uniform_location("u_tint").is_none());
        // u_time was looked up again on the new program.
        program.uniform_location("u_time");
        assert_eq!(ctx.location_queries(), 4);
    }

    #[test]
    fn failed_strict_rebuild_keeps_old_program() {
        let ctx = Rc::new(MockContext::new());
        let mut program = build(&ctx, ProgramOptions::default());
        let before = program.handle();

        let err = program
            .rebuild(&ShaderSource::from_strings(BROKEN, FRAGMENT, None))
            .unwrap_err();
        assert!(matches!(err, ShaderError::Compile { kind: StageKind::Vertex, .. }));
        assert_eq!(program.handle(), before);
        assert!(program.is_linked());
        assert_eq!(ctx.live_programs(), 1);
    }

    #[test]
    fn rebuild_of_current_program_defers_deletion() {
        let ctx = Rc::new(MockContext::new());
        let mut program = build(&ctx, ProgramOptions::default());
        program.use_program();

        program
            .rebuild(&ShaderSource::from_strings(VERTEX, FRAGMENT, None))
            .unwrap();
        assert_eq!(ctx.live_programs(), 1);

        program.use_program();
        assert_eq!(ctx.current_program(), Some(program.handle()));
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn inline_programs_cannot_reload() {
        let ctx = Rc::new(MockContext::new());
        let mut program = build(&ctx, ProgramOptions::default().with_label("inline-test"));
        let err = program.reload().unwrap_err();
        assert!(matches!(err, ShaderError::NotReloadable(ref label) if label == "inline-test"));
    }

    #[test]
    fn uploads_follow_the_current_program() {
        let ctx = Rc::new(MockContext::new());
        let first = build(&ctx, ProgramOptions::default());
        let second = build(&ctx, ProgramOptions::default());

        second.use_program();
        first.set_float("u_time", 8.0);

        assert_eq!(ctx.uniform_f32s(second.handle(), "u_time"), Some(vec![8.0]));
        assert_eq!(ctx.uniform_f32s(first.handle(), "u_time"), Some(vec![0.0]));
    }
}
