//! Shader stage sources and stage objects.

use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, error};

use crate::graphics::lowlevel::{
    context::GraphicsContext,
    error::{ShaderError, SourceError},
};

/// One compilable unit of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
    Geometry,
}

impl StageKind {
    /// File extension used when sources are located through a path prefix.
    ///
    /// Geometry stages are never implied by a prefix, so they have none.
    pub const fn prefix_extension(&self) -> Option<&'static str> {
        match self {
            StageKind::Vertex => Some("vs"),
            StageKind::Fragment => Some("fs"),
            StageKind::Geometry => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => write!(f, "vertex"),
            StageKind::Fragment => write!(f, "fragment"),
            StageKind::Geometry => write!(f, "geometry"),
        }
    }
}

/// Where a [`ShaderSource`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// `<prefix>.vs` and `<prefix>.fs`.
    Prefix(PathBuf),
    Paths {
        vertex: PathBuf,
        fragment: PathBuf,
        geometry: Option<PathBuf>,
    },
    Inline,
}

/// The text of every stage of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
    origin: SourceOrigin,
}

impl ShaderSource {
    /// Reads `<prefix>.vs` and `<prefix>.fs`. No geometry stage is looked for.
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Result<Self, SourceError> {
        let prefix = prefix.as_ref();
        let (vertex_path, fragment_path) = prefix_paths(prefix);
        Ok(Self {
            vertex: read_stage(StageKind::Vertex, &vertex_path)?,
            fragment: read_stage(StageKind::Fragment, &fragment_path)?,
            geometry: None,
            origin: SourceOrigin::Prefix(prefix.to_owned()),
        })
    }

    /// Reads each stage from an explicit path. The geometry stage is only read when given.
    pub fn from_paths(
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> Result<Self, SourceError> {
        let (vertex, fragment) = (vertex.as_ref(), fragment.as_ref());
        Ok(Self {
            vertex: read_stage(StageKind::Vertex, vertex)?,
            fragment: read_stage(StageKind::Fragment, fragment)?,
            geometry: geometry
                .map(|path| read_stage(StageKind::Geometry, path))
                .transpose()?,
            origin: SourceOrigin::Paths {
                vertex: vertex.to_owned(),
                fragment: fragment.to_owned(),
                geometry: geometry.map(Path::to_owned),
            },
        })
    }

    /// Uses the given text directly.
    pub fn from_strings(
        vertex: impl Into<String>,
        fragment: impl Into<String>,
        geometry: Option<&str>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: geometry.map(str::to_owned),
            origin: SourceOrigin::Inline,
        }
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    /// Reads the sources again from the files they originally came from.
    ///
    /// Returns `None` for inline sources.
    pub fn reread(origin: &SourceOrigin) -> Option<Result<Self, SourceError>> {
        match origin {
            SourceOrigin::Prefix(prefix) => Some(Self::from_prefix(prefix)),
            SourceOrigin::Paths {
                vertex,
                fragment,
                geometry,
            } => Some(Self::from_paths(vertex, fragment, geometry.as_deref())),
            SourceOrigin::Inline => None,
        }
    }

    /// A human readable name for log lines.
    pub fn label(&self) -> String {
        match &self.origin {
            SourceOrigin::Prefix(prefix) => prefix.display().to_string(),
            SourceOrigin::Paths { vertex, .. } => vertex.display().to_string(),
            SourceOrigin::Inline => "<inline>".to_owned(),
        }
    }

    /// Every present stage, in the order they are compiled and attached.
    pub fn stages(&self) -> impl Iterator<Item = (StageKind, &str)> {
        [
            (StageKind::Vertex, Some(self.vertex.as_str())),
            (StageKind::Fragment, Some(self.fragment.as_str())),
            (StageKind::Geometry, self.geometry.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, text)| Some((kind, text?)))
    }
}

/// Returns the vertex and fragment paths a prefix expands to.
///
/// The extension is appended, so `shaders/sky.v2` becomes `shaders/sky.v2.vs`.
pub fn prefix_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_extension = |kind: StageKind| {
        let mut path = OsString::from(prefix.as_os_str());
        path.push(".");
        path.push(kind.prefix_extension().unwrap_or_default());
        PathBuf::from(path)
    };
    (
        with_extension(StageKind::Vertex),
        with_extension(StageKind::Fragment),
    )
}

fn read_stage(kind: StageKind, path: &Path) -> Result<String, SourceError> {
    debug!("Reading {} shader source {}", kind, path.display());
    std::fs::read_to_string(path).map_err(|io| {
        let err = SourceError::new(kind, path, io);
        error!("{err}");
        err
    })
}

/// A stage object that is released when dropped.
///
/// Dropping only flags the object for deletion, the driver keeps it alive while a program
/// still has it attached.
pub(crate) struct StageObject<'a, C: GraphicsContext + ?Sized> {
    ctx: &'a C,
    kind: StageKind,
    shader: C::Shader,
}

impl<'a, C: GraphicsContext + ?Sized> StageObject<'a, C> {
    /// Creates a stage object and compiles `source` into it.
    ///
    /// Only a failure to create the object is an error; compile failures are
    /// reported through [`Self::compiled`] and [`Self::info_log`].
    pub fn compile(ctx: &'a C, kind: StageKind, source: &str) -> Result<Self, ShaderError> {
        let shader = ctx
            .create_shader(kind)
            .map_err(|e| ShaderError::Driver(format!("creating {kind} shader: {e}")))?;
        ctx.shader_source(shader, source);
        ctx.compile_shader(shader);
        Ok(Self { ctx, kind, shader })
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn raw(&self) -> C::Shader {
        self.shader
    }

    pub fn compiled(&self) -> bool {
        self.ctx.shader_compile_status(self.shader)
    }

    pub fn info_log(&self) -> String {
        self.ctx.shader_info_log(self.shader)
    }
}

impl<C: GraphicsContext + ?Sized> Drop for StageObject<'_, C> {
    fn drop(&mut self) {
        self.ctx.delete_shader(self.shader);
    }
}
