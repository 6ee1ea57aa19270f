use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine::{
    graphics::{
        FailurePolicy, ProgramOptions, ShaderSource, SourceError, lowlevel::shader::prefix_paths,
    },
    window::WindowConfig,
};

/// How build failures are handled, as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Refuse to start (or to reload) when a stage fails.
    #[default]
    Strict,
    /// Keep running with an unlinked program and log what went wrong.
    BestEffort,
}

impl From<Policy> for FailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Strict => FailurePolicy::Strict,
            Policy::BestEffort => FailurePolicy::BestEffort,
        }
    }
}

/// Draws a fullscreen quad with a shader program loaded from disk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Shader path prefix; `<PREFIX>.vs` and `<PREFIX>.fs` are loaded.
    #[arg(value_name = "PREFIX")]
    pub prefix: PathBuf,

    /// Optional geometry stage, compiled between the vertex and fragment stages.
    #[arg(short, long, value_name = "FILE")]
    pub geometry: Option<PathBuf>,

    /// Width of the window.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Height of the window.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// What to do when a stage fails to compile or the program fails to link.
    #[arg(long, value_enum, default_value_t = Policy::Strict)]
    pub policy: Policy,

    /// Look uniform locations up on every upload instead of remembering them.
    #[arg(long, default_value_t = false)]
    pub no_uniform_cache: bool,

    /// Swap buffers without waiting for vertical blank.
    #[arg(long, default_value_t = false)]
    pub no_vsync: bool,
}

impl Args {
    pub fn program_options(&self) -> ProgramOptions {
        ProgramOptions::default()
            .with_policy(self.policy.into())
            .with_uniform_cache(!self.no_uniform_cache)
    }

    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            width: self.width,
            height: self.height,
            title: format!("shaderview - {}", self.prefix.display()).into(),
            vsync: !self.no_vsync,
        }
    }

    /// Reads the shader sources named on the command line.
    pub fn source(&self) -> Result<ShaderSource, SourceError> {
        match &self.geometry {
            Some(geometry) => {
                let (vertex, fragment) = prefix_paths(&self.prefix);
                ShaderSource::from_paths(vertex, fragment, Some(geometry))
            }
            None => ShaderSource::from_prefix(&self.prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["shaderview", "shaders/plasma"]).unwrap();
        assert_eq!(args.prefix, PathBuf::from("shaders/plasma"));
        assert_eq!(args.geometry, None);
        assert_eq!((args.width, args.height), (800, 600));
        assert_eq!(args.program_options(), ProgramOptions::default());
        assert!(args.window_config().vsync);
    }

    #[test]
    fn test_best_effort_without_cache() {
        let args = Args::try_parse_from([
            "shaderview",
            "sky",
            "--policy",
            "best-effort",
            "--no-uniform-cache",
        ])
        .unwrap();
        let options = args.program_options();
        assert_eq!(options.policy, FailurePolicy::BestEffort);
        assert!(!options.cache_uniforms);
    }

    #[test]
    fn test_window_size() {
        let args = Args::try_parse_from([
            "shaderview",
            "sky",
            "--width",
            "1280",
            "--height",
            "720",
            "--no-vsync",
        ])
        .unwrap();
        let config = args.window_config();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(!config.vsync);
        assert!(config.title.ends_with("sky"));
    }

    #[test]
    fn test_prefix_required() {
        assert!(Args::try_parse_from(["shaderview"]).is_err());
    }

    #[test]
    fn test_geometry_reads_prefix_stages() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["wave.vs", "wave.fs", "wave.gs"] {
            std::fs::write(dir.path().join(name), "void main() {}").unwrap();
        }

        let prefix = dir.path().join("wave");
        let geometry = dir.path().join("wave.gs");
        let args = Args::try_parse_from([
            "shaderview",
            prefix.to_str().unwrap(),
            "--geometry",
            geometry.to_str().unwrap(),
        ])
        .unwrap();
        let source = args.source().unwrap();
        assert_eq!(source.geometry.as_deref(), Some("void main() {}"));
    }
}
