//! Per-frame uniforms the viewer feeds every program.

use glam::{Mat4, Vec2, Vec3};

use engine::graphics::{GraphicsContext, ShaderProgram};

/// Locations of the uniforms uploaded every frame, looked up once per build.
#[derive(Debug)]
pub struct FrameUniforms<L> {
    time: Option<L>,
    resolution: Option<L>,
    mvp: Option<L>,
}

impl<L: Clone> FrameUniforms<L> {
    pub fn locate<C>(program: &ShaderProgram<C>) -> Self
    where
        C: GraphicsContext<UniformLocation = L>,
    {
        Self {
            time: program.uniform_location("u_time"),
            resolution: program.uniform_location("u_resolution"),
            mvp: program.uniform_location("u_mvp"),
        }
    }

    /// Uploads the frame's values to `program`, which must be current.
    pub fn upload<C>(&self, program: &ShaderProgram<C>, time: f32, size: (u32, u32))
    where
        C: GraphicsContext<UniformLocation = L>,
    {
        program.set_float_at(self.time.as_ref(), time);
        program.set_vec2_at(
            self.resolution.as_ref(),
            Vec2::new(size.0 as f32, size.1 as f32),
        );
        program.set_mat4_at(self.mvp.as_ref(), Mat4::IDENTITY);
        program.set_vec3("u_tint", tint(time));
    }
}

/// A slowly cycling color.
pub fn tint(time: f32) -> Vec3 {
    Vec3::new(
        0.75 + 0.25 * time.sin(),
        0.75 + 0.25 * (time * 0.7).sin(),
        0.75 + 0.25 * (time * 1.3).sin(),
    )
}
