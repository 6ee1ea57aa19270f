//! The fullscreen quad every frame is drawn with.

use std::rc::Rc;

use anyhow::anyhow;
use bytemuck::{Pod, Zeroable};
use glow::HasContext;
use log::debug;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Clip space corners, in triangle strip order.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
    },
];

/// A vertex array holding [`QUAD_VERTICES`] at attribute [`FullscreenQuad::POSITION_ATTRIBUTE`].
pub struct FullscreenQuad {
    gl: Rc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

impl FullscreenQuad {
    /// The attribute index the vertex positions are fed to. Shaders must bind `a_position` here.
    pub const POSITION_ATTRIBUTE: u32 = 0;

    pub fn new(gl: Rc<glow::Context>) -> anyhow::Result<Self> {
        let (vao, vbo) = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| anyhow!("Failed to create vertex array: {e}"))?;
            let vbo = gl
                .create_buffer()
                .map_err(|e| anyhow!("Failed to create vertex buffer: {e}"))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(Self::POSITION_ATTRIBUTE);
            gl.vertex_attrib_pointer_f32(
                Self::POSITION_ATTRIBUTE,
                2,
                glow::FLOAT,
                false,
                size_of::<QuadVertex>() as i32,
                0,
            );
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            (vao, vbo)
        };
        debug!("Created fullscreen quad");

        Ok(Self { gl, vao, vbo })
    }

    /// Draws the quad with whatever program is current.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_arrays(glow::TRIANGLE_STRIP, 0, QUAD_VERTICES.len() as i32);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for FullscreenQuad {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
        }
    }
}
