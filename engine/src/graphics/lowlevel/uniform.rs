//! Values that can be uploaded to shader uniforms.

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::graphics::lowlevel::context::GraphicsContext;

trait Sealed {}

/// A value with a matching driver upload call.
///
/// Uploads always target the program that is current on the context.
#[allow(private_bounds)]
pub trait Uniform: Sealed {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>);
}

// scalars

impl Sealed for bool {}
impl Uniform for bool {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>) {
        ctx.uniform_1_i32(location, i32::from(*self));
    }
}

impl Sealed for i32 {}
impl Uniform for i32 {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>) {
        ctx.uniform_1_i32(location, *self);
    }
}

impl Sealed for f32 {}
impl Uniform for f32 {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>) {
        ctx.uniform_1_f32(location, *self);
    }
}

impl Sealed for [i32] {}
impl Uniform for [i32] {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>) {
        ctx.uniform_1_i32_slice(location, self);
    }
}

impl Sealed for [f32] {}
impl Uniform for [f32] {
    fn upload<C: GraphicsContext + ?Sized>(&self, ctx: &C, location: Option<&C::UniformLocation>) {
        ctx.uniform_1_f32_slice(location, self);
    }
}

/// Implements [`Uniform`] for a glam type and for slices of it (uniform arrays).
macro_rules! glam_uniform {
    // matrices are uploaded column-major, untransposed
    (matrix $ty: ty, $call: ident) => {
        impl Sealed for $ty {}
        impl Uniform for $ty {
            fn upload<C: GraphicsContext + ?Sized>(
                &self,
                ctx: &C,
                location: Option<&C::UniformLocation>,
            ) {
                ctx.$call(location, false, &self.to_cols_array());
            }
        }

        impl Sealed for [$ty] {}
        impl Uniform for [$ty] {
            fn upload<C: GraphicsContext + ?Sized>(
                &self,
                ctx: &C,
                location: Option<&C::UniformLocation>,
            ) {
                let columns: Vec<f32> = self.iter().flat_map(|m| m.to_cols_array()).collect();
                ctx.$call(location, false, &columns);
            }
        }
    };

    ($ty: ty, $call: ident) => {
        impl Sealed for $ty {}
        impl Uniform for $ty {
            fn upload<C: GraphicsContext + ?Sized>(
                &self,
                ctx: &C,
                location: Option<&C::UniformLocation>,
            ) {
                ctx.$call(location, bytemuck::cast_slice(std::slice::from_ref(self)));
            }
        }

        impl Sealed for [$ty] {}
        impl Uniform for [$ty] {
            fn upload<C: GraphicsContext + ?Sized>(
                &self,
                ctx: &C,
                location: Option<&C::UniformLocation>,
            ) {
                ctx.$call(location, bytemuck::cast_slice(self));
            }
        }
    };
}

glam_uniform!(Vec2, uniform_2_f32_slice);
glam_uniform!(Vec3, uniform_3_f32_slice);
glam_uniform!(Vec4, uniform_4_f32_slice);
glam_uniform!(matrix Mat2, uniform_matrix_2_f32_slice);
glam_uniform!(matrix Mat3, uniform_matrix_3_f32_slice);
glam_uniform!(matrix Mat4, uniform_matrix_4_f32_slice);
