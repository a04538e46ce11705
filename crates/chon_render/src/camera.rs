//! Fixed 2D camera in screen coordinates: the projection maps the world
//! rectangle `[0, world_w] x [0, world_h]` onto the full viewport with y
//! growing downward, so world positions are plain window-style pixels.

use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub struct Camera2D {
    pub world_size: (f32, f32),
}

impl Camera2D {
    pub fn new(world_w: f32, world_h: f32) -> Self {
        Self {
            world_size: (world_w, world_h),
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        // bottom/top are swapped relative to the usual ortho call so that
        // world y = 0 lands at the top of the screen.
        let proj = Mat4::orthographic_rh(
            0.0,
            self.world_size.0,
            self.world_size.1,
            0.0,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}
