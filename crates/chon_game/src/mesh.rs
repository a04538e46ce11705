//! CPU-side sprite mesh rebuilt every frame and streamed into GPU buffers.
//! Quads are emitted back-to-front in world coordinates (top-left origin,
//! y down); draw calls are merged when consecutive quads share a texture so
//! a run of items bound to the same sprite collapses into one draw.

use chon_render::SpriteVertex;
use std::sync::Arc;

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

pub struct QuadSpec<'a> {
    pub texture_key: &'a str,
    /// Top-left corner in world pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
}

#[derive(Default)]
pub struct SpriteMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_quad(&mut self, spec: QuadSpec<'_>) {
        let left = spec.x;
        let right = spec.x + spec.width;
        let top = spec.y;
        let bottom = spec.y + spec.height;
        let base_index = self.vertices.len() as u32;

        // Texture v grows downward, matching the world's y axis.
        self.vertices.push(SpriteVertex {
            position: [left, top],
            tex_coords: [0.0, 0.0],
            color: spec.color,
        });
        self.vertices.push(SpriteVertex {
            position: [right, top],
            tex_coords: [1.0, 0.0],
            color: spec.color,
        });
        self.vertices.push(SpriteVertex {
            position: [right, bottom],
            tex_coords: [1.0, 1.0],
            color: spec.color,
        });
        self.vertices.push(SpriteVertex {
            position: [left, bottom],
            tex_coords: [0.0, 1.0],
            color: spec.color,
        });

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        self.push_draw_call(Arc::from(spec.texture_key), draw_start, 6);
    }

    /// Append a draw call, merging with the previous one when the texture
    /// matches and indices are contiguous.
    fn push_draw_call(&mut self, texture_key: Arc<str>, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if *last.texture_key == *texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key,
            index_start,
            index_count,
        });
    }
}
