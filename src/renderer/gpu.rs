//! Vertex and instance layouts for the rectangle pipeline.
//!
//! Every rectangle is one instance of a shared unit quad.

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use super::types::{Color, Rect};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    /// Screen size in logical pixels
    pub screen_size: [f32; 2],
    pub scale_factor: f32,
    pub _pad: f32,
}

impl ShaderUniforms {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            screen_size: [width, height],
            scale_factor,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: &[VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            }],
        }
    }
}

pub const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [0.0, 0.0] },
    QuadVertex { position: [1.0, 0.0] },
    QuadVertex { position: [0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0] },
];

pub const QUAD_INDICES: &[u16] = &[0, 1, 2, 1, 3, 2];

/// One solid rectangle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RectInstance {
    /// [x, y, width, height] in logical pixels
    pub rect: [f32; 4],
    /// Premultiplied by nothing; blended as straight alpha
    pub color: [f32; 4],
}

impl RectInstance {
    pub fn new(rect: Rect, color: Color) -> Self {
        Self {
            rect: [rect.x, rect.y, rect.width, rect.height],
            color: color.to_array(),
        }
    }

    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: VertexStepMode::Instance,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
        assert_eq!(std::mem::size_of::<ShaderUniforms>(), 16);
    }

    #[test]
    fn test_instance_from_rect() {
        let instance = RectInstance::new(Rect::new(1.0, 2.0, 3.0, 4.0), Color::WHITE);
        assert_eq!(instance.rect, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(instance.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
