//! Turns a recorded [`Frame`] into pixels on a wgpu surface.
//!
//! Rectangles go through one instanced draw per batch. A new batch starts
//! whenever a rectangle follows text, so text and shapes keep the frame's
//! back-to-front order.

use std::ops::Range;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Queue, RenderPipeline, ShaderModule,
};

use crate::error::PlatformError;

use super::commands::{DrawCommand, Frame};
use super::gpu::{QuadVertex, RectInstance, ShaderUniforms, QUAD_INDICES, QUAD_VERTICES};
use super::gpu_context::SurfaceState;
use super::text::{TextRenderState, TextRun};
use super::types::Color;

/// Draw-order batches of a frame.
#[derive(Debug, Default, PartialEq)]
pub struct Batches {
    pub instances: Vec<RectInstance>,
    /// Instance range of each batch
    pub rects: Vec<Range<u32>>,
    /// Text runs of each batch, drawn after its rectangles
    pub texts: Vec<Vec<TextRun>>,
}

impl Batches {
    pub fn from_frame(frame: &Frame) -> Self {
        let mut batches = Batches::default();
        let mut start = 0u32;
        let mut texts: Vec<TextRun> = Vec::new();

        for command in &frame.commands {
            match command {
                DrawCommand::Rect { rect, color } => {
                    if !texts.is_empty() {
                        let end = batches.instances.len() as u32;
                        batches.rects.push(start..end);
                        batches.texts.push(std::mem::take(&mut texts));
                        start = end;
                    }
                    if rect.width > 0.0 && rect.height > 0.0 && color.a > 0.0 {
                        batches.instances.push(RectInstance::new(*rect, *color));
                    }
                }
                DrawCommand::Text {
                    text,
                    position,
                    color,
                } => texts.push(TextRun {
                    text: text.clone(),
                    position: *position,
                    color: *color,
                }),
            }
        }

        let end = batches.instances.len() as u32;
        if end > start || !texts.is_empty() {
            batches.rects.push(start..end);
            batches.texts.push(texts);
        }
        batches
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

pub struct Presenter {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    instance_buffer: Buffer,
    instance_capacity: usize,
    text: TextRenderState,
    scale_factor: f32,
}

impl Presenter {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rect Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("rects.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Rect Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline = Self::create_pipeline(&device, &shader, &bind_group_layout, format);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rect Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rect Index Buffer"),
            contents: bytemuck::cast_slice(QUAD_INDICES),
            usage: BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rect Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ShaderUniforms::new(800.0, 600.0, 1.0)]),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Rect Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let instance_capacity = 256;
        let instance_buffer = Self::create_instance_buffer(&device, instance_capacity);
        let text = TextRenderState::new(&device, &queue, format);

        Self {
            device,
            queue,
            pipeline,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity,
            text,
            scale_factor: 1.0,
        }
    }

    fn create_pipeline(
        device: &Device,
        shader: &ShaderModule,
        bind_group_layout: &BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rect Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rect Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::desc(), RectInstance::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Rect Instance Buffer"),
            size: (capacity * std::mem::size_of::<RectInstance>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn set_scale_factor(&mut self, scale: f32) {
        self.scale_factor = scale;
    }

    fn ensure_instance_capacity(&mut self, count: usize) {
        if count > self.instance_capacity {
            let capacity = (self.instance_capacity * 2).max(count);
            self.instance_buffer = Self::create_instance_buffer(&self.device, capacity);
            self.instance_capacity = capacity;
        }
    }

    /// Clear the surface to `clear_color`, draw `frame` and present it.
    ///
    /// A lost or outdated surface is reconfigured and the frame dropped.
    pub fn render(
        &mut self,
        surface: &mut SurfaceState,
        frame: &Frame,
        clear_color: Color,
    ) -> Result<(), PlatformError> {
        let output = match surface.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the next surface texture");
                return Ok(());
            }
            Err(e) => return Err(PlatformError::Present(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (width, height) = frame.display_size;
        let uniforms = ShaderUniforms::new(width.max(1.0), height.max(1.0), self.scale_factor);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let batches = Batches::from_frame(frame);
        self.ensure_instance_capacity(batches.instances.len());
        if !batches.instances.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&batches.instances),
            );
        }
        self.text.prepare(
            &self.device,
            &self.queue,
            &batches.texts,
            surface.width(),
            surface.height(),
            self.scale_factor,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_color.r as f64,
                            g: clear_color.g as f64,
                            b: clear_color.b as f64,
                            a: clear_color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (index, range) in batches.rects.iter().enumerate() {
                if !range.is_empty() {
                    render_pass.set_pipeline(&self.pipeline);
                    render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    render_pass.draw_indexed(0..6, 0, range.clone());
                }
                self.text.render_batch(index, &mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.text.trim();
        Ok(())
    }
}
