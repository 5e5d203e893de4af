use glyphon::{
    Attrs, Buffer, Cache, Color as GlyphonColor, Family, FontSystem, Metrics, Resolution, Shaping,
    SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};
use wgpu::{Device, MultisampleState, Queue};

use super::frame::LINE_HEIGHT;
use super::types::Color;

/// A single run of text to draw, in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub position: (f32, f32),
    pub color: Color,
}

/// Glyph atlas plus one glyphon renderer per text batch.
///
/// Text is drawn in batches interleaved with rectangle batches so a
/// window's text never shows through a window stacked above it.
pub struct TextRenderState {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderers: Vec<TextRenderer>,
    viewport: Viewport,
    prepared: usize,
}

impl TextRenderState {
    pub fn new(device: &Device, queue: &Queue, format: wgpu::TextureFormat) -> Self {
        let cache = Cache::new(device);
        let atlas = TextAtlas::new(device, queue, &cache, format);
        let viewport = Viewport::new(device, &cache);

        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            atlas,
            renderers: Vec::new(),
            viewport,
            prepared: 0,
        }
    }

    /// Shape and upload every batch. Batch `i` is later drawn by
    /// [`render_batch`](Self::render_batch) with the same index.
    pub fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        batches: &[Vec<TextRun>],
        screen_width: u32,
        screen_height: u32,
        scale_factor: f32,
    ) {
        self.viewport.update(
            queue,
            Resolution {
                width: screen_width,
                height: screen_height,
            },
        );

        while self.renderers.len() < batches.len() {
            self.renderers.push(TextRenderer::new(
                &mut self.atlas,
                device,
                MultisampleState::default(),
                None,
            ));
        }

        let font_size = LINE_HEIGHT * scale_factor;
        for (renderer, runs) in self.renderers.iter_mut().zip(batches) {
            let buffers: Vec<Buffer> = runs
                .iter()
                .map(|run| {
                    let mut buffer =
                        Buffer::new(&mut self.font_system, Metrics::new(font_size, font_size));
                    buffer.set_size(&mut self.font_system, None, Some(font_size * 2.0));
                    buffer.set_text(
                        &mut self.font_system,
                        &run.text,
                        &Attrs::new().family(Family::Monospace),
                        Shaping::Basic,
                        None,
                    );
                    buffer.shape_until_scroll(&mut self.font_system, false);
                    buffer
                })
                .collect();

            let areas = runs.iter().zip(buffers.iter()).map(|(run, buffer)| TextArea {
                buffer,
                left: run.position.0 * scale_factor,
                top: run.position.1 * scale_factor,
                scale: 1.0,
                bounds: TextBounds {
                    left: 0,
                    top: 0,
                    right: screen_width as i32,
                    bottom: screen_height as i32,
                },
                default_color: to_glyphon(run.color),
                custom_glyphs: &[],
            });

            if let Err(e) = renderer.prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                areas,
                &mut self.swash_cache,
            ) {
                log::error!("Text prepare failed: {:?}", e);
            }
        }
        self.prepared = batches.len();
    }

    pub fn render_batch(&self, index: usize, pass: &mut wgpu::RenderPass<'_>) {
        if index >= self.prepared {
            return;
        }
        if let Some(renderer) = self.renderers.get(index) {
            if let Err(e) = renderer.render(&self.atlas, &self.viewport, pass) {
                log::error!("Text render failed: {:?}", e);
            }
        }
    }

    /// Drop glyphs that were not used by the last frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

fn to_glyphon(color: Color) -> GlyphonColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    GlyphonColor::rgba(
        channel(color.r),
        channel(color.g),
        channel(color.b),
        channel(color.a),
    )
}
