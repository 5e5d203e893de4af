// ============================================================================
// Render Loop
// ============================================================================
//
// Owns the platform adapter and the frame recorder, and runs the per-frame
// sequence: poll input, begin frame, run the view hooks, end frame, present.

use crate::error::PlatformError;
use crate::input::InputState;
use crate::platform::{Platform, PlatformEvent};
use crate::renderer::{Color, FrameRenderer, Theme};
use crate::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    ShuttingDown,
}

/// What a view gets to work with during one frame phase.
pub struct FrameContext<'a> {
    pub ui: &'a mut FrameRenderer,
    pub input: &'a mut InputState,
    pub display_size: (f32, f32),
    /// Zero-based index of the frame being built
    pub frame: u64,
}

/// Per-frame hooks, invoked in `prerender`, `render`, `postrender` order
/// between the renderer's `new_frame` and `end_frame`.
pub trait FrameHooks {
    fn prerender(&mut self, ctx: &mut FrameContext<'_>);
    fn render(&mut self, ctx: &mut FrameContext<'_>);
    fn postrender(&mut self, ctx: &mut FrameContext<'_>);
}

pub struct RenderLoop<P: Platform> {
    platform: Option<P>,
    renderer: FrameRenderer,
    input: InputState,
    clear_color: Color,
    state: LoopState,
    running: bool,
    frames: u64,
}

impl<P: Platform> RenderLoop<P> {
    pub fn new() -> Self {
        Self {
            platform: None,
            renderer: FrameRenderer::default(),
            input: InputState::new(),
            clear_color: Color::BLACK,
            state: LoopState::Uninitialized,
            running: false,
            frames: 0,
        }
    }

    /// Create the platform adapter for `config` and start running.
    pub fn initialize(&mut self, config: &AppConfig) -> Result<(), PlatformError> {
        let platform = P::create(config)?;
        self.initialize_with(platform, config);
        Ok(())
    }

    /// Start running on an adapter created by the caller.
    pub fn initialize_with(&mut self, platform: P, config: &AppConfig) {
        if self.state != LoopState::Uninitialized {
            log::warn!("Render loop initialized twice, ignoring");
            return;
        }
        let (width, height) = platform.framebuffer_size();
        log::info!("Render loop started at {}x{}", width, height);

        self.platform = Some(platform);
        self.renderer.set_theme(Theme::dark());
        self.clear_color = config.clear_color;
        self.state = LoopState::Running;
        self.running = true;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running && self.running
    }

    /// Ask the loop to stop after the current frame.
    pub fn request_close(&mut self) {
        self.running = false;
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn platform(&self) -> Option<&P> {
        self.platform.as_ref()
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Build and present one frame.
    ///
    /// A close request stops the loop, but the frame it arrived in is
    /// still completed and presented.
    pub fn run_frame(&mut self, hooks: &mut dyn FrameHooks) -> Result<(), PlatformError> {
        let Some(platform) = self.platform.as_mut() else {
            log::warn!("run_frame called while {:?}", self.state);
            return Ok(());
        };

        let events = platform.poll_events()?;
        self.input.begin_frame();
        for event in &events {
            if *event == PlatformEvent::CloseRequested {
                log::info!("Close requested, finishing frame {}", self.frames);
                self.running = false;
            }
            self.input.apply(event);
        }

        let (width, height) = platform.framebuffer_size();
        let display_size = (width as f32, height as f32);
        log::trace!("Frame {} at {}x{}", self.frames, width, height);

        self.renderer.new_frame(&self.input, display_size);
        {
            let mut ctx = FrameContext {
                ui: &mut self.renderer,
                input: &mut self.input,
                display_size,
                frame: self.frames,
            };
            hooks.prerender(&mut ctx);
            hooks.render(&mut ctx);
            hooks.postrender(&mut ctx);
        }
        let frame = self.renderer.end_frame();

        platform.present(&frame, self.clear_color)?;
        self.frames += 1;
        Ok(())
    }

    /// Run frames until a close request, then shut down.
    pub fn run(&mut self, hooks: &mut dyn FrameHooks) -> Result<(), PlatformError> {
        let result = loop {
            if !self.is_running() {
                break Ok(());
            }
            if let Err(e) = self.run_frame(hooks) {
                log::error!("Frame {} failed: {}", self.frames, e);
                break Err(e);
            }
        };
        self.shutdown();
        result
    }

    /// Release the renderer and the platform. Only the first call does
    /// anything.
    pub fn shutdown(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        self.state = LoopState::ShuttingDown;
        self.running = false;

        self.renderer.reset();
        if let Some(mut platform) = self.platform.take() {
            platform.shutdown();
        }
        log::info!("Render loop shut down after {} frame(s)", self.frames);
    }
}

impl<P: Platform> Default for RenderLoop<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> Drop for RenderLoop<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
