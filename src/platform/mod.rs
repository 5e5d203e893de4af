//! Platform adapter boundary: window, event polling and presentation.
//!
//! The render loop is written once against [`Platform`]; each windowing
//! system provides an adapter.

pub mod headless;
pub mod wayland;

pub use headless::{HeadlessPlatform, HeadlessRecord};
pub use wayland::WaylandPlatform;

use crate::error::PlatformError;
use crate::renderer::{Color, Frame};
use crate::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

/// Input and window events reported by a platform adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Pointer moved, in surface coordinates
    PointerMoved { x: f32, y: f32 },
    /// Pointer left the surface
    PointerLeft,
    /// Mouse button pressed or released
    PointerButton { button: MouseButton, pressed: bool },
    /// The surface was resized (logical pixels)
    Resized { width: u32, height: u32 },
    /// Keyboard focus entered or left the surface
    Focus(bool),
    /// The user asked to close the window
    CloseRequested,
}

/// A windowing system adapter.
///
/// `poll_events` must never block; it returns whatever is queued.
pub trait Platform {
    /// Create the window and its graphics context.
    fn create(config: &AppConfig) -> Result<Self, PlatformError>
    where
        Self: Sized;

    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>, PlatformError>;

    /// Current framebuffer size in logical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Clear to `clear_color`, draw the frame and present it.
    fn present(&mut self, frame: &Frame, clear_color: Color) -> Result<(), PlatformError>;

    /// Release the window, graphics context and platform resources.
    fn shutdown(&mut self);
}
