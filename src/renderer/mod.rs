//! Immediate-mode frame recording and GPU presentation.

mod commands;
mod frame;
pub mod gpu;
pub mod gpu_context;
pub mod present;
mod style;
pub mod text;
mod types;

pub use commands::{DrawCommand, Frame};
pub use frame::{text_size, FrameRenderer, WindowOptions, CHAR_WIDTH, LINE_HEIGHT};
pub use gpu_context::{GpuContext, SurfaceState};
pub use present::Presenter;
pub use style::{StyleSlot, Theme};
pub use types::{Color, Rect};
