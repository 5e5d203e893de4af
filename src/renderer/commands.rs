//! Draw command definitions produced by the frame recorder.

use super::types::{Color, Rect};

/// A single draw operation in screen coordinates (logical pixels).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Solid rectangle.
    Rect { rect: Rect, color: Color },

    /// A run of text starting at the given top-left position.
    Text {
        text: String,
        position: (f32, f32),
        color: Color,
    },
}

impl DrawCommand {
    pub fn rect(rect: Rect, color: Color) -> Self {
        Self::Rect { rect, color }
    }

    pub fn text(text: impl Into<String>, position: (f32, f32), color: Color) -> Self {
        Self::Text {
            text: text.into(),
            position,
            color,
        }
    }
}

/// Everything recorded between `new_frame` and `end_frame`, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub display_size: (f32, f32),
}

impl Frame {
    /// Iterate over solid rectangles in draw order.
    pub fn rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Rect { rect, color } => Some((*rect, *color)),
            DrawCommand::Text { .. } => None,
        })
    }

    /// Iterate over text runs in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Rect { .. } => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }
}
