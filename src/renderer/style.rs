use super::types::Color;

/// A colour slot of the renderer's style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSlot {
    Text,
    TextDisabled,
    WindowBg,
    PopupBg,
    Border,
    FrameBg,
    FrameBgHovered,
    FrameBgActive,
    TitleBg,
    TitleBgActive,
    CheckMark,
    Button,
    ButtonHovered,
    ButtonActive,
    Header,
    HeaderHovered,
    HeaderActive,
}

impl StyleSlot {
    pub const COUNT: usize = 17;

    pub const ALL: [StyleSlot; Self::COUNT] = [
        StyleSlot::Text,
        StyleSlot::TextDisabled,
        StyleSlot::WindowBg,
        StyleSlot::PopupBg,
        StyleSlot::Border,
        StyleSlot::FrameBg,
        StyleSlot::FrameBgHovered,
        StyleSlot::FrameBgActive,
        StyleSlot::TitleBg,
        StyleSlot::TitleBgActive,
        StyleSlot::CheckMark,
        StyleSlot::Button,
        StyleSlot::ButtonHovered,
        StyleSlot::ButtonActive,
        StyleSlot::Header,
        StyleSlot::HeaderHovered,
        StyleSlot::HeaderActive,
    ];

    /// Slot for a numeric index, as a binding layer passes it.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Base colours used when no override is pushed for a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    colors: [Color; StyleSlot::COUNT],
}

impl Theme {
    /// The default dark theme.
    pub fn dark() -> Self {
        let mut colors = [Color::TRANSPARENT; StyleSlot::COUNT];
        let mut set = |slot: StyleSlot, color: Color| colors[slot.index()] = color;
        set(StyleSlot::Text, Color::WHITE);
        set(StyleSlot::TextDisabled, Color::rgb(0.5, 0.5, 0.5));
        set(StyleSlot::WindowBg, Color::rgba(0.06, 0.06, 0.06, 0.94));
        set(StyleSlot::PopupBg, Color::rgba(0.08, 0.08, 0.08, 0.94));
        set(StyleSlot::Border, Color::rgba(0.43, 0.43, 0.50, 0.50));
        set(StyleSlot::FrameBg, Color::rgba(0.16, 0.29, 0.48, 0.54));
        set(StyleSlot::FrameBgHovered, Color::rgba(0.26, 0.59, 0.98, 0.40));
        set(StyleSlot::FrameBgActive, Color::rgba(0.26, 0.59, 0.98, 0.67));
        set(StyleSlot::TitleBg, Color::rgb(0.04, 0.04, 0.04));
        set(StyleSlot::TitleBgActive, Color::rgb(0.16, 0.29, 0.48));
        set(StyleSlot::CheckMark, Color::rgb(0.26, 0.59, 0.98));
        set(StyleSlot::Button, Color::rgba(0.26, 0.59, 0.98, 0.40));
        set(StyleSlot::ButtonHovered, Color::rgb(0.26, 0.59, 0.98));
        set(StyleSlot::ButtonActive, Color::rgb(0.06, 0.53, 0.98));
        set(StyleSlot::Header, Color::rgba(0.26, 0.59, 0.98, 0.31));
        set(StyleSlot::HeaderHovered, Color::rgba(0.26, 0.59, 0.98, 0.80));
        set(StyleSlot::HeaderActive, Color::rgb(0.26, 0.59, 0.98));
        Self { colors }
    }

    pub fn color(&self, slot: StyleSlot) -> Color {
        self.colors[slot.index()]
    }

    pub fn set_color(&mut self, slot: StyleSlot, color: Color) {
        self.colors[slot.index()] = color;
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
