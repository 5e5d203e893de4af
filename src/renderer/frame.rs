//! Immediate-mode frame recorder.
//!
//! Every frame the tree calls into [`FrameRenderer`] in strict
//! `new_frame` -> widget calls -> `end_frame` order. Each widget call lays
//! the widget out, records its draw commands and returns the interaction
//! state for it. State that must survive between frames (window positions,
//! z-order, the active widget, open headers and popups) lives here too.

use std::collections::{HashMap, HashSet};

use crate::input::InputState;
use crate::item::ItemState;
use crate::platform::MouseButton;

use super::commands::{DrawCommand, Frame};
use super::style::{StyleSlot, Theme};
use super::types::{Color, Rect};

pub const CHAR_WIDTH: f32 = 7.0;
pub const LINE_HEIGHT: f32 = 13.0;
const FRAME_PADDING: (f32, f32) = (4.0, 3.0);
const ITEM_SPACING: (f32, f32) = (8.0, 4.0);
const WINDOW_PADDING: f32 = 8.0;
const INDENT_WIDTH: f32 = 21.0;
const TOOLTIP_OFFSET: (f32, f32) = (16.0, 10.0);
const DEFAULT_WINDOW_SIZE: (f32, f32) = (400.0, 300.0);
const WINDOW_CASCADE: f32 = 30.0;

/// Size of a run of text in the fixed-width layout font.
pub fn text_size(text: &str) -> (f32, f32) {
    (text.chars().count() as f32 * CHAR_WIDTH, LINE_HEIGHT)
}

fn title_height() -> f32 {
    LINE_HEIGHT + FRAME_PADDING.1 * 2.0
}

/// How a window is placed and sized.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowOptions {
    /// Initial position; cascaded from the top-left when `None`.
    pub position: Option<(f32, f32)>,
    /// Initial size; zero components fall back to the default.
    pub size: (f32, f32),
    /// Resize to fit the content drawn last frame.
    pub autosize: bool,
    /// Ignore title bar drags.
    pub no_move: bool,
    /// Cover the whole display and ignore position/size.
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelKind {
    Window,
    Popup,
    Tooltip,
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    origin: (f32, f32),
    cursor: (f32, f32),
    horizontal: bool,
    spacing: f32,
    extent: (f32, f32),
}

impl Layout {
    fn new(origin: (f32, f32), horizontal: bool, spacing: f32) -> Self {
        Self {
            origin,
            cursor: origin,
            horizontal,
            spacing,
            extent: (0.0, 0.0),
        }
    }
}

struct Panel {
    id: String,
    kind: PanelKind,
    rect: Rect,
    commands: Vec<DrawCommand>,
    layouts: Vec<Layout>,
    indent: f32,
}

impl Panel {
    fn new(id: &str, kind: PanelKind, rect: Rect, content_origin: (f32, f32)) -> Self {
        Self {
            id: id.to_string(),
            kind,
            rect,
            commands: Vec::new(),
            layouts: vec![Layout::new(content_origin, false, ITEM_SPACING.1)],
            indent: 0.0,
        }
    }

    fn content_extent(&self) -> (f32, f32) {
        self.layouts
            .first()
            .map(|l| l.extent)
            .unwrap_or((0.0, 0.0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerSnapshot {
    position: (f32, f32),
    delta: (f32, f32),
    inside: bool,
    down: [bool; 3],
    pressed: [bool; 3],
}

impl PointerSnapshot {
    fn pressed_any(&self) -> bool {
        self.pressed.iter().any(|p| *p)
    }
}

pub struct FrameRenderer {
    theme: Theme,
    style_stack: Vec<(StyleSlot, Color)>,
    display: Rect,
    pointer: PointerSnapshot,
    in_frame: bool,
    frame_count: u64,

    panels: Vec<Panel>,
    finished: Vec<Panel>,
    background: Vec<DrawCommand>,

    windows: HashMap<String, Rect>,
    z_order: Vec<String>,
    hit_rects: Vec<(String, Rect)>,
    hovered_panel: Option<String>,
    focused_window: Option<String>,
    newly_focused: Option<String>,

    active_id: Option<String>,
    active_edited: bool,
    activated_this_frame: bool,
    focus_id: Option<String>,

    open_headers: HashSet<String>,
    seen_headers: HashSet<String>,
    open_popups: HashMap<String, (f32, f32)>,

    last_state: ItemState,
    last_click: Option<MouseButton>,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(Theme::dark())
    }
}

impl FrameRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            style_stack: Vec::new(),
            display: Rect::default(),
            pointer: PointerSnapshot::default(),
            in_frame: false,
            frame_count: 0,
            panels: Vec::new(),
            finished: Vec::new(),
            background: Vec::new(),
            windows: HashMap::new(),
            z_order: Vec::new(),
            hit_rects: Vec::new(),
            hovered_panel: None,
            focused_window: None,
            newly_focused: None,
            active_id: None,
            active_edited: false,
            activated_this_frame: false,
            focus_id: None,
            open_headers: HashSet::new(),
            seen_headers: HashSet::new(),
            open_popups: HashMap::new(),
            last_state: ItemState::empty(),
            last_click: None,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Forget all state carried between frames.
    pub fn reset(&mut self) {
        let theme = std::mem::take(&mut self.theme);
        *self = Self::new(theme);
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn display_size(&self) -> (f32, f32) {
        (self.display.width, self.display.height)
    }

    // ------------------------------------------------------------------
    // Frame bracketing
    // ------------------------------------------------------------------

    /// Begin a frame with the input sampled for it.
    pub fn new_frame(&mut self, input: &InputState, display_size: (f32, f32)) {
        if self.in_frame {
            log::warn!("new_frame called twice without end_frame");
            self.end_frame();
        }
        self.in_frame = true;
        self.display = Rect::new(0.0, 0.0, display_size.0, display_size.1);

        let position = input.global_pointer();
        let mut pointer = PointerSnapshot {
            position,
            delta: (
                position.0 - self.pointer.position.0,
                position.1 - self.pointer.position.1,
            ),
            inside: input.pointer_inside(),
            ..Default::default()
        };
        for button in MouseButton::ALL {
            let i = button.index();
            pointer.down[i] = input.is_down(button);
            pointer.pressed[i] = input.was_pressed(button);
        }
        self.pointer = pointer;

        // Topmost panel under the pointer, from last frame's geometry
        self.hovered_panel = if pointer.inside {
            self.hit_rects
                .iter()
                .rev()
                .find(|(_, rect)| rect.contains(position.0, position.1))
                .map(|(id, _)| id.clone())
        } else {
            None
        };

        self.newly_focused = None;
        if pointer.pressed[MouseButton::Left.index()] {
            let target = self
                .hovered_panel
                .clone()
                .filter(|id| self.windows.contains_key(id));
            if target != self.focused_window {
                self.newly_focused = target.clone();
                self.focused_window = target.clone();
            }
            if let Some(id) = target {
                self.bring_to_front(&id);
            }
        }

        if pointer.pressed_any() {
            let hovered = self.hovered_panel.clone();
            self.open_popups
                .retain(|name, _| hovered.as_deref() == Some(name.as_str()));
        }

        self.activated_this_frame = false;
        self.last_state = ItemState::empty();
        self.last_click = None;
    }

    /// Finish the frame and hand back the recorded commands.
    pub fn end_frame(&mut self) -> Frame {
        if !self.panels.is_empty() {
            log::warn!("{} panel(s) still open at end of frame", self.panels.len());
            while let Some(panel) = self.panels.pop() {
                self.finished.push(panel);
            }
        }
        if !self.style_stack.is_empty() {
            log::warn!(
                "{} style colour(s) still pushed at end of frame",
                self.style_stack.len()
            );
            self.style_stack.clear();
        }

        if self.pointer.pressed[MouseButton::Left.index()] && !self.activated_this_frame {
            self.focus_id = None;
        }
        if self.active_id.is_some() && !self.pointer.down[MouseButton::Left.index()] {
            // The active widget was not drawn this frame to see the release
            self.active_id = None;
            self.active_edited = false;
        }

        let mut panels = std::mem::take(&mut self.finished);
        let z_order = &self.z_order;
        panels.sort_by_key(|panel| {
            let layer = match panel.kind {
                PanelKind::Window => 0,
                PanelKind::Popup => 1,
                PanelKind::Tooltip => 2,
            };
            let z = z_order
                .iter()
                .position(|id| *id == panel.id)
                .unwrap_or(usize::MAX);
            (layer, z)
        });

        let mut commands = std::mem::take(&mut self.background);
        self.hit_rects.clear();
        for panel in panels {
            self.hit_rects.push((panel.id, panel.rect));
            commands.extend(panel.commands);
        }

        self.in_frame = false;
        self.frame_count += 1;
        Frame {
            commands,
            display_size: (self.display.width, self.display.height),
        }
    }

    // ------------------------------------------------------------------
    // Style stack
    // ------------------------------------------------------------------

    pub fn push_style_color(&mut self, slot: StyleSlot, color: Color) {
        self.style_stack.push((slot, color));
    }

    /// Pop the `count` most recently pushed colours.
    pub fn pop_style_color(&mut self, count: usize) {
        if count > self.style_stack.len() {
            log::warn!(
                "Popping {} style colour(s) with only {} pushed",
                count,
                self.style_stack.len()
            );
        }
        let keep = self.style_stack.len().saturating_sub(count);
        self.style_stack.truncate(keep);
    }

    pub fn style_depth(&self) -> usize {
        self.style_stack.len()
    }

    /// The effective colour for a slot: the newest override, else the theme.
    pub fn style_color(&self, slot: StyleSlot) -> Color {
        self.style_stack
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, c)| *c)
            .unwrap_or_else(|| self.theme.color(slot))
    }

    // ------------------------------------------------------------------
    // Last item queries
    // ------------------------------------------------------------------

    /// Interaction state of the most recently drawn widget.
    pub fn last_state(&self) -> ItemState {
        self.last_state
    }

    /// Which button clicked the most recently drawn widget, if any.
    pub fn last_click(&self) -> Option<MouseButton> {
        self.last_click
    }

    /// Put back a last item state saved before drawing an overlay.
    pub fn restore_last_state(&mut self, state: ItemState) {
        self.last_state = state;
    }

    /// Move a window; takes effect from its next `begin_window`.
    pub fn set_window_position(&mut self, id: &str, position: (f32, f32)) {
        if let Some(rect) = self.windows.get_mut(id) {
            rect.x = position.0;
            rect.y = position.1;
        }
    }

    pub fn window_rect(&self, id: &str) -> Option<Rect> {
        self.windows.get(id).copied()
    }

    pub fn focused_window(&self) -> Option<&str> {
        self.focused_window.as_deref()
    }

    // ------------------------------------------------------------------
    // Windows
    // ------------------------------------------------------------------

    pub fn begin_window(&mut self, id: &str, title: &str, options: WindowOptions) -> ItemState {
        let rect = if options.fullscreen {
            self.display
        } else {
            let cascade = self.windows.len() as f32 * WINDOW_CASCADE;
            let default_size = (
                if options.size.0 > 0.0 { options.size.0 } else { DEFAULT_WINDOW_SIZE.0 },
                if options.size.1 > 0.0 { options.size.1 } else { DEFAULT_WINDOW_SIZE.1 },
            );
            *self.windows.entry(id.to_string()).or_insert_with(|| {
                let (x, y) = options.position.unwrap_or((20.0 + cascade, 20.0 + cascade));
                Rect::new(x, y, default_size.0, default_size.1)
            })
        };
        if options.fullscreen {
            self.windows.insert(id.to_string(), rect);
        }
        if !self.z_order.iter().any(|z| z == id) {
            self.z_order.push(id.to_string());
        }

        let focused = self.focused_window.as_deref() == Some(id);
        let title_rect = Rect::new(rect.x, rect.y, rect.width, title_height());
        let content_origin = (
            rect.x + WINDOW_PADDING,
            rect.y + title_rect.height + WINDOW_PADDING,
        );
        self.panels
            .push(Panel::new(id, PanelKind::Window, rect, content_origin));

        let bg = self.style_color(StyleSlot::WindowBg);
        let title_bg = self.style_color(if focused {
            StyleSlot::TitleBgActive
        } else {
            StyleSlot::TitleBg
        });
        let text = self.style_color(StyleSlot::Text);
        self.emit(DrawCommand::rect(rect, bg));
        self.emit(DrawCommand::rect(title_rect, title_bg));
        self.emit(DrawCommand::text(
            title,
            (title_rect.x + FRAME_PADDING.0, title_rect.y + FRAME_PADDING.1),
            text,
        ));

        // Title bar drag
        if !options.fullscreen && !options.no_move {
            let drag_id = format!("{id}##title");
            let drag = self.interact(&drag_id, title_rect);
            if drag.contains(ItemState::ACTIVE) && self.pointer.down[0] {
                let (dx, dy) = self.pointer.delta;
                if dx != 0.0 || dy != 0.0 {
                    if let Some(r) = self.windows.get_mut(id) {
                        *r = r.offset(dx, dy);
                    }
                }
            }
        }

        let mut state = ItemState::empty();
        if rect.intersects(&self.display) {
            state |= ItemState::VISIBLE;
        }
        if self.hovered_panel.as_deref() == Some(id) {
            state |= ItemState::HOVERED;
            if self.pointer.pressed_any() {
                state |= ItemState::CLICKED;
            }
        }
        if focused {
            state |= ItemState::FOCUSED;
        }
        if self.newly_focused.as_deref() == Some(id) {
            state |= ItemState::ACTIVATED;
        }
        self.last_state = state;
        state
    }

    pub fn end_window(&mut self, autosize: bool) {
        let Some(panel) = self.pop_panel(PanelKind::Window) else {
            return;
        };
        if autosize {
            let (w, h) = panel.content_extent();
            if let Some(rect) = self.windows.get_mut(&panel.id) {
                rect.width = w + WINDOW_PADDING * 2.0;
                rect.height = h + title_height() + WINDOW_PADDING * 2.0;
            }
        }
        self.finished.push(panel);
    }

    // ------------------------------------------------------------------
    // Groups and indentation
    // ------------------------------------------------------------------

    pub fn begin_group(&mut self, horizontal: bool, spacing: f32) {
        let origin = self.next_position();
        let spacing = if spacing >= 0.0 {
            spacing
        } else if horizontal {
            ITEM_SPACING.0
        } else {
            ITEM_SPACING.1
        };
        if let Some(panel) = self.panels.last_mut() {
            panel.layouts.push(Layout::new(origin, horizontal, spacing));
        } else {
            log::warn!("begin_group outside of a window");
        }
    }

    pub fn end_group(&mut self) -> ItemState {
        let Some(panel) = self.panels.last_mut() else {
            return ItemState::empty();
        };
        if panel.layouts.len() < 2 {
            log::warn!("end_group without matching begin_group");
            return ItemState::empty();
        }
        let group = panel.layouts.pop().unwrap_or_else(|| Layout::new((0.0, 0.0), false, 0.0));
        let rect = self.allocate(group.extent);
        let mut state = ItemState::empty();
        if rect.intersects(&self.display) {
            state |= ItemState::VISIBLE;
        }
        if self.is_hovered(rect) {
            state |= ItemState::HOVERED;
        }
        self.last_state = state;
        state
    }

    pub fn indent(&mut self) {
        if let Some(panel) = self.panels.last_mut() {
            panel.indent += INDENT_WIDTH;
        }
    }

    pub fn unindent(&mut self) {
        if let Some(panel) = self.panels.last_mut() {
            panel.indent = (panel.indent - INDENT_WIDTH).max(0.0);
        }
    }

    // ------------------------------------------------------------------
    // Widgets
    // ------------------------------------------------------------------

    pub fn text(&mut self, id: &str, text: &str, bullet: bool) -> ItemState {
        let (tw, th) = text_size(text);
        let bullet_width = if bullet { LINE_HEIGHT + FRAME_PADDING.0 } else { 0.0 };
        let rect = self.allocate((tw + bullet_width, th));
        let color = self.style_color(StyleSlot::Text);
        if bullet {
            let dot = LINE_HEIGHT / 3.0;
            self.emit(DrawCommand::rect(
                Rect::new(rect.x + dot, rect.y + dot, dot, dot),
                color,
            ));
        }
        self.emit(DrawCommand::text(text, (rect.x + bullet_width, rect.y), color));
        self.interact(id, rect)
    }

    pub fn button(&mut self, id: &str, label: &str, size: (f32, f32), small: bool) -> ItemState {
        let (tw, th) = text_size(label);
        let padding = if small { (FRAME_PADDING.0, 0.0) } else { FRAME_PADDING };
        let w = if size.0 > 0.0 { size.0 } else { tw + padding.0 * 2.0 };
        let h = if size.1 > 0.0 { size.1 } else { th + padding.1 * 2.0 };
        let rect = self.allocate((w, h));
        let state = self.interact(id, rect);
        let slot = if state.contains(ItemState::ACTIVE) {
            StyleSlot::ButtonActive
        } else if state.is_hovered() {
            StyleSlot::ButtonHovered
        } else {
            StyleSlot::Button
        };
        let bg = self.style_color(slot);
        let text = self.style_color(StyleSlot::Text);
        self.emit(DrawCommand::rect(rect, bg));
        self.emit(DrawCommand::text(
            label,
            (rect.x + padding.0, rect.y + padding.1),
            text,
        ));
        state
    }

    pub fn checkbox(&mut self, id: &str, label: &str, value: &mut bool) -> ItemState {
        let box_size = LINE_HEIGHT + FRAME_PADDING.1 * 2.0;
        let (tw, _) = text_size(label);
        let label_gap = if label.is_empty() { 0.0 } else { ITEM_SPACING.0 };
        let rect = self.allocate((box_size + label_gap + tw, box_size));
        let mut state = self.interact(id, rect);
        if state.contains(ItemState::CLICKED) && self.last_click == Some(MouseButton::Left) {
            *value = !*value;
            state |= ItemState::EDITED;
            self.active_edited = true;
            self.last_state = state;
        }

        let slot = if state.contains(ItemState::ACTIVE) {
            StyleSlot::FrameBgActive
        } else if state.is_hovered() {
            StyleSlot::FrameBgHovered
        } else {
            StyleSlot::FrameBg
        };
        let frame = Rect::new(rect.x, rect.y, box_size, box_size);
        let bg = self.style_color(slot);
        self.emit(DrawCommand::rect(frame, bg));
        if *value {
            let inset = box_size / 4.0;
            let mark = self.style_color(StyleSlot::CheckMark);
            self.emit(DrawCommand::rect(
                Rect::new(
                    frame.x + inset,
                    frame.y + inset,
                    box_size - inset * 2.0,
                    box_size - inset * 2.0,
                ),
                mark,
            ));
        }
        if !label.is_empty() {
            let text = self.style_color(StyleSlot::Text);
            self.emit(DrawCommand::text(
                label,
                (frame.right() + label_gap, rect.y + FRAME_PADDING.1),
                text,
            ));
        }
        state
    }

    /// A full-width header that toggles open on click. Returns the state
    /// and whether the header is open after this frame's interaction.
    pub fn collapsing_header(
        &mut self,
        id: &str,
        label: &str,
        default_open: bool,
    ) -> (ItemState, bool) {
        if self.seen_headers.insert(id.to_string()) && default_open {
            self.open_headers.insert(id.to_string());
        }

        let (tw, th) = text_size(label);
        let arrow = LINE_HEIGHT + FRAME_PADDING.0;
        let min_width = arrow + tw + FRAME_PADDING.0 * 2.0;
        let width = self.available_width().max(min_width);
        let rect = self.allocate((width, th + FRAME_PADDING.1 * 2.0));
        let mut state = self.interact(id, rect);

        if state.contains(ItemState::CLICKED) && self.last_click == Some(MouseButton::Left) {
            if !self.open_headers.remove(id) {
                self.open_headers.insert(id.to_string());
            }
            state |= ItemState::TOGGLED_OPEN;
            self.last_state = state;
        }
        let open = self.open_headers.contains(id);

        let slot = if state.contains(ItemState::ACTIVE) {
            StyleSlot::HeaderActive
        } else if state.is_hovered() {
            StyleSlot::HeaderHovered
        } else {
            StyleSlot::Header
        };
        let bg = self.style_color(slot);
        let text = self.style_color(StyleSlot::Text);
        self.emit(DrawCommand::rect(rect, bg));
        self.emit(DrawCommand::text(
            if open { "v" } else { ">" },
            (rect.x + FRAME_PADDING.0, rect.y + FRAME_PADDING.1),
            text,
        ));
        self.emit(DrawCommand::text(
            label,
            (rect.x + FRAME_PADDING.0 + arrow, rect.y + FRAME_PADDING.1),
            text,
        ));
        (state, open)
    }

    pub fn is_header_open(&self, id: &str) -> bool {
        self.open_headers.contains(id)
    }

    // ------------------------------------------------------------------
    // Tooltips and popups
    // ------------------------------------------------------------------

    pub fn begin_tooltip(&mut self, id: &str) {
        let (x, y) = self.pointer.position;
        let origin = (x + TOOLTIP_OFFSET.0, y + TOOLTIP_OFFSET.1);
        let rect = Rect::new(origin.0, origin.1, 0.0, 0.0);
        let content = (origin.0 + WINDOW_PADDING, origin.1 + WINDOW_PADDING);
        self.panels
            .push(Panel::new(id, PanelKind::Tooltip, rect, content));
    }

    pub fn end_tooltip(&mut self) {
        self.end_floating(PanelKind::Tooltip);
    }

    /// A tooltip holding a single line of text. Leaves the last item
    /// state untouched.
    pub fn tooltip_text(&mut self, id: &str, text: &str) {
        let (state, click) = (self.last_state, self.last_click);
        self.begin_tooltip(id);
        self.text(&format!("{id}##text"), text, false);
        self.end_tooltip();
        self.last_state = state;
        self.last_click = click;
    }

    /// Open the popup named `name` at the pointer.
    pub fn open_popup(&mut self, name: &str) {
        log::debug!("Opening popup \"{}\"", name);
        self.open_popups
            .insert(name.to_string(), self.pointer.position);
    }

    pub fn is_popup_open(&self, name: &str) -> bool {
        self.open_popups.contains_key(name)
    }

    pub fn close_popup(&mut self, name: &str) {
        self.open_popups.remove(name);
    }

    /// Begin drawing the popup if it is open. `end_popup` must only be
    /// called when this returns true.
    pub fn begin_popup(&mut self, name: &str) -> bool {
        let Some(&(x, y)) = self.open_popups.get(name) else {
            return false;
        };
        let rect = Rect::new(x, y, 0.0, 0.0);
        let content = (x + WINDOW_PADDING, y + WINDOW_PADDING);
        self.panels
            .push(Panel::new(name, PanelKind::Popup, rect, content));
        true
    }

    pub fn end_popup(&mut self) {
        self.end_floating(PanelKind::Popup);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn end_floating(&mut self, kind: PanelKind) {
        let Some(mut panel) = self.pop_panel(kind) else {
            return;
        };
        let (w, h) = panel.content_extent();
        panel.rect.width = w + WINDOW_PADDING * 2.0;
        panel.rect.height = h + WINDOW_PADDING * 2.0;
        let bg = self.style_color(StyleSlot::PopupBg);
        panel.commands.insert(0, DrawCommand::rect(panel.rect, bg));
        self.finished.push(panel);
    }

    fn pop_panel(&mut self, kind: PanelKind) -> Option<Panel> {
        match self.panels.last() {
            Some(panel) if panel.kind == kind => self.panels.pop(),
            Some(panel) => {
                log::warn!("Mismatched end of {:?} while {:?} is open", kind, panel.kind);
                None
            }
            None => {
                log::warn!("End of {:?} without a matching begin", kind);
                None
            }
        }
    }

    fn bring_to_front(&mut self, id: &str) {
        if let Some(pos) = self.z_order.iter().position(|z| z == id) {
            let entry = self.z_order.remove(pos);
            self.z_order.push(entry);
        }
    }

    fn emit(&mut self, command: DrawCommand) {
        match self.panels.last_mut() {
            Some(panel) => panel.commands.push(command),
            None => self.background.push(command),
        }
    }

    fn next_position(&self) -> (f32, f32) {
        match self.panels.last() {
            Some(panel) => {
                let layout = panel.layouts.last().copied().unwrap_or_else(|| {
                    Layout::new((panel.rect.x, panel.rect.y), false, ITEM_SPACING.1)
                });
                if layout.horizontal {
                    layout.cursor
                } else {
                    (layout.origin.0 + panel.indent, layout.cursor.1)
                }
            }
            None => (0.0, 0.0),
        }
    }

    fn available_width(&self) -> f32 {
        match self.panels.last() {
            Some(panel) if panel.kind == PanelKind::Window => {
                let (x, _) = self.next_position();
                (panel.rect.right() - WINDOW_PADDING - x).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Place a widget of `size` at the layout cursor and advance it.
    fn allocate(&mut self, size: (f32, f32)) -> Rect {
        let (x, y) = self.next_position();
        let rect = Rect::new(x, y, size.0, size.1);
        if let Some(layout) = self.panels.last_mut().and_then(|p| p.layouts.last_mut()) {
            if layout.horizontal {
                layout.cursor.0 = rect.right() + layout.spacing;
            } else {
                layout.cursor.1 = rect.bottom() + layout.spacing;
            }
            layout.extent.0 = layout.extent.0.max(rect.right() - layout.origin.0);
            layout.extent.1 = layout.extent.1.max(rect.bottom() - layout.origin.1);
        }
        rect
    }

    fn is_hovered(&self, rect: Rect) -> bool {
        let Some(panel) = self.panels.last() else {
            return false;
        };
        let panel_hovered = match panel.kind {
            // Tooltips follow the pointer and never take it
            PanelKind::Tooltip => false,
            PanelKind::Window | PanelKind::Popup => {
                self.hovered_panel.as_deref() == Some(panel.id.as_str())
            }
        };
        panel_hovered
            && self.pointer.inside
            && rect.contains(self.pointer.position.0, self.pointer.position.1)
    }

    /// Hit-test a widget and update the active/focus bookkeeping.
    fn interact(&mut self, id: &str, rect: Rect) -> ItemState {
        let mut state = ItemState::empty();
        if rect.intersects(&self.display) {
            state |= ItemState::VISIBLE;
        }

        let is_active = self.active_id.as_deref() == Some(id);
        let hovered = self.is_hovered(rect) && (self.active_id.is_none() || is_active);
        if hovered {
            state |= ItemState::HOVERED;
        }

        self.last_click = None;
        if hovered {
            for button in MouseButton::ALL {
                if self.pointer.pressed[button.index()] {
                    state |= ItemState::CLICKED;
                    self.last_click = Some(button);
                    break;
                }
            }
        }

        if hovered && self.pointer.pressed[MouseButton::Left.index()] {
            self.active_id = Some(id.to_string());
            self.active_edited = false;
            self.activated_this_frame = true;
            self.focus_id = Some(id.to_string());
            state |= ItemState::ACTIVATED;
        }

        if self.active_id.as_deref() == Some(id) {
            if self.pointer.down[MouseButton::Left.index()] {
                state |= ItemState::ACTIVE;
            } else {
                state |= ItemState::DEACTIVATED;
                if self.active_edited {
                    state |= ItemState::DEACTIVATED_AFTER_EDIT;
                }
                self.active_id = None;
                self.active_edited = false;
            }
        }

        if self.focus_id.as_deref() == Some(id) {
            state |= ItemState::FOCUSED;
        }

        self.last_state = state;
        state
    }
}
