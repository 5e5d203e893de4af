//! Per-frame input state sampled from platform events.
//!
//! The pointer is tracked in surface coordinates. While a window item has
//! focus, the pointer is also translated into that window's local
//! coordinates and the window is recorded as the active one.

use crate::platform::{MouseButton, PlatformEvent};

#[derive(Debug, Clone, Default)]
pub struct InputState {
    global_pointer: (f32, f32),
    local_pointer: (f32, f32),
    pointer_inside: bool,
    active_window: Option<String>,
    buttons_down: [bool; 3],
    pressed: [bool; 3],
    released: [bool; 3],
    has_focus: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the per-frame press/release edges.
    pub fn begin_frame(&mut self) {
        self.pressed = [false; 3];
        self.released = [false; 3];
    }

    /// Fold one platform event into the state.
    pub fn apply(&mut self, event: &PlatformEvent) {
        match event {
            PlatformEvent::PointerMoved { x, y } => {
                self.global_pointer = (*x, *y);
                self.pointer_inside = true;
            }
            PlatformEvent::PointerLeft => {
                self.pointer_inside = false;
            }
            PlatformEvent::PointerButton { button, pressed } => {
                let i = button.index();
                if *pressed {
                    self.pressed[i] |= !self.buttons_down[i];
                } else if self.buttons_down[i] {
                    self.released[i] = true;
                }
                self.buttons_down[i] = *pressed;
            }
            PlatformEvent::Focus(focused) => {
                self.has_focus = *focused;
                if !focused {
                    self.buttons_down = [false; 3];
                }
            }
            PlatformEvent::Resized { .. } | PlatformEvent::CloseRequested => {}
        }
    }

    /// Record `window` as focused and translate the pointer into its
    /// coordinates.
    pub fn set_window_focus(&mut self, window: &str, origin: (f32, f32)) {
        self.local_pointer = (
            self.global_pointer.0 - origin.0,
            self.global_pointer.1 - origin.1,
        );
        if self.active_window.as_deref() != Some(window) {
            log::debug!("Active window is now \"{}\"", window);
            self.active_window = Some(window.to_string());
        }
    }

    pub fn global_pointer(&self) -> (f32, f32) {
        self.global_pointer
    }

    pub fn local_pointer(&self) -> (f32, f32) {
        self.local_pointer
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    pub fn active_window(&self) -> Option<&str> {
        self.active_window.as_deref()
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.buttons_down[button.index()]
    }

    pub fn was_pressed(&self, button: MouseButton) -> bool {
        self.pressed[button.index()]
    }

    pub fn was_released(&self, button: MouseButton) -> bool {
        self.released[button.index()]
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }
}
