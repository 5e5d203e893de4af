//! Per-frame drawing of the item tree.

use std::ops::{Deref, DerefMut};

use crate::error::DrawError;
use crate::input::InputState;
use crate::platform::MouseButton;
use crate::registry;
use crate::renderer::{Color, FrameRenderer, StyleSlot, WindowOptions};

use super::config::{ConfigValue, ValueType};
use super::kind::ItemKind;
use super::state::ItemState;
use super::Item;

/// Everything an item needs while it draws itself.
pub struct DrawContext<'a> {
    pub ui: &'a mut FrameRenderer,
    pub input: &'a mut InputState,
    /// Items whose callback fires once the traversal is over
    pub triggered: &'a mut Vec<String>,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        ui: &'a mut FrameRenderer,
        input: &'a mut InputState,
        triggered: &'a mut Vec<String>,
    ) -> Self {
        Self {
            ui,
            input,
            triggered,
        }
    }
}

/// Pushes colour overrides on creation and pops exactly as many when
/// dropped, whichever way the draw exits.
pub struct StyleScope<'s, 'a> {
    ctx: &'s mut DrawContext<'a>,
    pushed: usize,
}

impl<'s, 'a> StyleScope<'s, 'a> {
    pub fn new(ctx: &'s mut DrawContext<'a>, styles: &[(StyleSlot, Color)]) -> Self {
        for (slot, color) in styles {
            ctx.ui.push_style_color(*slot, *color);
        }
        Self {
            ctx,
            pushed: styles.len(),
        }
    }
}

impl<'a> Deref for StyleScope<'_, 'a> {
    type Target = DrawContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'a> DerefMut for StyleScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for StyleScope<'_, '_> {
    fn drop(&mut self) {
        if self.pushed > 0 {
            self.ctx.ui.pop_style_color(self.pushed);
        }
    }
}

/// Registry value bound to an item, checked against the type it shows.
fn bound_value(
    item: &str,
    source: &str,
    expected: ValueType,
) -> Result<Option<ConfigValue>, DrawError> {
    if source.is_empty() {
        return Ok(None);
    }
    match registry::value(source) {
        Some(value) if value.value_type() == expected => Ok(Some(value)),
        Some(value) => {
            let err = DrawError::DataSourceType {
                item: item.to_string(),
                source_name: source.to_string(),
                expected,
                found: value.value_type(),
            };
            log::warn!("{}", err);
            Err(err)
        }
        None => Ok(None),
    }
}

/// Draw every child; all of them draw even if one fails, and the first
/// failure is returned.
fn draw_children(children: &mut [Item], ctx: &mut DrawContext<'_>) -> Result<(), DrawError> {
    let mut first_error = None;
    for child in children.iter_mut() {
        if let Err(e) = child.draw(ctx) {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

impl Item {
    /// Draw this item and its subtree for the current frame.
    ///
    /// Colour overrides are pushed for the duration of the call. Hidden
    /// items draw nothing, their subtree included.
    pub fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        if !self.show {
            return Ok(());
        }
        let mut scope = StyleScope::new(ctx, &self.styles);
        self.draw_kind(&mut scope)
    }

    fn draw_kind(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        let label = self.label.as_deref().unwrap_or(&self.name);
        let size = (self.width as f32, self.height as f32);

        let (state, trigger, result) = match &mut self.kind {
            ItemKind::Root => {
                let result = draw_children(&mut self.children, ctx);
                (ItemState::empty(), false, result)
            }
            ItemKind::Window(window) => {
                if window.reposition {
                    ctx.ui.set_window_position(
                        &self.name,
                        (window.x_pos as f32, window.y_pos as f32),
                    );
                    window.reposition = false;
                }
                let options = WindowOptions {
                    position: Some((window.x_pos as f32, window.y_pos as f32)),
                    size,
                    autosize: window.autosize,
                    no_move: window.no_move,
                    fullscreen: false,
                };
                let state = ctx.ui.begin_window(&self.name, label, options);
                if state.is_focused() {
                    if let Some(rect) = ctx.ui.window_rect(&self.name) {
                        ctx.input.set_window_focus(&self.name, (rect.x, rect.y));
                    }
                }
                let result = draw_children(&mut self.children, ctx);
                ctx.ui.end_window(window.autosize);
                if let Some(rect) = ctx.ui.window_rect(&self.name) {
                    window.x_pos = rect.x as i64;
                    window.y_pos = rect.y as i64;
                }
                (state, false, result)
            }
            ItemKind::Group(group) => {
                ctx.ui.begin_group(group.horizontal, group.spacing as f32);
                let result = draw_children(&mut self.children, ctx);
                let state = ctx.ui.end_group();
                (state, false, result)
            }
            ItemKind::CollapsingHeader(header) => {
                let (state, open) = ctx.ui.collapsing_header(&self.name, label, header.default_open);
                header.open = open;
                let result = if open {
                    ctx.ui.indent();
                    let result = draw_children(&mut self.children, ctx);
                    ctx.ui.unindent();
                    result
                } else {
                    Ok(())
                };
                (state, state.contains(ItemState::TOGGLED_OPEN), result)
            }
            ItemKind::Tooltip => {
                // Shown while the item drawn just before it is hovered
                if ctx.ui.last_state().is_hovered() {
                    let previous = ctx.ui.last_state();
                    ctx.ui.begin_tooltip(&self.name);
                    let result = draw_children(&mut self.children, ctx);
                    ctx.ui.end_tooltip();
                    ctx.ui.restore_last_state(previous);
                    (ItemState::VISIBLE, false, result)
                } else {
                    (ItemState::empty(), false, Ok(()))
                }
            }
            ItemKind::Popup => {
                if ctx.ui.begin_popup(&self.name) {
                    let result = draw_children(&mut self.children, ctx);
                    ctx.ui.end_popup();
                    (ItemState::VISIBLE, false, result)
                } else {
                    (ItemState::empty(), false, Ok(()))
                }
            }
            ItemKind::Button(button) => {
                let state = ctx.ui.button(&self.name, label, size, button.small);
                let left = ctx.ui.last_click() == Some(MouseButton::Left);
                (state, state.is_clicked() && left, Ok(()))
            }
            ItemKind::Text(text) => {
                if let Some(ConfigValue::Text(value)) =
                    bound_value(&self.name, &self.data_source, ValueType::Text)?
                {
                    text.value = value;
                }
                let state = ctx.ui.text(&self.name, &text.value, text.bullet);
                let left = ctx.ui.last_click() == Some(MouseButton::Left);
                (state, state.is_clicked() && left, Ok(()))
            }
            ItemKind::Checkbox(checkbox) => {
                if let Some(ConfigValue::Bool(value)) =
                    bound_value(&self.name, &self.data_source, ValueType::Bool)?
                {
                    checkbox.value = value;
                }
                let state = ctx.ui.checkbox(&self.name, label, &mut checkbox.value);
                if state.is_edited() && !self.data_source.is_empty() {
                    let value = ConfigValue::Bool(checkbox.value);
                    if let Err(e) = registry::set_value(&self.data_source, value) {
                        log::warn!("\"{}\" could not store its value: {}", self.name, e);
                    }
                }
                (state, state.is_edited(), Ok(()))
            }
        };

        self.state = state;
        if trigger && self.callback.is_some() {
            ctx.triggered.push(self.name.clone());
        }
        if !self.tip.is_empty() && state.is_hovered() {
            ctx.ui.tooltip_text(&format!("{}##tip", self.name), &self.tip);
        }
        if !self.popup.is_empty()
            && state.is_hovered()
            && ctx.input.was_pressed(MouseButton::Right)
        {
            ctx.ui.open_popup(&self.popup);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::platform::PlatformEvent;
    use crate::renderer::Frame;

    fn draw_frame(root: &mut Item, ui: &mut FrameRenderer, input: &mut InputState) -> Vec<String> {
        draw_recorded(root, ui, input).0
    }

    fn draw_recorded(
        root: &mut Item,
        ui: &mut FrameRenderer,
        input: &mut InputState,
    ) -> (Vec<String>, Frame) {
        let mut triggered = Vec::new();
        ui.new_frame(input, (800.0, 600.0));
        {
            let mut ctx = DrawContext::new(ui, input, &mut triggered);
            let _ = root.draw(&mut ctx);
        }
        let frame = ui.end_frame();
        input.begin_frame();
        (triggered, frame)
    }

    /// Point inside the first item of window "w", after one frame has
    /// laid it out.
    fn first_item_point(ui: &FrameRenderer) -> (f32, f32) {
        let rect = ui.window_rect("w").unwrap();
        (rect.x + 12.0, rect.y + 30.0)
    }

    fn press(input: &mut InputState, button: MouseButton) {
        input.apply(&PlatformEvent::PointerButton {
            button,
            pressed: true,
        });
    }

    fn release(input: &mut InputState, button: MouseButton) {
        input.apply(&PlatformEvent::PointerButton {
            button,
            pressed: false,
        });
    }

    #[test]
    fn test_style_scope_pops_on_drop() {
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();
        let mut triggered = Vec::new();
        let mut ctx = DrawContext::new(&mut ui, &mut input, &mut triggered);
        {
            let styles = [(StyleSlot::Text, Color::BLACK), (StyleSlot::Button, Color::WHITE)];
            let scope = StyleScope::new(&mut ctx, &styles);
            assert_eq!(scope.ui.style_depth(), 2);
        }
        assert_eq!(ctx.ui.style_depth(), 0);
    }

    #[test]
    fn test_draw_error_keeps_style_stack_balanced() {
        let _guard = registry::exclusive();
        registry::init();
        registry::set_value("flag", ConfigValue::Bool(true)).unwrap();

        let mut root = Item::root().with_child(
            Item::window("w")
                .with_color(StyleSlot::WindowBg, Color::BLACK)
                .with_child(
                    Item::text("t", "")
                        .with_data_source("flag")
                        .with_color(StyleSlot::Text, Color::WHITE),
                )
                .with_child(Item::button("after")),
        );

        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();
        let mut triggered = Vec::new();
        ui.new_frame(&input, (800.0, 600.0));
        let result = {
            let mut ctx = DrawContext::new(&mut ui, &mut input, &mut triggered);
            root.draw(&mut ctx)
        };
        assert_eq!(ui.style_depth(), 0);
        let frame = ui.end_frame();
        registry::teardown();

        assert!(matches!(result, Err(DrawError::DataSourceType { .. })));
        // Siblings after the failing item still draw
        assert!(frame.contains_text("after"));
    }

    #[test]
    fn test_text_reads_data_source() {
        let _guard = registry::exclusive();
        registry::init();
        registry::set_value("status", ConfigValue::Text("ready".into())).unwrap();

        let mut root = Item::root()
            .with_child(Item::window("w").with_child(Item::text("t", "").with_data_source("status")));
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();
        draw_frame(&mut root, &mut ui, &mut input);
        registry::teardown();

        let text = root.get_child("t").map(|t| t.kind().clone());
        assert_eq!(
            text,
            Some(ItemKind::Text(crate::item::TextKind {
                value: "ready".into(),
                bullet: false
            }))
        );
    }

    #[test]
    fn test_hidden_items_draw_nothing() {
        let mut window = Item::window("w").with_child(Item::text("t", "secret"));
        window.set_show(false);
        let mut root = Item::root().with_child(window);

        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();
        let mut triggered = Vec::new();
        ui.new_frame(&input, (800.0, 600.0));
        {
            let mut ctx = DrawContext::new(&mut ui, &mut input, &mut triggered);
            root.draw(&mut ctx).unwrap();
        }
        assert!(ui.end_frame().commands.is_empty());
    }

    #[test]
    fn test_button_click_triggers_callback_name() {
        let mut root = Item::root().with_child(
            Item::window("w").with_child(Item::button("ok").with_callback(|_| {})),
        );
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();

        // Establish geometry, then press over the button
        draw_frame(&mut root, &mut ui, &mut input);
        let (x, y) = {
            let rect = ui.window_rect("w").unwrap();
            (rect.x + 12.0, rect.y + 30.0)
        };
        input.apply(&PlatformEvent::PointerMoved { x, y });
        draw_frame(&mut root, &mut ui, &mut input);
        input.apply(&PlatformEvent::PointerButton {
            button: MouseButton::Left,
            pressed: true,
        });
        let triggered = draw_frame(&mut root, &mut ui, &mut input);

        assert_eq!(triggered, vec!["ok".to_string()]);
        assert!(root.get_child("ok").unwrap().state().is_clicked());
        assert_eq!(input.active_window(), Some("w"));
    }

    #[test]
    fn test_value_written_by_worker_thread_shows_in_frame() {
        let _guard = registry::exclusive();
        registry::init();
        std::thread::spawn(|| {
            registry::set_value("progress", ConfigValue::Text("42% done".into())).unwrap();
        })
        .join()
        .unwrap();

        let mut root = Item::root()
            .with_child(Item::window("w").with_child(Item::text("t", "").with_data_source("progress")));
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        registry::teardown();

        assert!(frame.contains_text("42% done"));
    }

    #[test]
    fn test_tooltip_item_follows_hover_of_previous_sibling() {
        let mut root = Item::root().with_child(
            Item::window("w")
                .with_child(Item::button("ok"))
                .with_child(Item::tooltip("ok_help").with_child(Item::text("help", "Saves the file"))),
        );
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();

        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(!frame.contains_text("Saves the file"));

        let (x, y) = first_item_point(&ui);
        input.apply(&PlatformEvent::PointerMoved { x, y });
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(frame.contains_text("Saves the file"));
        assert!(root.get_child("ok_help").unwrap().state().contains(ItemState::VISIBLE));
        // The owner keeps its own hover state
        assert!(root.get_child("ok").unwrap().state().is_hovered());

        input.apply(&PlatformEvent::PointerMoved { x: 700.0, y: 550.0 });
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(!frame.contains_text("Saves the file"));
    }

    #[test]
    fn test_tip_text_shown_while_hovered() {
        let mut root = Item::root().with_child(
            Item::window("w").with_child(Item::button("ok").with_tip("Confirm the dialog")),
        );
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();

        draw_frame(&mut root, &mut ui, &mut input);
        let (x, y) = first_item_point(&ui);
        input.apply(&PlatformEvent::PointerMoved { x, y });
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(frame.contains_text("Confirm the dialog"));

        input.apply(&PlatformEvent::PointerMoved { x: 700.0, y: 550.0 });
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(!frame.contains_text("Confirm the dialog"));
    }

    #[test]
    fn test_right_click_opens_popup_and_click_elsewhere_closes_it() {
        let mut root = Item::root().with_child(
            Item::window("w")
                .with_child(Item::button("file").with_label("File").with_popup("menu"))
                .with_child(Item::popup("menu").with_child(Item::text("open", "Open..."))),
        );
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();

        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(!frame.contains_text("Open..."));

        let (x, y) = first_item_point(&ui);
        input.apply(&PlatformEvent::PointerMoved { x, y });
        press(&mut input, MouseButton::Right);
        let (triggered, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(triggered.is_empty());
        assert!(ui.is_popup_open("menu"));
        assert!(frame.contains_text("Open..."));

        // Stays open while nothing is pressed
        release(&mut input, MouseButton::Right);
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(frame.contains_text("Open..."));

        input.apply(&PlatformEvent::PointerMoved { x: 700.0, y: 550.0 });
        press(&mut input, MouseButton::Left);
        let (_, frame) = draw_recorded(&mut root, &mut ui, &mut input);
        assert!(!ui.is_popup_open("menu"));
        assert!(!frame.contains_text("Open..."));
        assert!(!root.get_child("menu").unwrap().state().contains(ItemState::VISIBLE));
    }

    #[test]
    fn test_text_callback_fires_on_left_click_only() {
        let mut root = Item::root().with_child(
            Item::window("w").with_child(Item::text("status", "idle").with_callback(|_| {})),
        );
        let mut ui = FrameRenderer::default();
        let mut input = InputState::new();

        draw_frame(&mut root, &mut ui, &mut input);
        let (x, y) = first_item_point(&ui);
        input.apply(&PlatformEvent::PointerMoved { x, y });
        press(&mut input, MouseButton::Right);
        let triggered = draw_frame(&mut root, &mut ui, &mut input);
        assert!(triggered.is_empty());
        assert!(root.get_child("status").unwrap().state().is_clicked());

        release(&mut input, MouseButton::Right);
        draw_frame(&mut root, &mut ui, &mut input);
        press(&mut input, MouseButton::Left);
        let triggered = draw_frame(&mut root, &mut ui, &mut input);
        assert_eq!(triggered, vec!["status".to_string()]);
    }
}
