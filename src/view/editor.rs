//! Item inspector drawn on top of the running application.

use super::{Scene, View};
use crate::driver::FrameContext;
use crate::item::ItemState;
use crate::renderer::{StyleSlot, WindowOptions};

const EDITOR_WINDOW: &str = "##item_editor";

pub struct EditorView {
    selected: Option<String>,
}

impl EditorView {
    pub fn new() -> Self {
        Self { selected: None }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = Some(name.into());
    }

    fn draw_tree(&mut self, scene: &Scene, ctx: &mut FrameContext<'_>) {
        let mut rows = Vec::new();
        scene.root.walk_with_depth(&mut |item, depth| {
            rows.push((item.name().to_string(), item.tag().name(), depth));
        });

        for (name, tag, depth) in rows {
            for _ in 0..depth {
                ctx.ui.indent();
            }
            let is_selected = self.selected.as_deref() == Some(name.as_str());
            if is_selected {
                let highlight = ctx.ui.style_color(StyleSlot::CheckMark);
                ctx.ui.push_style_color(StyleSlot::Text, highlight);
            }
            let row = ctx
                .ui
                .text(&format!("##editor_row_{name}"), &format!("{name} [{tag}]"), false);
            if is_selected {
                ctx.ui.pop_style_color(1);
            }
            if row.contains(ItemState::CLICKED) {
                log::debug!("Editor selected \"{}\"", name);
                self.selected = Some(name);
            }
            for _ in 0..depth {
                ctx.ui.unindent();
            }
        }
    }

    fn draw_selection(&mut self, scene: &Scene, ctx: &mut FrameContext<'_>) {
        let Some(name) = self.selected.clone() else {
            ctx.ui.text("##editor_hint", "Select an item", false);
            return;
        };
        let Some(item) = scene.root.find(&name) else {
            self.selected = None;
            return;
        };

        ctx.ui.text("##editor_selected", &format!("Selected: {name}"), false);
        for (key, value) in item.get_config() {
            ctx.ui
                .text(&format!("##editor_cfg_{key}"), &format!("{key} = {value}"), true);
        }

        ctx.ui.begin_group(true, -1.0);
        let up = ctx.ui.button("##editor_up", "Move Up", (0.0, 0.0), false);
        let down = ctx.ui.button("##editor_down", "Move Down", (0.0, 0.0), false);
        let delete = ctx.ui.button("##editor_delete", "Delete", (0.0, 0.0), false);
        ctx.ui.end_group();

        if up.is_clicked() {
            scene.jobs.move_up(name.as_str());
        }
        if down.is_clicked() {
            scene.jobs.move_down(name.as_str());
        }
        if delete.is_clicked() {
            scene.jobs.delete(name.as_str());
            self.selected = None;
        }
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for EditorView {
    fn name(&self) -> &'static str {
        "editor"
    }

    fn prerender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.begin_frame();
    }

    fn render(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        scene.draw(ctx);

        let options = WindowOptions {
            position: Some((10.0, 10.0)),
            size: (320.0, 480.0),
            ..Default::default()
        };
        ctx.ui.begin_window(EDITOR_WINDOW, "Item Editor", options);
        self.draw_tree(scene, ctx);
        self.draw_selection(scene, ctx);
        ctx.ui.end_window(false);
    }

    fn postrender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.run_callbacks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RenderLoop;
    use crate::item::Item;
    use crate::jobs::JobQueue;
    use crate::platform::HeadlessPlatform;
    use crate::view::{ViewMode, ViewSelector};
    use crate::AppConfig;

    fn scene() -> Scene {
        Scene::new(
            Item::root().with_child(
                Item::window("Main")
                    .with_child(Item::button("a"))
                    .with_child(Item::button("b")),
            ),
            JobQueue::new(),
        )
    }

    #[test]
    fn test_editor_lists_tree_and_selection() {
        let mut editor = EditorView::new();
        editor.select("b");
        let mut selector = ViewSelector::with_view(ViewMode::Editor, Box::new(editor), scene());

        let platform = HeadlessPlatform::new(800, 600);
        let record = platform.record();
        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(platform, &AppConfig::default());
        render_loop.run_frame(&mut selector).unwrap();

        let record = record.lock().unwrap();
        let frame = record.last_frame.as_ref().unwrap();
        assert!(frame.contains_text("Item Editor"));
        assert!(frame.contains_text("Main [window]"));
        assert!(frame.contains_text("a [button]"));
        assert!(frame.contains_text("Selected: b"));
        assert!(frame.contains_text("Move Up"));
    }

    #[test]
    fn test_selection_of_deleted_item_is_cleared() {
        let mut editor = EditorView::new();
        editor.select("ghost");
        let mut scene = scene();

        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(HeadlessPlatform::new(800, 600), &AppConfig::default());

        struct Probe<'e>(&'e mut EditorView, &'e mut Scene);
        impl crate::driver::FrameHooks for Probe<'_> {
            fn prerender(&mut self, ctx: &mut FrameContext<'_>) {
                self.0.prerender(self.1, ctx);
            }
            fn render(&mut self, ctx: &mut FrameContext<'_>) {
                self.0.render(self.1, ctx);
            }
            fn postrender(&mut self, ctx: &mut FrameContext<'_>) {
                self.0.postrender(self.1, ctx);
            }
        }

        render_loop
            .run_frame(&mut Probe(&mut editor, &mut scene))
            .unwrap();
        assert_eq!(editor.selected(), None);
    }
}
