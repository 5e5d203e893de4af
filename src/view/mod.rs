//! Top-level views and the selector that routes frame hooks to one of them.
//!
//! Exactly one view is active for the life of the process. It is chosen
//! once at startup by [`ViewMode::select`].

mod app;
mod console;
mod docs;
mod editor;

pub use app::MainView;
pub use console::ErrorConsoleView;
pub use docs::DocumentationView;
pub use editor::EditorView;

use crate::driver::{FrameContext, FrameHooks};
use crate::item::{DrawContext, Item};
use crate::jobs::JobQueue;

/// The application state every view works on.
pub struct Scene {
    pub root: Item,
    pub jobs: JobQueue,
    /// Names of items whose callbacks fire after this frame's traversal
    pub triggered: Vec<String>,
    /// Messages recorded before the loop started
    pub errors: Vec<String>,
}

impl Scene {
    pub fn new(root: Item, jobs: JobQueue) -> Self {
        Self {
            root,
            jobs,
            triggered: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Apply queued tree jobs, then clear last frame's interaction flags.
    pub fn begin_frame(&mut self) {
        self.jobs.apply_pending(&mut self.root);
        self.root.reset_state();
    }

    /// Drop queued tree jobs unapplied. Views that never draw the tree
    /// call this so the queue does not grow.
    pub fn discard_jobs(&mut self, view: &str) {
        let dropped = self.jobs.drain();
        if !dropped.is_empty() {
            log::debug!("{} view dropped {} tree job(s)", view, dropped.len());
        }
    }

    /// Draw the whole tree. Draw errors are logged by the items and the
    /// rest of the tree still draws.
    pub fn draw(&mut self, ctx: &mut FrameContext<'_>) {
        let mut draw = DrawContext::new(ctx.ui, ctx.input, &mut self.triggered);
        if let Err(e) = self.root.draw(&mut draw) {
            log::trace!("Frame {} drew with errors: {}", ctx.frame, e);
        }
    }

    /// Run the callbacks of the items triggered this frame, in order.
    pub fn run_callbacks(&mut self) {
        for name in std::mem::take(&mut self.triggered) {
            match self.root.find_mut(&name) {
                Some(item) => item.invoke_callback(&self.jobs),
                None => log::debug!("Triggered item \"{}\" is gone", name),
            }
        }
    }
}

/// A top-level view driven once per frame.
pub trait View {
    fn name(&self) -> &'static str;

    fn prerender(&mut self, _scene: &mut Scene, _ctx: &mut FrameContext<'_>) {}

    fn render(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>);

    fn postrender(&mut self, _scene: &mut Scene, _ctx: &mut FrameContext<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    MainApplication,
    Editor,
    ErrorConsole,
    Documentation,
}

impl ViewMode {
    /// Recorded startup errors win, then the editor, then the docs.
    pub fn select(error: bool, editor: bool, documentation: bool) -> Self {
        if error {
            ViewMode::ErrorConsole
        } else if editor {
            ViewMode::Editor
        } else if documentation {
            ViewMode::Documentation
        } else {
            ViewMode::MainApplication
        }
    }

    fn create_view(self) -> Box<dyn View> {
        match self {
            ViewMode::MainApplication => Box::new(MainView),
            ViewMode::Editor => Box::new(EditorView::new()),
            ViewMode::ErrorConsole => Box::new(ErrorConsoleView),
            ViewMode::Documentation => Box::new(DocumentationView),
        }
    }
}

/// Routes the frame hooks to the selected view.
pub struct ViewSelector {
    mode: ViewMode,
    view: Box<dyn View>,
    scene: Scene,
}

impl ViewSelector {
    pub fn new(mode: ViewMode, scene: Scene) -> Self {
        log::info!("Starting in {:?} view", mode);
        Self {
            mode,
            view: mode.create_view(),
            scene,
        }
    }

    /// Use a custom view in place of the one `mode` would pick.
    pub fn with_view(mode: ViewMode, view: Box<dyn View>, scene: Scene) -> Self {
        Self { mode, view, scene }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn view_name(&self) -> &'static str {
        self.view.name()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }
}

impl FrameHooks for ViewSelector {
    fn prerender(&mut self, ctx: &mut FrameContext<'_>) {
        self.view.prerender(&mut self.scene, ctx);
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) {
        self.view.render(&mut self.scene, ctx);
    }

    fn postrender(&mut self, ctx: &mut FrameContext<'_>) {
        self.view.postrender(&mut self.scene, ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::driver::RenderLoop;
    use crate::platform::HeadlessPlatform;
    use crate::AppConfig;

    #[test]
    fn test_select_priority() {
        assert_eq!(ViewMode::select(true, true, true), ViewMode::ErrorConsole);
        assert_eq!(ViewMode::select(false, true, true), ViewMode::Editor);
        assert_eq!(ViewMode::select(false, false, true), ViewMode::Documentation);
        assert_eq!(ViewMode::select(false, false, false), ViewMode::MainApplication);
    }

    struct Recording(Arc<Mutex<Vec<&'static str>>>);

    impl View for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }
        fn prerender(&mut self, _scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
            self.0.lock().unwrap().push("prerender");
        }
        fn render(&mut self, _scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
            self.0.lock().unwrap().push("render");
        }
        fn postrender(&mut self, _scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
            self.0.lock().unwrap().push("postrender");
        }
    }

    #[test]
    fn test_selector_runs_phases_in_order_every_frame() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut selector = ViewSelector::with_view(
            ViewMode::MainApplication,
            Box::new(Recording(log.clone())),
            Scene::new(Item::root(), JobQueue::new()),
        );

        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(HeadlessPlatform::new(100, 100), &AppConfig::default());
        render_loop.run_frame(&mut selector).unwrap();
        render_loop.run_frame(&mut selector).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["prerender", "render", "postrender", "prerender", "render", "postrender"]
        );
    }

    #[test]
    fn test_run_callbacks_skips_missing_items() {
        let mut scene = Scene::new(Item::root(), JobQueue::new());
        scene.triggered.push("gone".into());
        scene.run_callbacks();
        assert!(scene.triggered.is_empty());
    }
}
