use super::{Scene, View};
use crate::driver::FrameContext;
use crate::renderer::WindowOptions;

/// Full-window list of the errors recorded during startup.
pub struct ErrorConsoleView;

impl View for ErrorConsoleView {
    fn name(&self) -> &'static str {
        "error_console"
    }

    fn prerender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.discard_jobs(self.name());
    }

    fn render(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        let options = WindowOptions {
            fullscreen: true,
            ..Default::default()
        };
        ctx.ui.begin_window("##error_console", "Error Console", options);
        if scene.errors.is_empty() {
            ctx.ui.text("##error_none", "No errors recorded", false);
        }
        for (i, message) in scene.errors.iter().enumerate() {
            ctx.ui.text(&format!("##error_{i}"), message, true);
        }
        ctx.ui.end_window(false);
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

    #[test]
    fn test_console_lists_errors_and_skips_tree() {
        let mut scene = Scene::new(
            Item::root().with_child(Item::window("Main")),
            JobQueue::new(),
        );
        scene.errors.push("bad config".into());
        scene.jobs.delete("Main");
        let mut selector = ViewSelector::new(ViewMode::ErrorConsole, scene);

        let platform = HeadlessPlatform::new(640, 480);
        let record = platform.record();
        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(platform, &AppConfig::default());
        render_loop.run_frame(&mut selector).unwrap();

        let record = record.lock().unwrap();
        let frame = record.last_frame.as_ref().unwrap();
        assert!(frame.contains_text("Error Console"));
        assert!(frame.contains_text("bad config"));
        assert!(!frame.contains_text("Main"));
        // Queued jobs are dropped and the tree is left alone
        assert!(selector.scene().jobs.is_empty());
        assert!(selector.scene().root.find("Main").is_some());
        assert!(render_loop.renderer().window_rect("##error_console").is_some());
    }

    #[test]
    fn test_jobs_queued_between_frames_do_not_pile_up() {
        let jobs = JobQueue::new();
        let mut scene = Scene::new(Item::root().with_child(Item::window("Main")), jobs.clone());
        scene.errors.push("bad config".into());
        let mut selector = ViewSelector::new(ViewMode::ErrorConsole, scene);

        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(HeadlessPlatform::new(640, 480), &AppConfig::default());
        for i in 0..3 {
            jobs.add_runtime_child("Main", "", Item::text(format!("t{i}"), "late"));
            render_loop.run_frame(&mut selector).unwrap();
            assert!(jobs.is_empty());
        }
        assert!(selector.scene().root.find("t0").is_none());
    }
}
