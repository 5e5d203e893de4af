use super::{Scene, View};
use crate::driver::FrameContext;
use crate::item::{KindTag, COMMON_KEYS};
use crate::renderer::WindowOptions;

/// Reference of every item kind and the configuration keys it accepts.
pub struct DocumentationView;

impl View for DocumentationView {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn prerender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.discard_jobs(self.name());
    }

    fn render(&mut self, _scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        let options = WindowOptions {
            fullscreen: true,
            ..Default::default()
        };
        ctx.ui.begin_window("##documentation", "Documentation", options);

        let (_, open) = ctx.ui.collapsing_header("##doc_common", "Common keys", true);
        if open {
            ctx.ui.indent();
            for (key, ty) in COMMON_KEYS {
                ctx.ui.text(&format!("##doc_common_{key}"), &format!("{key}: {ty}"), true);
            }
            ctx.ui.unindent();
        }

        for tag in KindTag::ALL {
            let (_, open) = ctx
                .ui
                .collapsing_header(&format!("##doc_{tag}"), tag.name(), false);
            if !open {
                continue;
            }
            ctx.ui.indent();
            ctx.ui.text(&format!("##doc_{tag}_summary"), tag.summary(), false);
            if tag.config_keys().is_empty() {
                ctx.ui.text(&format!("##doc_{tag}_none"), "No kind keys", false);
            }
            for (key, ty) in tag.config_keys() {
                ctx.ui
                    .text(&format!("##doc_{tag}_{key}"), &format!("{key}: {ty}"), true);
            }
            ctx.ui.unindent();
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
    fn test_one_section_per_kind() {
        let mut selector = ViewSelector::new(
            ViewMode::Documentation,
            Scene::new(Item::root(), JobQueue::new()),
        );
        let platform = HeadlessPlatform::new(800, 600);
        let record = platform.record();
        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(platform, &AppConfig::default());
        render_loop.run_frame(&mut selector).unwrap();

        let record = record.lock().unwrap();
        let frame = record.last_frame.as_ref().unwrap();
        for tag in KindTag::ALL {
            assert!(frame.contains_text(tag.name()), "missing {tag}");
        }
        // Common keys start open
        assert!(frame.contains_text("name: text"));
        assert!(!frame.contains_text("autosize: bool"));
    }

    #[test]
    fn test_queued_jobs_are_dropped() {
        let jobs = JobQueue::new();
        let mut selector = ViewSelector::new(
            ViewMode::Documentation,
            Scene::new(Item::root().with_child(Item::window("Main")), jobs.clone()),
        );
        jobs.delete("Main");
        jobs.hide_all("Main");

        let mut render_loop = RenderLoop::new();
        render_loop.initialize_with(HeadlessPlatform::new(800, 600), &AppConfig::default());
        render_loop.run_frame(&mut selector).unwrap();

        assert!(jobs.is_empty());
        assert!(selector.scene().root.find("Main").unwrap().is_shown());
    }
}
