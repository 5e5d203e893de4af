use super::{Scene, View};
use crate::driver::FrameContext;

/// The application's own windows, drawn from the item tree.
pub struct MainView;

impl View for MainView {
    fn name(&self) -> &'static str {
        "main"
    }

    fn prerender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.begin_frame();
    }

    fn render(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        scene.draw(ctx);
    }

    fn postrender(&mut self, scene: &mut Scene, _ctx: &mut FrameContext<'_>) {
        scene.run_callbacks();
    }
}
