pub mod driver;
pub mod error;
pub mod input;
pub mod item;
pub mod jobs;
pub mod registry;
pub mod tree;
pub mod view;

// These modules are public for advanced use cases
pub mod platform;
pub mod renderer;

use driver::RenderLoop;
use error::Error;
use item::{Config, Item};
use jobs::JobQueue;
use platform::{Platform, WaylandPlatform};
use renderer::Color;
use view::{Scene, ViewMode, ViewSelector};

pub mod prelude {
    pub use crate::config;
    pub use crate::error::{ConfigError, Error, JobError};
    pub use crate::item::{
        CallbackContext, Config, ConfigValue, Item, ItemKind, ItemState, KindTag, ValueType,
    };
    pub use crate::jobs::{JobQueue, TreeJob};
    pub use crate::registry;
    pub use crate::renderer::{Color, StyleSlot};
    pub use crate::{App, AppConfig};
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    pub vsync: bool,
    /// Start in the item editor
    pub editor: bool,
    /// Start in the documentation view
    pub documentation: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "trellis".to_string(),
            width: 1280,
            height: 720,
            clear_color: Color::rgb(0.1, 0.1, 0.15),
            vsync: true,
            editor: false,
            documentation: false,
        }
    }
}

pub struct App {
    config: AppConfig,
    root: Item,
    jobs: JobQueue,
    errors: Vec<String>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            root: Item::root(),
            jobs: JobQueue::new(),
            errors: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.config.clear_color = color;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    /// Start in the item editor instead of the plain application.
    pub fn editor(mut self, editor: bool) -> Self {
        self.config.editor = editor;
        self
    }

    pub fn documentation(mut self, documentation: bool) -> Self {
        self.config.documentation = documentation;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn root(&self) -> &Item {
        &self.root
    }

    /// A handle to the job queue, usable from any thread while the app
    /// runs.
    pub fn jobs(&self) -> JobQueue {
        self.jobs.clone()
    }

    /// Append a top-level window.
    pub fn add_window(mut self, window: Item) -> Self {
        self.root.add_child(window);
        self
    }

    /// Place `item` under `parent` (before `before`, if not empty). A
    /// failure is recorded and opens the error console on `run`.
    pub fn add_item(mut self, parent: &str, before: &str, item: Item) -> Self {
        if let Err(item) = self.root.add_runtime_child(parent, before, item) {
            self.record_startup_error(format!(
                "could not add \"{}\" to \"{}\"",
                item.name(),
                parent
            ));
        }
        self
    }

    /// Configure an item of the initial tree. Failures are recorded.
    pub fn configure(mut self, name: &str, config: &Config) -> Self {
        let result = match self.root.find_mut(name) {
            Some(item) => item.set_config(config).map_err(|e| e.to_string()),
            None => Err(format!("no item named \"{name}\"")),
        };
        if let Err(message) = result {
            self.record_startup_error(message);
        }
        self
    }

    /// Record an error found while building the app. Any recorded error
    /// makes `run` show the error console instead of the app.
    pub fn record_startup_error(&mut self, message: impl std::fmt::Display) {
        log::error!("Startup error: {}", message);
        self.errors.push(message.to_string());
    }

    pub fn startup_errors(&self) -> &[String] {
        &self.errors
    }

    pub fn view_mode(&self) -> ViewMode {
        ViewMode::select(
            !self.errors.is_empty(),
            self.config.editor,
            self.config.documentation,
        )
    }

    /// Open a Wayland window and run until it is closed.
    pub fn run(self) -> Result<(), Error> {
        let _ = env_logger::try_init();
        let mut render_loop = RenderLoop::<WaylandPlatform>::new();
        registry::init();
        let result = render_loop.initialize(&self.config);
        if let Err(e) = result {
            log::error!("Failed to start: {}", e);
            registry::teardown();
            return Err(e.into());
        }
        self.run_loop(render_loop).map(|_| ())
    }

    /// Run on an adapter created by the caller and hand back the final
    /// scene.
    pub fn run_on<P: Platform>(self, platform: P) -> Result<Scene, Error> {
        let mut render_loop = RenderLoop::new();
        registry::init();
        render_loop.initialize_with(platform, &self.config);
        self.run_loop(render_loop)
    }

    fn run_loop<P: Platform>(self, mut render_loop: RenderLoop<P>) -> Result<Scene, Error> {
        let mode = self.view_mode();
        let mut scene = Scene::new(self.root, self.jobs);
        scene.errors = self.errors;

        let mut selector = ViewSelector::new(mode, scene);
        let result = render_loop.run(&mut selector);
        drop(render_loop);
        registry::teardown();

        result?;
        Ok(selector.into_scene())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::platform::HeadlessPlatform;

    #[test]
    fn test_builder_sets_config() {
        let app = App::new()
            .title("Demo")
            .width(640)
            .height(480)
            .vsync(false)
            .editor(true);
        let config = app.config();
        assert_eq!(config.title, "Demo");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(!config.vsync);
        assert_eq!(app.view_mode(), ViewMode::Editor);
    }

    #[test]
    fn test_startup_error_selects_console() {
        let app = App::new()
            .add_window(Item::window("Main"))
            .add_item("missing", "", Item::button("b"))
            .configure("Main", &config! { "colour" => 1 });
        assert_eq!(app.startup_errors().len(), 2);
        assert_eq!(app.view_mode(), ViewMode::ErrorConsole);
    }

    #[test]
    fn test_run_on_headless_until_close() {
        let _guard = registry::exclusive();
        let app = App::new()
            .add_window(Item::window("Main"))
            .add_item("Main", "", Item::button("ok"));
        let jobs = app.jobs();
        jobs.configure("ok", config! { "label" => "Okay" });

        let platform = HeadlessPlatform::new(320, 240).close_after(2);
        let record = platform.record();
        let scene = app.run_on(platform).unwrap();

        assert_eq!(scene.root.find("ok").unwrap().label(), "Okay");
        assert!(!registry::is_initialized());
        let record = record.lock().unwrap();
        assert_eq!(record.frames_presented, 2);
        assert_eq!(record.shutdowns, 1);
        assert!(record.last_frame.as_ref().unwrap().contains_text("Okay"));
    }
}
