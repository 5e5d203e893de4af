use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use trellis::driver::{LoopState, RenderLoop};
use trellis::platform::{HeadlessPlatform, MouseButton, PlatformEvent};
use trellis::prelude::*;
use trellis::view::{Scene, ViewMode, ViewSelector};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_loop_completes_closing_frame_then_shuts_down_once() {
    init_logger();
    let platform = HeadlessPlatform::new(640, 480).close_after(4);
    let record = platform.record();

    let mut render_loop = RenderLoop::new();
    render_loop.initialize_with(platform, &AppConfig::default());
    let mut selector = ViewSelector::new(
        ViewMode::MainApplication,
        Scene::new(
            Item::root().with_child(Item::window("Main").with_child(Item::text("t", "hi"))),
            JobQueue::new(),
        ),
    );
    render_loop.run(&mut selector).unwrap();
    assert_eq!(render_loop.state(), LoopState::ShuttingDown);
    render_loop.shutdown();
    drop(render_loop);

    let record = record.lock().unwrap();
    assert_eq!(record.polls, 4);
    assert_eq!(record.frames_presented, 4);
    assert_eq!(record.shutdowns, 1);
    assert!(record.last_frame.as_ref().unwrap().contains_text("hi"));
}

#[test]
fn test_clear_color_from_config() {
    init_logger();
    let color = Color::rgb(0.2, 0.3, 0.4);
    let platform = HeadlessPlatform::new(100, 100).close_after(1);
    let record = platform.record();

    App::new().clear_color(color).run_on(platform).unwrap();
    assert_eq!(record.lock().unwrap().clear_colors, [color]);
}

#[test]
fn test_jobs_from_another_thread_apply_between_frames() {
    init_logger();
    let app = App::new().add_window(Item::window("Main"));
    let jobs = app.jobs();
    std::thread::spawn(move || {
        jobs.add_runtime_child("Main", "", Item::text("remote", "from thread"));
    })
    .join()
    .unwrap();

    let platform = HeadlessPlatform::new(800, 600).close_after(1);
    let record = platform.record();
    let scene = app.run_on(platform).unwrap();

    assert!(scene.root.find("remote").is_some());
    assert!(record
        .lock()
        .unwrap()
        .last_frame
        .as_ref()
        .unwrap()
        .contains_text("from thread"));
}

#[test]
fn test_checkbox_click_writes_registry_and_fires_callback() {
    init_logger();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();

    // Window content starts at (208, 227); the checkbox is the first item
    let platform = HeadlessPlatform::new(800, 600)
        .with_frame_events(vec![])
        .with_frame_events(vec![
            PlatformEvent::PointerMoved { x: 212.0, y: 232.0 },
            PlatformEvent::PointerButton {
                button: MouseButton::Left,
                pressed: true,
            },
        ])
        .with_frame_events(vec![PlatformEvent::PointerButton {
            button: MouseButton::Left,
            pressed: false,
        }])
        .close_after(3);

    let app = App::new().add_window(
        Item::window("Main").with_child(
            Item::checkbox("flag", false)
                .with_data_source("flag_value")
                .with_callback(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
        ),
    );
    let scene = app.run_on(platform).unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let config = scene.root.find("flag").unwrap().get_config();
    assert_eq!(config["default_value"], ConfigValue::Bool(true));
}

#[test]
fn test_error_console_when_startup_failed() {
    init_logger();
    let platform = HeadlessPlatform::new(640, 480).close_after(1);
    let record = platform.record();

    App::new()
        .add_window(Item::window("Main"))
        .configure("Main", &config! { "nonsense" => true })
        .run_on(platform)
        .unwrap();

    let record = record.lock().unwrap();
    let frame = record.last_frame.as_ref().unwrap();
    assert!(frame.contains_text("Error Console"));
    assert!(frame.contains_text("\"nonsense\" configuration does not exist in \"Main\""));
}
