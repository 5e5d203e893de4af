//! Adds, moves and removes items while the window is open.
//!
//! Run with `RUST_LOG=debug` to watch the queued jobs being applied.
//! Pass `--editor` to open the item inspector, `--docs` for the kind
//! reference.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use trellis::prelude::*;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let counter = AtomicUsize::new(0);

    let controls = Item::window("Controls")
        .with_label("Runtime tree")
        .with_child(
            Item::group("buttons")
                .with_child(
                    Item::button("add")
                        .with_label("Add item")
                        .with_tip("Append a text item to the list")
                        .with_callback(move |ctx| {
                            let n = counter.fetch_add(1, Ordering::Relaxed);
                            ctx.jobs.add_runtime_child(
                                "list",
                                "",
                                Item::text(format!("item{n}"), format!("Item {n}")),
                            );
                        }),
                )
                .with_child(Item::button("down").with_label("Move first down").with_callback(
                    |ctx| {
                        ctx.jobs.move_down("first");
                    },
                ))
                .with_child(Item::button("hide").with_label("Hide list").with_callback(|ctx| {
                    ctx.jobs.hide_all("list");
                }))
                .with_child(Item::button("show").with_label("Show list").with_callback(|ctx| {
                    ctx.jobs.show_all("list");
                })),
        )
        .with_child(Item::checkbox("ticking", true).with_data_source("ticking"))
        .with_child(
            Item::collapsing_header("list")
                .with_label("Items")
                .with_child(Item::text("first", "First item"))
                .with_child(Item::text("clock", "0s elapsed")),
        );

    let app = App::new()
        .title("trellis runtime tree")
        .width(900)
        .height(600)
        .editor(args.iter().any(|a| a == "--editor"))
        .documentation(args.iter().any(|a| a == "--docs"))
        .add_window(controls)
        .configure("list", &config! { "default_open" => true });

    // Update the clock text from a background thread through the queue
    let jobs = app.jobs();
    std::thread::spawn(move || {
        for tick in 0u64.. {
            std::thread::sleep(Duration::from_secs(1));
            jobs.configure("clock", config! { "default_value" => format!("{tick}s elapsed") });
        }
    });

    if let Err(e) = app.run() {
        eprintln!("trellis: {e}");
        std::process::exit(1);
    }
}
