use trellis::prelude::*;

/// Root -> [A, B -> [C]]
fn sample() -> Item {
    Item::root()
        .with_child(Item::window("A"))
        .with_child(Item::window("B").with_child(Item::button("C")))
}

fn children(root: &Item, name: &str) -> Vec<String> {
    root.find(name)
        .unwrap()
        .child_names()
        .into_iter()
        .map(String::from)
        .collect()
}

#[test]
fn test_runtime_mutation_scenario() {
    let mut root = sample();

    root.add_runtime_child("B", "", Item::button("D")).unwrap();
    assert_eq!(children(&root, "B"), ["C", "D"]);

    root.add_child_after("C", Item::button("E")).unwrap();
    assert_eq!(children(&root, "B"), ["C", "E", "D"]);

    assert!(root.move_child_up("D"));
    assert_eq!(children(&root, "B"), ["C", "D", "E"]);

    assert!(root.delete_child("E"));
    assert_eq!(children(&root, "B"), ["C", "D"]);
    assert!(!root.delete_child("E"));

    assert_eq!(root.find("D").unwrap().parent(), Some("B"));
}

#[test]
fn test_same_scenario_through_jobs() {
    let mut root = sample();
    let jobs = JobQueue::new();

    jobs.add_runtime_child("B", "", Item::button("D"));
    jobs.add_child_after("C", Item::button("E"));
    jobs.move_up("D");
    jobs.delete("E");
    assert_eq!(jobs.apply_pending(&mut root), 4);

    assert_eq!(children(&root, "B"), ["C", "D"]);
}

#[test]
fn test_state_propagates_through_subtree() {
    let mut root = sample();
    root.add_runtime_child("C", "", Item::text("never", "x"))
        .unwrap_err();

    root.find_mut("B").unwrap().update_data_source("shared");
    let mut sources = Vec::new();
    root.find("B")
        .unwrap()
        .walk(&mut |item| sources.push(item.data_source().to_string()));
    assert_eq!(sources, ["shared", "shared"]);

    root.add_runtime_child("B", "", Item::tooltip("tip")).unwrap();
    root.hide_all();
    root.walk(&mut |item| {
        if item.tag() == KindTag::Tooltip {
            assert!(item.is_shown());
        } else {
            assert!(!item.is_shown(), "{} still shown", item.name());
        }
    });

    root.reset_state();
    root.walk(&mut |item| assert_eq!(item.state(), ItemState::empty()));
}

#[test]
fn test_config_round_trip_from_binding_layer() {
    let mut item = Item::from_config(
        "window".parse().unwrap(),
        &config! { "name" => "Main", "x_pos" => 10, "autosize" => true },
    )
    .unwrap();
    assert_eq!(item.name(), "Main");

    let err = item
        .set_config(&config! { "autosize" => "yes" })
        .unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { .. }));

    let config = item.get_config();
    assert_eq!(config["x_pos"], ConfigValue::Int(10));
    assert_eq!(config["autosize"], ConfigValue::Bool(true));
}
