//! Widget tree nodes.
//!
//! An [`Item`] owns its children outright; the parent link is only the
//! parent's name. All tree lookups and mutations go through names (see
//! the `tree` module).

mod config;
mod draw;
mod kind;
mod state;

use std::any::Any;
use std::fmt;

pub use config::{Config, ConfigValue, ValueType};
pub use draw::{DrawContext, StyleScope};
pub use kind::{
    ButtonKind, CheckboxKind, GroupKind, HeaderKind, ItemKind, KindTag, TextKind, WindowKind,
    COMMON_KEYS,
};
pub use state::ItemState;

use crate::error::ConfigError;
use crate::jobs::JobQueue;
use crate::registry;
use crate::renderer::{Color, FrameRenderer, StyleSlot};

/// What a callback receives when its item fires.
pub struct CallbackContext<'a> {
    /// Name of the item that fired
    pub sender: &'a str,
    pub data: Option<&'a (dyn Any + Send)>,
    /// Queue for tree changes; applied at the start of the next frame
    pub jobs: &'a JobQueue,
}

pub type Callback = Box<dyn FnMut(&mut CallbackContext<'_>) + Send>;
pub type CallbackData = Box<dyn Any + Send>;

pub struct Item {
    pub(crate) name: String,
    label: Option<String>,
    popup: String,
    tip: String,
    width: i64,
    height: i64,
    show: bool,
    data_source: String,
    pub(crate) state: ItemState,
    styles: Vec<(StyleSlot, Color)>,
    callback: Option<Callback>,
    callback_data: Option<CallbackData>,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<Item>,
    pub(crate) container: bool,
    pub(crate) kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        let container = kind.tag().is_container();
        Self {
            name: name.into(),
            label: None,
            popup: String::new(),
            tip: String::new(),
            width: 0,
            height: 0,
            show: true,
            data_source: String::new(),
            state: ItemState::empty(),
            styles: Vec::new(),
            callback: None,
            callback_data: None,
            parent: None,
            children: Vec::new(),
            container,
            kind,
        }
    }

    pub fn root() -> Self {
        Self::new("root", ItemKind::Root)
    }

    pub fn window(name: impl Into<String>) -> Self {
        Self::new(name, KindTag::Window.default_kind())
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, KindTag::Group.default_kind())
    }

    pub fn collapsing_header(name: impl Into<String>) -> Self {
        Self::new(name, KindTag::CollapsingHeader.default_kind())
    }

    pub fn tooltip(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Tooltip)
    }

    pub fn popup(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Popup)
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self::new(name, KindTag::Button.default_kind())
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            ItemKind::Text(TextKind {
                value: value.into(),
                bullet: false,
            }),
        )
    }

    pub fn checkbox(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, ItemKind::Checkbox(CheckboxKind { value }))
    }

    /// Build an item of `tag` from a config; `name` is required.
    pub fn from_config(tag: KindTag, config: &Config) -> Result<Self, ConfigError> {
        let name = match config.get("name") {
            Some(ConfigValue::Text(name)) => name.clone(),
            Some(other) => {
                return Err(ConfigError::TypeMismatch {
                    item: tag.name().into(),
                    key: "name".into(),
                    expected: ValueType::Text,
                    found: other.value_type(),
                })
            }
            None => {
                return Err(ConfigError::MissingField {
                    item: tag.name().into(),
                    key: "name".into(),
                })
            }
        };
        let mut item = Self::new(name, tag.default_kind());
        item.set_config(config)?;
        Ok(item)
    }

    // Builders

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = tip.into();
        self
    }

    pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
        self.popup = popup.into();
        self
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = source.into();
        self
    }

    pub fn with_color(mut self, slot: StyleSlot, color: Color) -> Self {
        self.add_color_style(slot, color);
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut CallbackContext<'_>) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn with_child(mut self, child: Item) -> Self {
        self.add_child(child);
        self
    }

    // Accessors

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label; the name unless one was set.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ItemKind {
        &mut self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn is_container(&self) -> bool {
        self.container
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.show
    }

    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    pub fn tip(&self) -> &str {
        &self.tip
    }

    pub fn popup_name(&self) -> &str {
        &self.popup
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn size(&self) -> (i64, i64) {
        (self.width, self.height)
    }

    // Configuration

    /// Validate a config against this item's key set without applying it.
    pub fn check_config(&self, config: &Config) -> Result<(), ConfigError> {
        let tag = self.tag();
        for (key, value) in config {
            let expected = tag.key_type(key).ok_or_else(|| ConfigError::UnknownKey {
                item: self.name.clone(),
                key: key.clone(),
            })?;
            if !expected.accepts(value) {
                return Err(ConfigError::TypeMismatch {
                    item: self.name.clone(),
                    key: key.clone(),
                    expected,
                    found: value.value_type(),
                });
            }
        }
        Ok(())
    }

    /// Apply every key of `config`. Nothing is applied if any key is
    /// rejected.
    pub fn set_config(&mut self, config: &Config) -> Result<(), ConfigError> {
        self.check_config(config)?;
        for (key, value) in config {
            match (key.as_str(), value) {
                ("name", ConfigValue::Text(name)) => self.rename(name),
                ("label", ConfigValue::Text(label)) => self.label = Some(label.clone()),
                ("popup", ConfigValue::Text(popup)) => self.popup.clone_from(popup),
                ("tip", ConfigValue::Text(tip)) => self.tip.clone_from(tip),
                ("width", ConfigValue::Int(width)) => self.width = *width,
                ("height", ConfigValue::Int(height)) => self.height = *height,
                ("show", ConfigValue::Bool(show)) => self.show = *show,
                ("data_source", ConfigValue::Text(source)) => self.data_source.clone_from(source),
                (key, value) => self.kind.apply(key, value),
            }
        }
        Ok(())
    }

    pub fn get_config(&self) -> Config {
        let mut config = Config::new();
        config.insert("name".into(), self.name.as_str().into());
        config.insert("label".into(), self.label().into());
        config.insert("popup".into(), self.popup.as_str().into());
        config.insert("tip".into(), self.tip.as_str().into());
        config.insert("width".into(), self.width.into());
        config.insert("height".into(), self.height.into());
        config.insert("show".into(), self.show.into());
        config.insert("data_source".into(), self.data_source.as_str().into());
        self.kind.write_config(&mut config);
        config
    }

    fn rename(&mut self, name: &str) {
        if self.name != name {
            log::debug!("Renaming \"{}\" to \"{}\"", self.name, name);
            self.name = name.to_string();
            for child in &mut self.children {
                child.parent = Some(self.name.clone());
            }
        }
    }

    // State

    /// Clear the interaction flags here and in every descendant.
    pub fn reset_state(&mut self) {
        self.state = ItemState::empty();
        for child in &mut self.children {
            child.reset_state();
        }
    }

    /// Bind this item and every descendant to the data source `name` and
    /// re-resolve their values from the registry.
    pub fn update_data_source(&mut self, name: &str) {
        self.data_source = name.to_string();
        self.refresh_data();
        for child in &mut self.children {
            child.update_data_source(name);
        }
    }

    /// Pull the bound value from the registry into the kind's fields.
    pub fn refresh_data(&mut self) {
        if self.data_source.is_empty() {
            return;
        }
        if let Some(value) = registry::value(&self.data_source) {
            if self.kind.data_type().is_some() && !self.kind.set_data_value(&value) {
                log::warn!(
                    "\"{}\" cannot display data source \"{}\" holding {}",
                    self.name,
                    self.data_source,
                    value.value_type()
                );
            }
        }
    }

    pub fn show_all(&mut self) {
        self.show = true;
        for child in &mut self.children {
            child.show_all();
        }
    }

    /// Hide this item and its descendants. Tooltips keep their visibility.
    pub fn hide_all(&mut self) {
        if self.tag() != KindTag::Tooltip {
            self.show = false;
        }
        for child in &mut self.children {
            child.hide_all();
        }
    }

    // Styles

    pub fn add_color_style(&mut self, slot: StyleSlot, color: Color) {
        self.styles.push((slot, color));
    }

    /// Push this item's colour overrides; returns how many were pushed.
    pub fn push_color_styles(&self, ui: &mut FrameRenderer) -> usize {
        for (slot, color) in &self.styles {
            ui.push_style_color(*slot, *color);
        }
        self.styles.len()
    }

    pub fn pop_color_styles(&self, ui: &mut FrameRenderer) {
        if !self.styles.is_empty() {
            ui.pop_style_color(self.styles.len());
        }
    }

    pub fn clear_colors(&mut self) {
        self.styles.clear();
    }

    pub fn color_styles(&self) -> &[(StyleSlot, Color)] {
        &self.styles
    }

    // Callbacks

    pub fn set_callback(&mut self, callback: Option<Callback>) {
        self.callback = callback;
    }

    pub fn set_callback_data(&mut self, data: Option<CallbackData>) {
        self.callback_data = data;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn callback_data(&self) -> Option<&(dyn Any + Send)> {
        self.callback_data.as_deref()
    }

    /// Run the callback, if any, with this item as the sender.
    pub fn invoke_callback(&mut self, jobs: &JobQueue) {
        if let Some(callback) = self.callback.as_mut() {
            log::trace!("Running callback of \"{}\"", self.name);
            let mut ctx = CallbackContext {
                sender: &self.name,
                data: self.callback_data.as_deref(),
                jobs,
            };
            callback(&mut ctx);
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("kind", &self.kind.tag())
            .field("show", &self.show)
            .field("state", &self.state)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl Drop for Item {
    fn drop(&mut self) {
        // Subtree first, then what the item owns itself
        self.children.clear();
        self.callback = None;
        self.callback_data = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::config;

    #[test]
    fn test_label_defaults_to_name() {
        let item = Item::button("Save");
        assert_eq!(item.label(), "Save");
        assert_eq!(item.with_label("Save file").label(), "Save file");
    }

    #[test]
    fn test_set_config_round_trips_through_get_config() {
        let mut item = Item::button("Save");
        item.set_config(&config! { "width" => 120, "tip" => "Writes to disk", "small" => true })
            .unwrap();

        let config = item.get_config();
        assert_eq!(config["width"], ConfigValue::Int(120));
        assert_eq!(config["tip"], ConfigValue::Text("Writes to disk".into()));
        assert_eq!(config["small"], ConfigValue::Bool(true));
        assert_eq!(config["label"], ConfigValue::Text("Save".into()));
    }

    #[test]
    fn test_unknown_key_is_rejected_without_changes() {
        let mut item = Item::button("Save");
        let err = item
            .set_config(&config! { "width" => 50, "colour" => "red" })
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownKey {
                item: "Save".into(),
                key: "colour".into()
            }
        );
        assert_eq!(item.size(), (0, 0));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut item = Item::window("Main");
        let err = item.set_config(&config! { "autosize" => 1 }).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { expected: ValueType::Bool, .. }));
    }

    #[test]
    fn test_kind_keys_are_not_shared() {
        let mut item = Item::text("t", "hello");
        assert!(item.set_config(&config! { "small" => true }).is_err());
        item.set_config(&config! { "bullet" => true }).unwrap();
        assert_eq!(item.get_config()["bullet"], ConfigValue::Bool(true));
    }

    #[test]
    fn test_from_config_requires_name() {
        let err = Item::from_config(KindTag::Button, &config! { "label" => "x" }).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));

        let item =
            Item::from_config(KindTag::Checkbox, &config! { "name" => "c", "default_value" => true })
                .unwrap();
        assert_eq!(item.kind(), &ItemKind::Checkbox(CheckboxKind { value: true }));
    }

    #[test]
    fn test_rename_updates_children_parent() {
        let mut window = Item::window("Main").with_child(Item::button("Ok"));
        window.set_config(&config! { "name" => "Primary" }).unwrap();
        assert_eq!(window.children()[0].parent(), Some("Primary"));
    }

    #[test]
    fn test_container_flag() {
        assert!(Item::window("w").is_container());
        assert!(!Item::button("b").is_container());
        assert!(Item::button("b").with_child(Item::tooltip("t")).is_container());
    }

    #[test]
    fn test_hide_all_keeps_tooltips() {
        let mut window = Item::window("Main")
            .with_child(Item::button("Ok"))
            .with_child(Item::tooltip("Hint").with_child(Item::text("HintText", "hi")));
        window.hide_all();

        assert!(!window.is_shown());
        assert!(!window.children()[0].is_shown());
        assert!(window.children()[1].is_shown());
        assert!(!window.children()[1].children()[0].is_shown());

        window.show_all();
        assert!(window.children()[1].children()[0].is_shown());
    }

    #[test]
    fn test_callback_receives_sender_and_data() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let mut item = Item::button("Save").with_callback(move |ctx| {
            assert_eq!(ctx.sender, "Save");
            let data = ctx.data.and_then(|d| d.downcast_ref::<u32>()).copied();
            assert_eq!(data, Some(7));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        item.set_callback_data(Some(Box::new(7u32)));

        item.invoke_callback(&JobQueue::new());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_payload_and_children() {
        struct Flag(Arc<AtomicUsize>);
        impl Drop for Flag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let mut child = Item::button("Child");
        child.set_callback_data(Some(Box::new(Flag(drops.clone()))));
        let mut parent = Item::window("Parent").with_child(child);
        parent.set_callback_data(Some(Box::new(Flag(drops.clone()))));

        drop(parent);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_replacing_payload_drops_previous() {
        let drops = Arc::new(AtomicUsize::new(0));
        struct Flag(Arc<AtomicUsize>);
        impl Drop for Flag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut item = Item::button("b");
        item.set_callback_data(Some(Box::new(Flag(drops.clone()))));
        item.set_callback_data(None);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_update_data_source_recurses() {
        let mut window = Item::window("w")
            .with_child(Item::group("g").with_child(Item::text("t", "")));
        window.update_data_source("status");

        let mut sources = Vec::new();
        window.walk(&mut |item| sources.push(item.data_source().to_string()));
        assert!(sources.iter().all(|s| s == "status"));
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn test_reset_state_clears_all_depths() {
        let mut root = Item::root().with_child(
            Item::window("w").with_child(Item::group("g").with_child(Item::button("b"))),
        );
        root.walk_mut(&mut |item| item.state = ItemState::HOVERED | ItemState::CLICKED);
        root.reset_state();

        let mut states = Vec::new();
        root.walk(&mut |item| states.push(item.state()));
        assert!(states.iter().all(|s| s.is_empty()));
    }
}
