//! The closed set of item kinds and their kind-specific configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

use super::config::{Config, ConfigValue, ValueType};

/// Keys every item accepts, whatever its kind.
pub const COMMON_KEYS: &[(&str, ValueType)] = &[
    ("name", ValueType::Text),
    ("label", ValueType::Text),
    ("popup", ValueType::Text),
    ("tip", ValueType::Text),
    ("width", ValueType::Int),
    ("height", ValueType::Int),
    ("show", ValueType::Bool),
    ("data_source", ValueType::Text),
];

const WINDOW_KEYS: &[(&str, ValueType)] = &[
    ("x_pos", ValueType::Int),
    ("y_pos", ValueType::Int),
    ("autosize", ValueType::Bool),
    ("no_move", ValueType::Bool),
];
const GROUP_KEYS: &[(&str, ValueType)] =
    &[("horizontal", ValueType::Bool), ("spacing", ValueType::Float)];
const HEADER_KEYS: &[(&str, ValueType)] = &[("default_open", ValueType::Bool)];
const BUTTON_KEYS: &[(&str, ValueType)] = &[("small", ValueType::Bool)];
const TEXT_KEYS: &[(&str, ValueType)] =
    &[("default_value", ValueType::Text), ("bullet", ValueType::Bool)];
const CHECKBOX_KEYS: &[(&str, ValueType)] = &[("default_value", ValueType::Bool)];

/// Discriminant of [`ItemKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Root,
    Window,
    Group,
    CollapsingHeader,
    Tooltip,
    Popup,
    Button,
    Text,
    Checkbox,
}

impl KindTag {
    pub const ALL: [KindTag; 9] = [
        KindTag::Root,
        KindTag::Window,
        KindTag::Group,
        KindTag::CollapsingHeader,
        KindTag::Tooltip,
        KindTag::Popup,
        KindTag::Button,
        KindTag::Text,
        KindTag::Checkbox,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KindTag::Root => "root",
            KindTag::Window => "window",
            KindTag::Group => "group",
            KindTag::CollapsingHeader => "collapsing_header",
            KindTag::Tooltip => "tooltip",
            KindTag::Popup => "popup",
            KindTag::Button => "button",
            KindTag::Text => "text",
            KindTag::Checkbox => "checkbox",
        }
    }

    /// One-line description shown by the documentation view.
    pub fn summary(self) -> &'static str {
        match self {
            KindTag::Root => "Top of the tree; draws its windows.",
            KindTag::Window => "A movable panel holding other items.",
            KindTag::Group => "Lays its children out vertically or horizontally.",
            KindTag::CollapsingHeader => "A header that shows its children while open.",
            KindTag::Tooltip => "Shown next to the pointer while the preceding item is hovered.",
            KindTag::Popup => "Opened by right-clicking the item that names it in `popup`.",
            KindTag::Button => "A clickable button.",
            KindTag::Text => "A line of text.",
            KindTag::Checkbox => "A boolean toggle.",
        }
    }

    /// Kind-specific configuration keys, on top of [`COMMON_KEYS`].
    pub fn config_keys(self) -> &'static [(&'static str, ValueType)] {
        match self {
            KindTag::Window => WINDOW_KEYS,
            KindTag::Group => GROUP_KEYS,
            KindTag::CollapsingHeader => HEADER_KEYS,
            KindTag::Button => BUTTON_KEYS,
            KindTag::Text => TEXT_KEYS,
            KindTag::Checkbox => CHECKBOX_KEYS,
            KindTag::Root | KindTag::Tooltip | KindTag::Popup => &[],
        }
    }

    /// The type of `key` for this kind, common keys included.
    pub fn key_type(self, key: &str) -> Option<ValueType> {
        COMMON_KEYS
            .iter()
            .chain(self.config_keys())
            .find(|(k, _)| *k == key)
            .map(|(_, ty)| *ty)
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            KindTag::Root
                | KindTag::Window
                | KindTag::Group
                | KindTag::CollapsingHeader
                | KindTag::Tooltip
                | KindTag::Popup
        )
    }

    pub fn default_kind(self) -> ItemKind {
        match self {
            KindTag::Root => ItemKind::Root,
            KindTag::Window => ItemKind::Window(WindowKind::default()),
            KindTag::Group => ItemKind::Group(GroupKind::default()),
            KindTag::CollapsingHeader => ItemKind::CollapsingHeader(HeaderKind::default()),
            KindTag::Tooltip => ItemKind::Tooltip,
            KindTag::Popup => ItemKind::Popup,
            KindTag::Button => ItemKind::Button(ButtonKind::default()),
            KindTag::Text => ItemKind::Text(TextKind::default()),
            KindTag::Checkbox => ItemKind::Checkbox(CheckboxKind::default()),
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KindTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KindTag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| ConfigError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowKind {
    pub x_pos: i64,
    pub y_pos: i64,
    pub autosize: bool,
    pub no_move: bool,
    /// Set when the position was configured and the window must move
    pub(crate) reposition: bool,
}

impl Default for WindowKind {
    fn default() -> Self {
        Self {
            x_pos: 200,
            y_pos: 200,
            autosize: false,
            no_move: false,
            reposition: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupKind {
    pub horizontal: bool,
    /// Gap between children; negative uses the theme spacing
    pub spacing: f64,
}

impl Default for GroupKind {
    fn default() -> Self {
        Self {
            horizontal: false,
            spacing: -1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderKind {
    pub default_open: bool,
    pub open: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonKind {
    pub small: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextKind {
    pub value: String,
    pub bullet: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckboxKind {
    pub value: bool,
}

/// Kind of an item together with its kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Root,
    Window(WindowKind),
    Group(GroupKind),
    CollapsingHeader(HeaderKind),
    Tooltip,
    Popup,
    Button(ButtonKind),
    Text(TextKind),
    Checkbox(CheckboxKind),
}

impl ItemKind {
    pub fn tag(&self) -> KindTag {
        match self {
            ItemKind::Root => KindTag::Root,
            ItemKind::Window(_) => KindTag::Window,
            ItemKind::Group(_) => KindTag::Group,
            ItemKind::CollapsingHeader(_) => KindTag::CollapsingHeader,
            ItemKind::Tooltip => KindTag::Tooltip,
            ItemKind::Popup => KindTag::Popup,
            ItemKind::Button(_) => KindTag::Button,
            ItemKind::Text(_) => KindTag::Text,
            ItemKind::Checkbox(_) => KindTag::Checkbox,
        }
    }

    /// Store a kind-specific key. The key and value type must already
    /// have been validated against [`KindTag::config_keys`].
    pub(crate) fn apply(&mut self, key: &str, value: &ConfigValue) {
        match (self, key) {
            (ItemKind::Window(w), "x_pos") => {
                w.x_pos = value.as_int().unwrap_or(w.x_pos);
                w.reposition = true;
            }
            (ItemKind::Window(w), "y_pos") => {
                w.y_pos = value.as_int().unwrap_or(w.y_pos);
                w.reposition = true;
            }
            (ItemKind::Window(w), "autosize") => w.autosize = value.as_bool().unwrap_or(w.autosize),
            (ItemKind::Window(w), "no_move") => w.no_move = value.as_bool().unwrap_or(w.no_move),
            (ItemKind::Group(g), "horizontal") => {
                g.horizontal = value.as_bool().unwrap_or(g.horizontal)
            }
            (ItemKind::Group(g), "spacing") => g.spacing = value.as_float().unwrap_or(g.spacing),
            (ItemKind::CollapsingHeader(h), "default_open") => {
                h.default_open = value.as_bool().unwrap_or(h.default_open)
            }
            (ItemKind::Button(b), "small") => b.small = value.as_bool().unwrap_or(b.small),
            (ItemKind::Text(t), "default_value") => {
                if let Some(text) = value.as_text() {
                    t.value = text.to_string();
                }
            }
            (ItemKind::Text(t), "bullet") => t.bullet = value.as_bool().unwrap_or(t.bullet),
            (ItemKind::Checkbox(c), "default_value") => {
                c.value = value.as_bool().unwrap_or(c.value)
            }
            (kind, key) => log::warn!("{} ignores configuration \"{}\"", kind.tag(), key),
        }
    }

    pub(crate) fn write_config(&self, config: &mut Config) {
        let mut put = |key: &str, value: ConfigValue| {
            config.insert(key.to_string(), value);
        };
        match self {
            ItemKind::Window(w) => {
                put("x_pos", w.x_pos.into());
                put("y_pos", w.y_pos.into());
                put("autosize", w.autosize.into());
                put("no_move", w.no_move.into());
            }
            ItemKind::Group(g) => {
                put("horizontal", g.horizontal.into());
                put("spacing", g.spacing.into());
            }
            ItemKind::CollapsingHeader(h) => put("default_open", h.default_open.into()),
            ItemKind::Button(b) => put("small", b.small.into()),
            ItemKind::Text(t) => {
                put("default_value", t.value.as_str().into());
                put("bullet", t.bullet.into());
            }
            ItemKind::Checkbox(c) => put("default_value", c.value.into()),
            ItemKind::Root | ItemKind::Tooltip | ItemKind::Popup => {}
        }
    }

    /// The value type this kind displays from a data source, if any.
    pub fn data_type(&self) -> Option<ValueType> {
        match self {
            ItemKind::Text(_) => Some(ValueType::Text),
            ItemKind::Checkbox(_) => Some(ValueType::Bool),
            _ => None,
        }
    }

    /// Take a value resolved from the data registry. Returns false when
    /// the value's type does not fit this kind.
    pub(crate) fn set_data_value(&mut self, value: &ConfigValue) -> bool {
        match (self, value) {
            (ItemKind::Text(t), ConfigValue::Text(text)) => {
                t.value.clone_from(text);
                true
            }
            (ItemKind::Checkbox(c), ConfigValue::Bool(b)) => {
                c.value = *b;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_names() {
        for tag in KindTag::ALL {
            assert_eq!(tag.name().parse::<KindTag>(), Ok(tag));
        }
        assert_eq!(
            "slider".parse::<KindTag>(),
            Err(ConfigError::UnknownKind("slider".into()))
        );
    }

    #[test]
    fn test_key_types_include_common_keys() {
        assert_eq!(KindTag::Button.key_type("width"), Some(ValueType::Int));
        assert_eq!(KindTag::Button.key_type("small"), Some(ValueType::Bool));
        assert_eq!(KindTag::Text.key_type("small"), None);
    }

    #[test]
    fn test_data_value_type_checked() {
        let mut kind = KindTag::Checkbox.default_kind();
        assert!(kind.set_data_value(&ConfigValue::Bool(true)));
        assert!(!kind.set_data_value(&ConfigValue::Text("yes".into())));
        assert_eq!(kind, ItemKind::Checkbox(CheckboxKind { value: true }));
    }
}
