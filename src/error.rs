use thiserror::Error;

use crate::item::ValueType;

/// Rejected item configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("\"{key}\" configuration does not exist in \"{item}\"")]
    UnknownKey { item: String, key: String },
    #[error("\"{key}\" in \"{item}\" expects {expected}, got {found}")]
    TypeMismatch {
        item: String,
        key: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("\"{item}\" is missing required configuration \"{key}\"")]
    MissingField { item: String, key: String },
    #[error("\"{0}\" is not an item kind")]
    UnknownKind(String),
}

/// Failure of a queued tree operation.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("{op}: no item named \"{name}\"")]
    NotFound { op: &'static str, name: String },
    #[error("{op}: could not place \"{item}\"")]
    Rejected { op: &'static str, item: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure while drawing a single item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("\"{item}\" cannot display data source \"{source_name}\": expected {expected}, got {found}")]
    DataSourceType {
        item: String,
        source_name: String,
        expected: ValueType,
        found: ValueType,
    },
}

/// Platform or graphics failure.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("failed to connect to the display server: {0}")]
    Connect(String),
    #[error("display protocol error: {0}")]
    Protocol(String),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("failed to create surface: {0}")]
    Surface(String),
    #[error("failed to present frame: {0}")]
    Present(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("the data registry is not initialized")]
    NotInitialized,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, Error>;
