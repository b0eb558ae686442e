use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    ZeroSized { width: usize, height: usize },
    #[error("expected {expected} cells of map data, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("expected no value to be present for key <{key}>")]
    DuplicateKey { key: String },
    #[error("expected size of {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CasterError {
    /// The caster was built without an occupancy source.
    #[error("expected a map, got none")]
    MissingMap,
    /// `cast` received a value it cannot traverse with (NaN, infinite, negative range).
    #[error("invalid cast argument `{name}`: {value}")]
    InvalidArgument { name: &'static str, value: f64 },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("texture of {width}x{height} needs {expected} pixels, got {actual}")]
    PixelCount {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config toml")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
