//! Error types for the battle core.
//!
//! The tick loop itself is infallible; these cover configuration, the FFI
//! bridge and the renderer seam.

use std::path::PathBuf;

/// Error type for configuration and host-boundary operations
#[derive(Debug, thiserror::Error)]
pub enum BattleError {
    #[error("Failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),
    #[error("Null pointer passed for {0}")]
    NullPointer(&'static str),
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("Unknown battle handle {0}")]
    InvalidHandle(u64),
}

/// Failures a renderer may report; logged by the clock, never propagated
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render surface missing")]
    SurfaceMissing,
    #[error("Assets not ready: {0}")]
    AssetsNotReady(String),
    #[error("Render failed: {0}")]
    Other(String),
}
