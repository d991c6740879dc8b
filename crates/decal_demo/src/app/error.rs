use std::io;
use std::path::PathBuf;

use decal_engine::{DecalError, TilemapError};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DemoError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: std::env::VarError,
    },
    #[error("failed to read demo config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse demo config '{path}' at {field_path}: {source}")]
    ParseConfig {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("demo config field `{field}` is invalid: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    #[error("failed to load decal image '{path}': {source}")]
    LoadImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("nothing was rendered; no snapshot to write")]
    EmptySnapshot,
    #[error("failed to encode snapshot: {0}")]
    EncodeSnapshot(#[source] image::ImageError),
    #[error("failed to write snapshot '{path}': {source}")]
    WriteSnapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Grid(#[from] TilemapError),
    #[error(transparent)]
    Engine(#[from] DecalError),
}
