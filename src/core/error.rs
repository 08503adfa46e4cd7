//! Error types for atoll

use thiserror::Error;

/// Errors raised while building a terrain.
///
/// Runtime terrain operations never fail; only construction paths
/// (config parsing, texture loading, GPU setup, spawning the worker) return these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Loader error: {0}")]
    Loader(String),
}
