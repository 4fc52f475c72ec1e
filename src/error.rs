// Unified Error Handling Module
//
// Centralized error types for consistent error management across the engine

use std::io;
use thiserror::Error;

/// Main engine error type
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Object error: {0}")]
    Object(#[from] ObjectError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Render-surface errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface creation failed: {width}x{height} is not a valid size")]
    SurfaceCreation { width: u32, height: u32 },

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Object construction and property errors
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("Empty path definition")]
    EmptyPath,

    #[error("Empty point list")]
    EmptyPoints,

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Type mismatch for property: {0}")]
    PropertyType(String),
}

/// Scene deserialization errors
///
/// Only structurally invalid payloads abort a load; individual bad
/// objects are skipped with a warning.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload has no \"objects\" key")]
    MissingObjects,

    #[error("Unrecognized object type: {0}")]
    UnknownType(String),

    #[error("Invalid object: {0}")]
    Invalid(String),
}

/// Image / SVG source loading errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Fetch failed for {src}: {reason}")]
    Fetch { src: String, reason: String },

    #[error("Decode failed for {src}: {reason}")]
    Decode { src: String, reason: String },

    #[error("Loader unavailable")]
    LoaderUnavailable,
}

/// Color string parse failure
#[derive(Debug, Error)]
#[error("Unparsable color: {source_string}")]
pub struct ColorParseError {
    pub source_string: String,
}

impl ColorParseError {
    pub fn new(source: &str) -> Self {
        Self {
            source_string: source.to_string(),
        }
    }
}
