use thiserror::Error;

use crate::render::shaders::ShaderError;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to build GL display: {0}")]
    Display(String),

    #[error("Failed to create window")]
    NoWindow,

    #[error("GL context error: {0}")]
    Glutin(#[from] glutin::error::Error),
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("GL entry point not found: {0}")]
    MissingEntryPoint(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Geometry has no vertices")]
    Empty,

    #[error("Geometry has {positions} positions but {colors} colors")]
    LengthMismatch { positions: usize, colors: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Failed to create {object}: {reason}")]
    Device { object: &'static str, reason: String },

    #[error("Vertex buffer contents differ from the uploaded data at offset {offset}")]
    ReadBack { offset: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown log level: {0}")]
    LogLevel(String),
}
