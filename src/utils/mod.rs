pub mod error;

pub use error::{ConfigError, ContextError, EngineError, GeometryError, LoaderError};
