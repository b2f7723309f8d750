pub mod config;
pub mod engine;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::core::AppConfig;
pub use config::rendering::RenderConfig;
pub use config::window::WindowConfig;
pub use engine::{Scene, TriangleEngine};
pub use render::context::{GlWindowContext, GpuContextProvider};
pub use render::loader::FunctionLoader;
pub use render::shaders::{ShaderError, ShaderProgram};
pub use utils::error::{ConfigError, ContextError, EngineError, LoaderError};
