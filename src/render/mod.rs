pub mod attributes;
pub mod context;
pub mod device;
pub mod loader;
pub mod mesh;
pub mod pipeline;
pub mod shaders;

#[cfg(test)]
pub(crate) mod testing;

pub use attributes::{AttributeBinder, AttributeBinding, VertexArray};
pub use context::{GlWindowContext, GpuContextProvider};
pub use device::{GlowDevice, GpuDevice};
pub use loader::FunctionLoader;
pub use mesh::{Geometry, VertexBuffer, VertexDataStore, VertexLayout};
pub use pipeline::{LoopState, LoopSummary, RenderLoop};
pub use shaders::{ShaderProgram, ShaderProgramBuilder, ShaderSource, ShaderStage};
