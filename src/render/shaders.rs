// shaders.rs - shader compilation and program linking

use std::{fmt, rc::Rc};

use log::{debug, error, info};
use thiserror::Error;

use super::device::GpuDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_kind(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("Shader failed to link: {log}")]
    Linking { log: String },
    #[error("Expected a {expected} shader, got a {found} shader")]
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },
    #[error("Failed to create {object}: {reason}")]
    Device { object: &'static str, reason: String },
}

/// Source text for a single pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub code: &'static str,
}

impl ShaderSource {
    pub const fn vertex(code: &'static str) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            code,
        }
    }

    pub const fn fragment(code: &'static str) -> Self {
        Self {
            stage: ShaderStage::Fragment,
            code,
        }
    }
}

/// A shader object whose compile status has been checked. Deleted on drop;
/// the driver keeps it alive while a program still references it.
pub struct CompiledShader<D: GpuDevice> {
    device: Rc<D>,
    handle: D::Shader,
    stage: ShaderStage,
}

impl<D: GpuDevice> CompiledShader<D> {
    pub fn handle(&self) -> D::Shader {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<D: GpuDevice> Drop for CompiledShader<D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.handle);
    }
}

/// A successfully linked vertex + fragment program.
pub struct ShaderProgram<D: GpuDevice> {
    device: Rc<D>,
    handle: D::Program,
}

impl<D: GpuDevice> ShaderProgram<D> {
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    /// Installs this program as the current one for subsequent draws.
    pub fn bind(&self) {
        self.device.use_program(Some(self.handle));
    }

    /// `None` when the input does not exist or was optimized out.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.device.attrib_location(self.handle, name)
    }
}

impl<D: GpuDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        debug!("Releasing shader program {:?}", self.handle);
        self.device.delete_program(self.handle);
    }
}

pub struct ShaderProgramBuilder<D: GpuDevice> {
    device: Rc<D>,
}

impl<D: GpuDevice> ShaderProgramBuilder<D> {
    pub fn new(device: Rc<D>) -> Self {
        Self { device }
    }

    pub fn compile(&self, source: &ShaderSource) -> Result<CompiledShader<D>, ShaderError> {
        let handle = self
            .device
            .create_shader(source.stage)
            .map_err(|reason| ShaderError::Device {
                object: "shader",
                reason,
            })?;
        let shader = CompiledShader {
            device: Rc::clone(&self.device),
            handle,
            stage: source.stage,
        };

        self.device.compile_shader(handle, source.code);

        if !self.device.shader_compile_status(handle) {
            let log = diagnostic(self.device.shader_info_log(handle));
            error!("{} shader failed to compile!\n{}", source.stage, log);
            return Err(ShaderError::Compilation {
                stage: source.stage,
                log,
            });
        }

        debug!("Compiled {} shader {:?}", source.stage, handle);
        Ok(shader)
    }

    pub fn link(
        &self,
        vertex: &CompiledShader<D>,
        fragment: &CompiledShader<D>,
    ) -> Result<ShaderProgram<D>, ShaderError> {
        expect_stage(vertex, ShaderStage::Vertex)?;
        expect_stage(fragment, ShaderStage::Fragment)?;

        let handle = self
            .device
            .create_program()
            .map_err(|reason| ShaderError::Device {
                object: "program",
                reason,
            })?;
        // Dropping this on the error path deletes the half-built program.
        let program = ShaderProgram {
            device: Rc::clone(&self.device),
            handle,
        };

        self.device.attach_shader(handle, vertex.handle);
        self.device.attach_shader(handle, fragment.handle);
        self.device.link_program(handle);
        let linked = self.device.program_link_status(handle);
        self.device.detach_shader(handle, vertex.handle);
        self.device.detach_shader(handle, fragment.handle);

        if !linked {
            let log = diagnostic(self.device.program_info_log(handle));
            error!("Shader failed to link!\n{}", log);
            return Err(ShaderError::Linking { log });
        }

        info!("Shaders link successful!");
        Ok(program)
    }

    /// Compiles both stages and links them.
    pub fn build(
        &self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<ShaderProgram<D>, ShaderError> {
        let vertex = self.compile(vertex)?;
        let fragment = self.compile(fragment)?;
        self.link(&vertex, &fragment)
    }
}

fn expect_stage<D: GpuDevice>(
    shader: &CompiledShader<D>,
    expected: ShaderStage,
) -> Result<(), ShaderError> {
    if shader.stage != expected {
        return Err(ShaderError::StageMismatch {
            expected,
            found: shader.stage,
        });
    }
    Ok(())
}

fn diagnostic(log: String) -> String {
    let trimmed = log.trim_end_matches(['\0', '\n', ' ']);
    if trimmed.is_empty() {
        "(driver returned no diagnostic)".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The position + color pass-through pair drawn by the triangle scene.
pub mod triangle_shaders {
    use super::ShaderSource;

    pub const POSITION_ATTRIBUTE: &str = "vPosition";
    pub const COLOR_ATTRIBUTE: &str = "vColor";

    pub const VERTEX: ShaderSource = ShaderSource::vertex(
        r#"#version 330
in vec3 vPosition;
in vec3 vColor;
out vec3 color;
void main() {
    gl_Position = vec4(vPosition, 1.0);
    color = vColor;
}
"#,
    );

    pub const FRAGMENT: ShaderSource = ShaderSource::fragment(
        r#"#version 330
in vec3 color;
out vec4 frag_color;
void main() {
    frag_color = vec4(color, 1.0);
}
"#,
    );
}
