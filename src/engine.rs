use std::rc::Rc;

use log::info;

use crate::{
    config::RenderConfig,
    render::{
        attributes::{AttributeBinder, AttributeBinding, VertexArray},
        context::GpuContextProvider,
        device::GpuDevice,
        mesh::{Geometry, VertexBuffer, VertexDataStore},
        pipeline::{LoopSummary, RenderLoop},
        shaders::{triangle_shaders, ShaderProgram, ShaderProgramBuilder, ShaderSource},
    },
    utils::error::{ContextError, EngineError},
};

/// Everything one draw call needs, owned together and released together.
pub struct Scene<D: GpuDevice> {
    program: ShaderProgram<D>,
    vertex_array: VertexArray<D>,
    buffer: VertexBuffer<D>,
    bindings: Vec<AttributeBinding>,
}

impl<D: GpuDevice> Scene<D> {
    /// The built-in position + color shaders over `geometry`.
    pub fn triangle(device: Rc<D>, geometry: &Geometry<'_>) -> Result<Self, EngineError> {
        Self::build(
            device,
            &triangle_shaders::VERTEX,
            &triangle_shaders::FRAGMENT,
            geometry,
        )
    }

    /// Links the program, uploads `geometry` and wires `vPosition` and
    /// `vColor` to their halves of the buffer, in that order. Any shader
    /// failure aborts before a buffer is created.
    pub fn build(
        device: Rc<D>,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        geometry: &Geometry<'_>,
    ) -> Result<Self, EngineError> {
        let program = ShaderProgramBuilder::new(Rc::clone(&device)).build(vertex, fragment)?;
        program.bind();

        let vertex_array = VertexArray::new(Rc::clone(&device))?;
        vertex_array.bind();

        let buffer = VertexDataStore::new(Rc::clone(&device)).upload(geometry)?;
        let layout = buffer.layout();

        let binder = AttributeBinder::new(device);
        let bindings = [
            (triangle_shaders::POSITION_ATTRIBUTE, layout.positions_offset()),
            (triangle_shaders::COLOR_ATTRIBUTE, layout.colors_offset()),
        ]
        .into_iter()
        .filter_map(|(name, offset)| binder.bind(&program, &buffer, name, 3, offset))
        .collect::<Vec<_>>();

        info!(
            "Scene ready: {} vertices, {} of 2 attributes bound",
            buffer.vertex_count(),
            bindings.len()
        );
        Ok(Self {
            program,
            vertex_array,
            buffer,
            bindings,
        })
    }

    pub fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    pub fn vertex_array(&self) -> &VertexArray<D> {
        &self.vertex_array
    }

    pub fn buffer(&self) -> &VertexBuffer<D> {
        &self.buffer
    }

    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }
}

/// Startup assembly plus the render loop for the fixed triangle.
pub struct TriangleEngine<D: GpuDevice> {
    render_loop: RenderLoop<D>,
}

impl<D: GpuDevice> TriangleEngine<D> {
    pub fn new(device: Rc<D>, config: &RenderConfig) -> Result<Self, EngineError> {
        let scene = Scene::triangle(Rc::clone(&device), &Geometry::TRIANGLE)?;
        Ok(Self::from_scene(device, scene, config))
    }

    pub fn from_scene(device: Rc<D>, scene: Scene<D>, config: &RenderConfig) -> Self {
        Self {
            render_loop: RenderLoop::new(device, scene, config),
        }
    }

    pub fn run<P: GpuContextProvider>(self, provider: &mut P) -> Result<LoopSummary, ContextError> {
        self.render_loop.run(provider)
    }
}
