use std::{mem, rc::Rc};

use log::{debug, warn};

use super::{device::GpuDevice, mesh::VertexBuffer, shaders::ShaderProgram};
use crate::utils::error::EngineError;

/// Records the attribute slots enabled by [`AttributeBinder`]. Deleted on drop.
pub struct VertexArray<D: GpuDevice> {
    device: Rc<D>,
    handle: D::VertexArray,
}

impl<D: GpuDevice> VertexArray<D> {
    pub fn new(device: Rc<D>) -> Result<Self, EngineError> {
        let handle = device
            .create_vertex_array()
            .map_err(|reason| EngineError::Device {
                object: "vertex array",
                reason,
            })?;
        Ok(Self { device, handle })
    }

    pub fn handle(&self) -> D::VertexArray {
        self.handle
    }

    pub fn bind(&self) {
        self.device.bind_vertex_array(Some(self.handle));
    }
}

impl<D: GpuDevice> Drop for VertexArray<D> {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.handle);
    }
}

/// Where a named shader input reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: String,
    pub location: u32,
    pub component_count: i32,
    pub normalized: bool,
    /// Zero means tightly packed.
    pub stride: i32,
    pub byte_offset: usize,
}

pub struct AttributeBinder<D: GpuDevice> {
    device: Rc<D>,
}

impl<D: GpuDevice> AttributeBinder<D> {
    pub fn new(device: Rc<D>) -> Self {
        Self { device }
    }

    /// Points `name` at `component_count` floats per vertex starting at
    /// `byte_offset` in `buffer`. A missing input, a component count outside
    /// 1..=4 or a range past the end of the buffer is logged and skipped,
    /// leaving that attribute disabled.
    pub fn bind(
        &self,
        program: &ShaderProgram<D>,
        buffer: &VertexBuffer<D>,
        name: &str,
        component_count: i32,
        byte_offset: usize,
    ) -> Option<AttributeBinding> {
        let Some(location) = program.attribute_location(name) else {
            warn!("couldn't find {} in shader", name);
            return None;
        };

        if !(1..=4).contains(&component_count) {
            warn!(
                "{} asks for {} components per vertex, expected 1 to 4",
                name, component_count
            );
            return None;
        }

        let span = component_count as usize * mem::size_of::<f32>() * buffer.vertex_count();
        let fits = byte_offset
            .checked_add(span)
            .is_some_and(|end| end <= buffer.layout().total_size());
        if !fits {
            warn!(
                "{} would read {} bytes at offset {} past the end of a {} byte buffer",
                name,
                span,
                byte_offset,
                buffer.layout().total_size()
            );
            return None;
        }

        buffer.bind();
        self.device.enable_vertex_attrib(location);
        self.device
            .vertex_attrib_pointer_f32(location, component_count, false, 0, byte_offset);

        debug!(
            "Bound {} to location {} ({} floats @{})",
            name, location, component_count, byte_offset
        );
        Some(AttributeBinding {
            name: name.to_string(),
            location,
            component_count,
            normalized: false,
            stride: 0,
            byte_offset,
        })
    }
}
