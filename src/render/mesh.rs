use std::{mem, rc::Rc};

use glam::Vec3;
use log::{debug, info};

use super::device::GpuDevice;
use crate::utils::error::{EngineError, GeometryError};

/// Per-vertex positions and colors, kept as two parallel arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry<'a> {
    pub positions: &'a [Vec3],
    pub colors: &'a [Vec3],
}

impl Geometry<'static> {
    pub const TRIANGLE: Geometry<'static> = Geometry {
        positions: &[
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        colors: &[
            Vec3::new(1.0, 0.0, 0.0), // red
            Vec3::new(0.0, 1.0, 0.0), // green
            Vec3::new(0.0, 0.0, 1.0), // blue
        ],
    };
}

impl<'a> Geometry<'a> {
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.positions.is_empty() {
            return Err(GeometryError::Empty);
        }
        if self.positions.len() != self.colors.len() {
            return Err(GeometryError::LengthMismatch {
                positions: self.positions.len(),
                colors: self.colors.len(),
            });
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn layout(&self) -> VertexLayout {
        VertexLayout {
            positions_size: mem::size_of_val(self.positions),
            colors_size: mem::size_of_val(self.colors),
        }
    }
}

/// Byte layout of a non-interleaved buffer: every position, then every color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    positions_size: usize,
    colors_size: usize,
}

impl VertexLayout {
    pub fn positions_offset(&self) -> usize {
        0
    }

    pub fn positions_size(&self) -> usize {
        self.positions_size
    }

    /// Colors start right after the last position byte.
    pub fn colors_offset(&self) -> usize {
        self.positions_size
    }

    pub fn colors_size(&self) -> usize {
        self.colors_size
    }

    pub fn total_size(&self) -> usize {
        self.positions_size + self.colors_size
    }
}

/// An array buffer holding uploaded geometry. Deleted on drop.
pub struct VertexBuffer<D: GpuDevice> {
    device: Rc<D>,
    handle: D::Buffer,
    layout: VertexLayout,
    vertex_count: usize,
}

impl<D: GpuDevice> VertexBuffer<D> {
    pub fn handle(&self) -> D::Buffer {
        self.handle
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn bind(&self) {
        self.device.bind_array_buffer(Some(self.handle));
    }

    /// Copies `len` bytes starting at `offset` back from the GPU.
    pub fn read_back(&self, offset: usize, len: usize) -> Vec<u8> {
        let total = self.layout.total_size();
        if offset >= total {
            return Vec::new();
        }
        let len = len.min(total - offset);
        let mut bytes = vec![0u8; len];
        self.bind();
        self.device.read_array_buffer(offset, &mut bytes);
        bytes
    }

    pub fn read_back_f32(&self, offset: usize, len: usize) -> Vec<f32> {
        bytemuck::pod_collect_to_vec(&self.read_back(offset, len))
    }

    /// Compares both halves of the buffer against `geometry`.
    fn verify_contents(&self, geometry: &Geometry<'_>) -> Result<(), EngineError> {
        let halves = [
            (self.layout.positions_offset(), bytemuck::cast_slice::<Vec3, u8>(geometry.positions)),
            (self.layout.colors_offset(), bytemuck::cast_slice::<Vec3, u8>(geometry.colors)),
        ];
        for (offset, expected) in halves {
            if self.read_back(offset, expected.len()) != expected {
                return Err(EngineError::ReadBack { offset });
            }
        }
        Ok(())
    }
}

impl<D: GpuDevice> Drop for VertexBuffer<D> {
    fn drop(&mut self) {
        debug!("Releasing vertex buffer {:?}", self.handle);
        self.device.delete_buffer(self.handle);
    }
}

pub struct VertexDataStore<D: GpuDevice> {
    device: Rc<D>,
}

impl<D: GpuDevice> VertexDataStore<D> {
    pub fn new(device: Rc<D>) -> Self {
        Self { device }
    }

    /// Allocates one buffer sized for the whole geometry, then writes the
    /// positions at offset 0 and the colors at `layout.colors_offset()`.
    /// The buffer is left bound to the array target.
    pub fn upload(&self, geometry: &Geometry<'_>) -> Result<VertexBuffer<D>, EngineError> {
        geometry.validate()?;

        let layout = geometry.layout();
        let handle = self
            .device
            .create_buffer()
            .map_err(|reason| EngineError::Device {
                object: "vertex buffer",
                reason,
            })?;
        let buffer = VertexBuffer {
            device: Rc::clone(&self.device),
            handle,
            layout,
            vertex_count: geometry.vertex_count(),
        };

        buffer.bind();
        self.device.allocate_array_buffer(layout.total_size());
        self.device.write_array_buffer(
            layout.positions_offset(),
            bytemuck::cast_slice(geometry.positions),
        );
        self.device
            .write_array_buffer(layout.colors_offset(), bytemuck::cast_slice(geometry.colors));

        #[cfg(debug_assertions)]
        buffer.verify_contents(geometry)?;

        info!(
            "Uploaded {} vertices ({} bytes: positions @0, colors @{})",
            buffer.vertex_count,
            layout.total_size(),
            layout.colors_offset()
        );
        Ok(buffer)
    }
}
