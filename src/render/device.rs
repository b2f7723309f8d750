//! The slice of OpenGL the renderer actually talks to.
//!
//! [`GpuDevice`] names every driver call the shader, buffer, attribute and
//! loop code makes, so those modules stay independent of the loader.
//! [`GlowDevice`] forwards to a [`glow::Context`]; every call assumes that
//! context is current on the calling thread, which the single-threaded
//! startup in `main` guarantees for the lifetime of the device.

use std::fmt;

use bitflags::bitflags;
use glow::HasContext;

use super::shaders::ShaderStage;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

pub trait GpuDevice {
    type Shader: Copy + fmt::Debug + PartialEq;
    type Program: Copy + fmt::Debug + PartialEq;
    type Buffer: Copy + fmt::Debug + PartialEq;
    type VertexArray: Copy + fmt::Debug + PartialEq;

    // Shaders
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads `source` and requests compilation. Status is queried separately.
    fn compile_shader(&self, shader: Self::Shader, source: &str);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // Programs
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    // Vertex state
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Sizes the bound array buffer without supplying data.
    fn allocate_array_buffer(&self, size: usize);
    fn write_array_buffer(&self, offset: usize, data: &[u8]);
    fn read_array_buffer(&self, offset: usize, dst: &mut [u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn enable_vertex_attrib(&self, location: u32);
    /// `components` floats per vertex read from `offset` bytes into the bound buffer.
    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: usize,
    );

    // Frame
    fn viewport(&self, width: u32, height: u32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, mask: ClearMask);
    fn draw_triangles(&self, first: i32, count: i32);
}

type GlShader = <glow::Context as HasContext>::Shader;
type GlProgram = <glow::Context as HasContext>::Program;
type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;

pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    pub fn version(&self) -> &glow::Version {
        self.gl.version()
    }
}

impl GpuDevice for GlowDevice {
    type Shader = GlShader;
    type Program = GlProgram;
    type Buffer = GlBuffer;
    type VertexArray = GlVertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage.gl_kind()) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn allocate_array_buffer(&self, size: usize) {
        unsafe {
            self.gl
                .buffer_data_size(glow::ARRAY_BUFFER, size as i32, glow::STATIC_DRAW)
        }
    }

    fn write_array_buffer(&self, offset: usize, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, offset as i32, data)
        }
    }

    fn read_array_buffer(&self, offset: usize, dst: &mut [u8]) {
        unsafe {
            self.gl
                .get_buffer_sub_data(glow::ARRAY_BUFFER, offset as i32, dst)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                location,
                components,
                glow::FLOAT,
                normalized,
                stride,
                offset as i32,
            )
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.contains(ClearMask::COLOR) {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.contains(ClearMask::DEPTH) {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }
}
