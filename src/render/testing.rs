//! In-memory stand-ins for the GL driver and the window used by unit tests.
//!
//! [`RecordingDevice`] keeps just enough driver state to behave like a real
//! context for this crate: sources are checked for the obvious syntax
//! problems, linking matches fragment inputs against vertex outputs, buffer
//! bytes are stored, and every state-changing call is appended to a shared
//! log. Queries (status, logs, locations, read-back) are not logged.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    rc::Rc,
};

use super::{
    context::GpuContextProvider,
    device::{ClearMask, GpuDevice},
    shaders::ShaderStage,
};
use crate::utils::error::ContextError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram,
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexArray,
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer,
    BindArrayBuffer(Option<u32>),
    AllocateArrayBuffer(usize),
    WriteArrayBuffer { offset: usize, len: usize },
    DeleteBuffer(u32),
    EnableVertexAttrib(u32),
    VertexAttribPointer {
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: usize,
    },
    Viewport(u32, u32),
    ClearColor([f32; 4]),
    Clear(ClearMask),
    DrawTriangles { first: i32, count: i32 },
    WaitEvents,
    SwapBuffers,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashSet<u32>,
    bound_buffer: Option<u32>,
}

impl State {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
    log: CallLog,
    discard_writes: Cell<bool>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    /// Shaders, programs, buffers and vertex arrays not yet deleted.
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.shaders.len() + state.programs.len() + state.buffers.len() + state.vertex_arrays.len()
    }

    /// Buffer writes are still logged but no longer reach the stored bytes.
    pub fn discard_writes(&self) {
        self.discard_writes.set(true);
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

/// `(qualifier, type, name)` for every `in`/`out` declaration.
fn declarations(source: &str) -> Vec<(&str, &str, &str)> {
    source
        .lines()
        .flat_map(|line| line.split(';'))
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            match tokens.as_slice() {
                [qualifier @ ("in" | "out"), ty, name] => Some((*qualifier, *ty, *name)),
                _ => None,
            }
        })
        .collect()
}

fn check_source(source: &str) -> Result<(), String> {
    if !source.trim_start().starts_with("#version") {
        return Err("0:1(1): error: missing #version directive".to_string());
    }
    if !source.contains("void main") {
        return Err("error: no function with name 'main'".to_string());
    }
    let mut depth = 0i32;
    for (number, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}: error: syntax error, unexpected '}}'", number + 1));
            }
        }
    }
    if depth != 0 {
        return Err("error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

impl GpuDevice for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        self.record(Call::CreateShader(stage));
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) {
        self.record(Call::CompileShader(shader));
        let mut state = self.state.borrow_mut();
        let entry = state.shaders.get_mut(&shader).expect("unknown shader");
        entry.source = source.to_string();
        match check_source(source) {
            Ok(()) => {
                entry.compiled = true;
                entry.log.clear();
            }
            Err(log) => {
                entry.compiled = false;
                entry.log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        self.record(Call::CreateProgram);
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader { program, shader });
        if let Some(entry) = self.state.borrow_mut().programs.get_mut(&program) {
            entry.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(Call::DetachShader { program, shader });
        if let Some(entry) = self.state.borrow_mut().programs.get_mut(&program) {
            entry.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
        let mut state = self.state.borrow_mut();
        let State {
            shaders, programs, ..
        } = &mut *state;
        let entry = programs.get_mut(&program).expect("unknown program");
        let attached = entry.attached.clone();

        let stage_source = |stage: ShaderStage| {
            attached
                .iter()
                .filter_map(|id| shaders.get(id))
                .find(|s| s.stage == stage)
        };
        let (vertex, fragment) = match (
            stage_source(ShaderStage::Vertex),
            stage_source(ShaderStage::Fragment),
        ) {
            (Some(v), Some(f)) => (v, f),
            _ => {
                entry.linked = false;
                entry.log = "error: program needs a vertex and a fragment shader".to_string();
                return;
            }
        };
        if !vertex.compiled || !fragment.compiled {
            entry.linked = false;
            entry.log = "error: linking with uncompiled shader".to_string();
            return;
        }

        let outputs: Vec<_> = declarations(&vertex.source)
            .into_iter()
            .filter(|(q, _, _)| *q == "out")
            .map(|(_, ty, name)| (ty, name))
            .collect();
        let unmatched: Vec<String> = declarations(&fragment.source)
            .into_iter()
            .filter(|(q, ty, name)| *q == "in" && !outputs.contains(&(*ty, *name)))
            .map(|(_, _, name)| name.to_string())
            .collect();
        if !unmatched.is_empty() {
            entry.linked = false;
            entry.log = unmatched
                .iter()
                .map(|name| {
                    format!("error: fragment shader input '{name}' is not written by the vertex shader")
                })
                .collect::<Vec<_>>()
                .join("\n");
            return;
        }

        let attributes = declarations(&vertex.source)
            .into_iter()
            .filter(|(q, _, _)| *q == "in")
            .map(|(_, _, name)| name.to_string())
            .collect();
        entry.attributes = attributes;
        entry.linked = true;
        entry.log.clear();
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
        self.state.borrow_mut().programs.remove(&program);
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let entry = state.programs.get(&program).filter(|p| p.linked)?;
        entry
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        self.record(Call::CreateVertexArray);
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record(Call::DeleteVertexArray(vertex_array));
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn create_buffer(&self) -> Result<u32, String> {
        self.record(Call::CreateBuffer);
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer(buffer));
        self.state.borrow_mut().bound_buffer = buffer;
    }

    fn allocate_array_buffer(&self, size: usize) {
        self.record(Call::AllocateArrayBuffer(size));
        let mut state = self.state.borrow_mut();
        let bound = state.bound_buffer.expect("no array buffer bound");
        state.buffers.insert(bound, vec![0; size]);
    }

    fn write_array_buffer(&self, offset: usize, data: &[u8]) {
        self.record(Call::WriteArrayBuffer {
            offset,
            len: data.len(),
        });
        if self.discard_writes.get() {
            return;
        }
        let mut state = self.state.borrow_mut();
        let bound = state.bound_buffer.expect("no array buffer bound");
        let bytes = state.buffers.get_mut(&bound).expect("unknown buffer");
        assert!(offset + data.len() <= bytes.len(), "write past end of buffer");
        bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    fn read_array_buffer(&self, offset: usize, dst: &mut [u8]) {
        let state = self.state.borrow();
        let bound = state.bound_buffer.expect("no array buffer bound");
        let bytes = &state.buffers[&bound];
        dst.copy_from_slice(&bytes[offset..offset + dst.len()]);
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(Call::DeleteBuffer(buffer));
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.bound_buffer == Some(buffer) {
            state.bound_buffer = None;
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        self.record(Call::EnableVertexAttrib(location));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        self.record(Call::VertexAttribPointer {
            location,
            components,
            normalized,
            stride,
            offset,
        });
    }

    fn viewport(&self, width: u32, height: u32) {
        self.record(Call::Viewport(width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::ClearColor(rgba));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(Call::Clear(mask));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles { first, count });
    }
}

/// A window that reports a close request after a fixed number of waits.
pub struct ScriptedProvider {
    log: CallLog,
    close_after_waits: usize,
    waits: usize,
    size: (u32, u32),
    resizes: Vec<(usize, (u32, u32))>,
}

impl ScriptedProvider {
    pub fn new(log: CallLog, close_after_waits: usize) -> Self {
        Self {
            log,
            close_after_waits,
            waits: 0,
            size: (600, 600),
            resizes: Vec::new(),
        }
    }

    /// Reports `size` once the `wait`-th wait has returned.
    pub fn resize_after(mut self, wait: usize, size: (u32, u32)) -> Self {
        self.resizes.push((wait, size));
        self
    }
}

impl GpuContextProvider for ScriptedProvider {
    fn should_close(&self) -> bool {
        self.waits >= self.close_after_waits
    }

    fn wait_events(&mut self) {
        self.log.borrow_mut().push(Call::WaitEvents);
        self.waits += 1;
        if let Some(&(_, size)) = self.resizes.iter().find(|(wait, _)| *wait == self.waits) {
            self.size = size;
        }
    }

    fn swap_buffers(&mut self) -> Result<(), ContextError> {
        self.log.borrow_mut().push(Call::SwapBuffers);
        Ok(())
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }
}
