use std::rc::Rc;

use log::{info, trace};

use super::{
    context::GpuContextProvider,
    device::{ClearMask, GpuDevice},
};
use crate::{config::RenderConfig, engine::Scene, utils::error::ContextError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    pub frames: u64,
}

/// Redraws the scene once per batch of window events until a close request.
pub struct RenderLoop<D: GpuDevice> {
    device: Rc<D>,
    scene: Scene<D>,
    clear_color: [f32; 4],
    state: LoopState,
    viewport: Option<(u32, u32)>,
    frames: u64,
}

impl<D: GpuDevice> RenderLoop<D> {
    pub fn new(device: Rc<D>, scene: Scene<D>, config: &RenderConfig) -> Self {
        Self {
            device,
            scene,
            clear_color: config.clear_color,
            state: LoopState::Running,
            viewport: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until the provider reports a close request. The scene is
    /// released when this returns.
    pub fn run<P: GpuContextProvider>(mut self, provider: &mut P) -> Result<LoopSummary, ContextError> {
        info!("Entering render loop");
        while self.step(provider)? == LoopState::Running {}

        let summary = LoopSummary {
            frames: self.frames,
        };
        info!("Render loop finished after {} frames", summary.frames);
        Ok(summary)
    }

    /// One iteration: clear, draw, wait for events, present.
    pub fn step<P: GpuContextProvider>(&mut self, provider: &mut P) -> Result<LoopState, ContextError> {
        if self.state == LoopState::Closing {
            return Ok(LoopState::Closing);
        }
        if provider.should_close() {
            self.state = LoopState::Closing;
            return Ok(self.state);
        }

        self.sync_viewport(provider.framebuffer_size());
        self.draw_frame();
        provider.wait_events();
        provider.swap_buffers()?;

        self.frames += 1;
        trace!("Presented frame {}", self.frames);
        Ok(self.state)
    }

    fn sync_viewport(&mut self, size: (u32, u32)) {
        if self.viewport != Some(size) {
            self.device.viewport(size.0, size.1);
            self.viewport = Some(size);
        }
    }

    fn draw_frame(&self) {
        self.device.clear_color(self.clear_color);
        self.device.clear(ClearMask::COLOR | ClearMask::DEPTH);
        self.device
            .draw_triangles(0, self.scene.vertex_count() as i32);
    }
}
