use std::{
    ffi::{c_void, CStr},
    num::NonZeroU32,
};

use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, GetGlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{debug, info, warn};
use raw_window_handle::HasRawWindowHandle;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowBuilder},
};

use crate::{
    config::{RenderConfig, WindowConfig},
    utils::error::ContextError,
};

/// What the render loop needs from the windowing layer.
pub trait GpuContextProvider {
    /// True once the user has asked for the window to close.
    fn should_close(&self) -> bool;
    /// Blocks until at least one window or input event has been handled.
    fn wait_events(&mut self);
    fn swap_buffers(&mut self) -> Result<(), ContextError>;
    fn framebuffer_size(&self) -> (u32, u32);
}

/// A winit window with a current OpenGL context on its surface.
pub struct GlWindowContext {
    // Field order is drop order: GL objects go before the window and event loop.
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    gl_display: Display,
    window: Window,
    event_loop: EventLoop<()>,
    size: PhysicalSize<u32>,
    close_requested: bool,
}

impl GlWindowContext {
    pub fn create(
        window_config: &WindowConfig,
        render_config: &RenderConfig,
    ) -> Result<Self, ContextError> {
        let event_loop = EventLoopBuilder::new().build()?;
        let window_builder = WindowBuilder::new()
            .with_title(window_config.title.as_str())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height))
            .with_resizable(window_config.resizable);

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    // the picker has to hand back a Config, so an empty set can't become an Err here
                    .expect("display offered no GL config with a 24-bit depth buffer")
            })
            .map_err(|e| ContextError::Display(e.to_string()))?;

        let window = window.ok_or(ContextError::NoWindow)?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                render_config.gl_major,
                render_config.gl_minor,
            ))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs)? };
        let gl_context = not_current.make_current(&gl_surface)?;

        if render_config.vsync {
            if let Err(e) =
                gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                warn!("Failed to enable vsync: {}", e);
            }
        }

        let size = window.inner_size();
        info!(
            "Created window \"{}\" ({}x{} physical)",
            window_config.title, size.width, size.height
        );

        Ok(Self {
            gl_surface,
            gl_context,
            gl_display,
            window,
            event_loop,
            size,
            close_requested: false,
        })
    }

    /// Resolves a GL entry point against the current context.
    pub fn proc_address(&self, symbol: &CStr) -> *const c_void {
        self.gl_display.get_proc_address(symbol)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.gl_surface.resize(&self.gl_context, width, height);
        }
        debug!("Surface resized to {}x{}", size.width, size.height);
        self.size = size;
    }
}

impl GpuContextProvider for GlWindowContext {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn wait_events(&mut self) {
        let mut close_requested = false;
        let mut resized = None;

        let status = self.event_loop.pump_events(None, |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::CloseRequested => close_requested = true,
                    WindowEvent::Resized(size) => resized = Some(size),
                    _ => {}
                }
            }
        });

        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}", code);
            close_requested = true;
        }
        if let Some(size) = resized {
            self.resize(size);
        }
        if close_requested && !self.close_requested {
            info!("Window close requested");
            self.close_requested = true;
        }
    }

    fn swap_buffers(&mut self) -> Result<(), ContextError> {
        self.gl_surface.swap_buffers(&self.gl_context)?;
        Ok(())
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }
}
