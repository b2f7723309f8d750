use std::{
    ffi::{c_void, CStr, CString},
    ptr,
};

use log::info;

use super::device::GlowDevice;
use crate::utils::error::LoaderError;

/// Entry points the renderer cannot start without.
pub const REQUIRED_ENTRY_POINTS: &[&str] = &[
    "glCreateShader",
    "glShaderSource",
    "glCompileShader",
    "glCreateProgram",
    "glAttachShader",
    "glLinkProgram",
    "glUseProgram",
    "glGetAttribLocation",
    "glGenVertexArrays",
    "glBindVertexArray",
    "glGenBuffers",
    "glBindBuffer",
    "glBufferData",
    "glBufferSubData",
    "glEnableVertexAttribArray",
    "glVertexAttribPointer",
    "glClearColor",
    "glClear",
    "glDrawArrays",
];

pub struct FunctionLoader;

impl FunctionLoader {
    /// Loads the GL function table through `resolve`. Must run after the
    /// context is current and before any other GL call.
    pub fn initialize<F>(mut resolve: F) -> Result<GlowDevice, LoaderError>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        Self::verify(&mut resolve)?;

        let gl = unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => resolve(&symbol),
                Err(_) => ptr::null(),
            })
        };
        let device = GlowDevice::new(gl);
        let version = device.version();
        info!(
            "Loaded OpenGL {}.{} {}",
            version.major, version.minor, version.vendor_info
        );
        Ok(device)
    }

    pub fn verify<F>(resolve: &mut F) -> Result<(), LoaderError>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        for name in REQUIRED_ENTRY_POINTS {
            let symbol =
                CString::new(*name).map_err(|_| LoaderError::MissingEntryPoint(name.to_string()))?;
            if resolve(&symbol).is_null() {
                return Err(LoaderError::MissingEntryPoint(name.to_string()));
            }
        }
        Ok(())
    }
}
