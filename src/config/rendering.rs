use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA, applied before every clear.
    pub clear_color: [f32; 4],
    pub vsync: bool,
    pub gl_major: u8,
    pub gl_minor: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            vsync: true,
            gl_major: 3,
            gl_minor: 3,
        }
    }
}
