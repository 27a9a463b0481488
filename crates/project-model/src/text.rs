//! Caption text styling.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Appearance of a text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Resolved font file. `None` renders with the default typeface.
    #[serde(default)]
    pub font: Option<PathBuf>,

    /// Font size in pixels.
    pub font_size: u32,

    /// Fill color name understood by the renderer.
    pub color: String,

    /// Outline color name.
    pub stroke_color: String,

    /// Outline width in pixels.
    pub stroke_width: f32,
}

impl TextStyle {
    /// Large title text: 70px, white with a 1.5px black outline.
    pub fn title() -> Self {
        Self {
            font: None,
            font_size: 70,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 1.5,
        }
    }

    /// Broadcaster handle: 40px, white with a 0.5px black outline.
    pub fn caption() -> Self {
        Self {
            font: None,
            font_size: 40,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 0.5,
        }
    }

    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }
}
