//! Layout and styling configuration
//!
//! Every field has a default, so a partial JSON or TOML document only needs
//! to name what it overrides.

use serde::{Deserialize, Serialize};

/// Top-level configuration shared by the processor and the converter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Page size for generated pages (images, HTML snapshots, text)
    pub page: PageSize,
    /// Plain-text rendering
    pub text: TextLayout,
    /// Watermark stamping
    pub watermark: WatermarkStyle,
    /// Page number stamping
    pub page_numbers: PageNumberStyle,
    /// Placeholder page images
    pub raster: RasterSettings,
}

impl ConvertConfig {
    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Page dimensions in points (1 point = 1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayout {
    pub font_size: f32,
    /// Baseline-to-baseline distance as a multiple of the font size
    pub line_height_factor: f32,
    /// Distance from the left page edge to the text
    pub margin_left: f32,
    /// Distance from the top page edge to the first line
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Lines wrap once they reach this width
    pub max_width: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_height_factor: 1.15,
            margin_left: 28.35,
            margin_top: 28.35,
            margin_bottom: 28.35,
            max_width: 510.24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    pub font_size: f32,
    pub opacity: f32,
    /// Gray level for all three RGB channels (0 = black, 1 = white)
    pub gray: f32,
    /// Assumed width of one character when centering the text
    pub char_width: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_size: 50.0,
            opacity: 0.3,
            gray: 0.5,
            char_width: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberStyle {
    pub font_size: f32,
    /// Baseline distance from the bottom page edge
    pub bottom_offset: f32,
}

impl Default for PageNumberStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            bottom_offset: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// JPEG quality in 0.0..=1.0
    pub jpeg_quality: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: 595,
            height: 842,
            jpeg_quality: 0.9,
        }
    }
}
