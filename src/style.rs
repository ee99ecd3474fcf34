//! Styling primitives shared by blocks, draw commands and the PDF backend

use crate::constants::{DEFAULT_BORDER_WIDTH, DEFAULT_PADDING};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values should be 0.0-1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Gray color
    pub fn gray(level: f32) -> Self {
        let l = level.clamp(0.0, 1.0);
        Self::rgb(l, l, l)
    }

    /// Light gray, used behind table header cells
    pub fn light_gray() -> Self {
        Self::gray(0.85)
    }

    /// Default banner color for decorated headings
    pub fn banner_blue() -> Self {
        Self::rgb(0.16, 0.32, 0.55)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Border stroke pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    None,
    #[default]
    Solid,
    Dashed,
}

/// A stroked outline: pattern, width and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub style: BorderStyle,
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    pub fn solid(width: f32, color: Color) -> Self {
        Self {
            style: BorderStyle::Solid,
            width,
            color,
        }
    }

    pub fn dashed(width: f32, color: Color) -> Self {
        Self {
            style: BorderStyle::Dashed,
            width,
            color,
        }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::solid(DEFAULT_BORDER_WIDTH, Color::black())
    }
}

/// Padding for cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    /// Create uniform padding
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create padding with vertical and horizontal values
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            bottom: vertical,
            left: horizontal,
            right: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(DEFAULT_PADDING)
    }
}

/// Font selection and color of a run of text.
///
/// Only the standard Helvetica family is addressed, so weight and slant are
/// flags rather than a font reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(font_size: f32) -> Self {
        Self {
            font_size,
            bold: false,
            italic: false,
            color: Color::black(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
