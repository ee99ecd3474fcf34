//! Page dimensions, margins and the layout cursor

use crate::Result;
use crate::constants::{A4_HEIGHT, A4_WIDTH, DEFAULT_MARGIN, LETTER_HEIGHT, LETTER_WIDTH};
use crate::error::ComposeError;

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

/// Fixed page size and margins of one document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32, margins: Margins) -> Self {
        Self {
            width,
            height,
            margins,
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT, Margins::default())
    }

    pub fn letter() -> Self {
        Self::new(LETTER_WIDTH, LETTER_HEIGHT, Margins::default())
    }

    /// Drawable width between the left and right margins
    pub fn usable_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Drawable height between the top and bottom margins
    pub fn usable_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Absolute x of the left edge of the drawable area
    pub fn content_left(&self) -> f32 {
        self.margins.left
    }

    /// Absolute y of a vertical offset within the drawable area
    pub fn absolute_y(&self, offset: f32) -> f32 {
        self.margins.top + offset
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.width,
            self.height,
            self.margins.top,
            self.margins.bottom,
            self.margins.left,
            self.margins.right,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ComposeError::DimensionError(format!(
                "page dimensions and margins must be finite and non-negative: {self:?}"
            )));
        }
        if self.usable_width() <= 0.0 || self.usable_height() <= 0.0 {
            return Err(ComposeError::DimensionError(format!(
                "margins leave no drawable area on a {}x{} page",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Where the next block goes: 1-based page index and vertical offset
/// measured from the top of the drawable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub offset: f32,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            page: 1,
            offset: 0.0,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
