//! Layout configuration recognized by the composer

use crate::Result;
use crate::constants::*;
use crate::error::ComposeError;
use crate::geometry::{Margins, PageGeometry};
use crate::style::Padding;

/// Options controlling page size, typography and running stamps
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub geometry: PageGeometry,
    /// Body text size; headings and footers scale from fixed sizes
    pub base_font_size: f32,
    /// Whether every page gets a running header and footer
    pub header_footer: bool,
    /// Whether the document logo is acquired and drawn in the header
    pub show_logo: bool,
    /// Height of the header band the body starts below
    pub header_height: f32,
    /// Gap after each block
    pub block_spacing: f32,
    /// Padding inside table cells
    pub cell_padding: Padding,
    /// Average character width as a fraction of font size
    pub char_width_ratio: f32,
    /// Line height as a multiple of font size
    pub line_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            base_font_size: DEFAULT_FONT_SIZE,
            header_footer: true,
            show_logo: true,
            header_height: DEFAULT_HEADER_HEIGHT,
            block_spacing: DEFAULT_BLOCK_SPACING,
            cell_padding: Padding::default(),
            char_width_ratio: DEFAULT_CHAR_WIDTH_RATIO,
            line_height: DEFAULT_LINE_HEIGHT_MULTIPLIER,
        }
    }
}

impl LayoutConfig {
    pub fn a4() -> Self {
        Self::default()
    }

    pub fn letter() -> Self {
        Self {
            geometry: PageGeometry::letter(),
            ..Self::default()
        }
    }

    /// Set the page size, keeping margins
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.geometry.width = width;
        self.geometry.height = height;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.geometry.margins = margins;
        self
    }

    pub fn with_base_font_size(mut self, size: f32) -> Self {
        self.base_font_size = size;
        self
    }

    pub fn with_header_footer(mut self, enabled: bool) -> Self {
        self.header_footer = enabled;
        self
    }

    pub fn with_logo(mut self, enabled: bool) -> Self {
        self.show_logo = enabled;
        self
    }

    pub fn with_block_spacing(mut self, spacing: f32) -> Self {
        self.block_spacing = spacing;
        self
    }

    pub fn with_cell_padding(mut self, padding: Padding) -> Self {
        self.cell_padding = padding;
        self
    }

    /// Width available to blocks (single column)
    pub fn column_width(&self) -> f32 {
        self.geometry.usable_width()
    }

    /// Offset within the drawable area where body content begins
    pub fn body_top(&self) -> f32 {
        if self.header_footer {
            self.header_height
        } else {
            0.0
        }
    }

    /// Height of one line of text at the given size
    pub fn line_height_for(&self, font_size: f32) -> f32 {
        font_size * self.line_height
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;

        if !(self.base_font_size.is_finite() && self.base_font_size > 0.0) {
            return Err(ComposeError::DimensionError(format!(
                "base font size must be positive, got {}",
                self.base_font_size
            )));
        }
        if !(self.char_width_ratio > 0.0 && self.line_height > 0.0) {
            return Err(ComposeError::ConfigError(
                "character width ratio and line height must be positive".to_string(),
            ));
        }
        if self.block_spacing < 0.0 || self.header_height < 0.0 {
            return Err(ComposeError::ConfigError(
                "block spacing and header height must not be negative".to_string(),
            ));
        }
        if self.body_top() >= self.geometry.usable_height() {
            return Err(ComposeError::ConfigError(format!(
                "header band of {} leaves no room for content",
                self.header_height
            )));
        }
        if self.cell_padding.horizontal() >= self.column_width() {
            return Err(ComposeError::ConfigError(
                "cell padding is wider than the column".to_string(),
            ));
        }
        Ok(())
    }
}
