//! Backend-agnostic draw commands and the pages that hold them
//!
//! Coordinates are absolute points from the top-left page corner with y
//! growing downward. Text `y` is the baseline.

use crate::model::SharedImageData;
use crate::style::{Alignment, Color, Padding, Stroke, TextStyle};

/// One absolutely positioned drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// Filled bar, used for dividers and signature lines
    Rule {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        bytes: SharedImageData,
    },
    /// A bordered table cell with pre-wrapped lines
    TableCell {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        lines: Vec<String>,
        style: TextStyle,
        alignment: Alignment,
        padding: Padding,
        background: Option<Color>,
        border: Stroke,
    },
    /// Rectangle with optional fill and outline
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
}

impl DrawCommand {
    /// Text carried by the command, if any
    pub fn text(&self) -> Option<String> {
        match self {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            DrawCommand::TableCell { lines, .. } => Some(lines.join(" ")),
            DrawCommand::Rule { .. } | DrawCommand::Image { .. } | DrawCommand::Frame { .. } => {
                None
            }
        }
    }

    /// Top edge of the command's box
    pub fn top(&self) -> f32 {
        match self {
            DrawCommand::Text { y, style, .. } => y - style.font_size,
            DrawCommand::Rule { y, .. }
            | DrawCommand::Image { y, .. }
            | DrawCommand::TableCell { y, .. }
            | DrawCommand::Frame { y, .. } => *y,
        }
    }
}

/// One finished page. Stamps are kept apart from body content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedPage {
    /// 1-based page number
    pub number: usize,
    pub header: Vec<DrawCommand>,
    pub body: Vec<DrawCommand>,
    pub footer: Vec<DrawCommand>,
}

impl RenderedPage {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// All commands in paint order: header, body, footer
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.header
            .iter()
            .chain(self.body.iter())
            .chain(self.footer.iter())
    }

    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Text of every body command, in order
    pub fn body_text(&self) -> Vec<String> {
        self.body.iter().filter_map(DrawCommand::text).collect()
    }
}
