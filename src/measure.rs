//! Measurement: the vertical extent each block needs at a column width
//!
//! Every function here is pure. Placers use the same helpers so that the
//! reserved height and the drawn height always agree.

use crate::config::LayoutConfig;
use crate::constants::{
    BANNER_PADDING, BULLET_INDENT, HEADING_ONE_SCALE, HEADING_TWO_SCALE, RULE_HEIGHT,
    RULE_THICKNESS, SIGNATURE_SPACE,
};
use crate::image::{LoadedImage, image_height};
use crate::layout::{calculate_layout, key_value_layout};
use crate::model::{Block, Decoration, Emphasis, Heading, HeadingLevel, Paragraph};
use crate::style::TextStyle;
use crate::text::TextMetrics;

/// Gap between a signature line and the text above it
pub const SIGNATURE_LINE_GAP: f32 = 3.0;

/// Required height of `block` at `column_width`.
///
/// `image` is the acquired image for image blocks (`None` when acquisition
/// failed, which measures as the placeholder) and is ignored otherwise.
pub fn measure(
    block: &Block,
    column_width: f32,
    config: &LayoutConfig,
    image: Option<&LoadedImage>,
) -> f32 {
    let metrics = TextMetrics::from_config(config);
    let font_size = config.base_font_size;

    match block {
        Block::Heading(heading) => heading_height(heading, column_width, config),
        Block::KeyValueTable(table) => key_value_layout(table, column_width, config).total_height(),
        Block::DataTable(table) => calculate_layout(table, column_width, config).total_height(),
        Block::BulletList(list) => list
            .items
            .iter()
            .map(|item| metrics.wrapped_height(item, column_width - BULLET_INDENT, font_size))
            .sum(),
        Block::Paragraph(paragraph) => {
            metrics.wrapped_height(&paragraph.text, column_width, font_size)
        }
        Block::Image(block) => image_height(block, image, config),
        Block::SignatureBlock(_) => signature_height(config),
        Block::Rule => RULE_HEIGHT,
    }
}

pub(crate) fn heading_style(heading: &Heading, config: &LayoutConfig) -> TextStyle {
    let scale = match heading.level {
        HeadingLevel::One => HEADING_ONE_SCALE,
        HeadingLevel::Two => HEADING_TWO_SCALE,
    };
    let style = TextStyle::regular(config.base_font_size * scale).bold();
    match heading.decoration {
        Decoration::Banner(_) => style.with_color(crate::style::Color::white()),
        Decoration::Plain => style,
    }
}

/// Width the heading text wraps at; banners are inset by their padding
pub(crate) fn heading_text_width(heading: &Heading, column_width: f32) -> f32 {
    match heading.decoration {
        Decoration::Banner(_) => column_width - 2.0 * BANNER_PADDING,
        Decoration::Plain => column_width,
    }
}

pub fn heading_height(heading: &Heading, column_width: f32, config: &LayoutConfig) -> f32 {
    let metrics = TextMetrics::from_config(config);
    let style = heading_style(heading, config);
    let text_height = metrics.wrapped_height(
        &heading.text,
        heading_text_width(heading, column_width),
        style.font_size,
    );
    match heading.decoration {
        Decoration::Banner(_) => text_height + 2.0 * BANNER_PADDING,
        Decoration::Plain => text_height,
    }
}

pub(crate) fn paragraph_style(paragraph: &Paragraph, config: &LayoutConfig) -> TextStyle {
    let style = TextStyle::regular(config.base_font_size);
    match paragraph.emphasis {
        Emphasis::Normal => style,
        Emphasis::Bold => style.bold(),
        Emphasis::Italic => style.italic(),
    }
}

pub(crate) fn signature_label_size(config: &LayoutConfig) -> f32 {
    config.base_font_size * 0.85
}

/// Blank signing space, the line, and the labels under it
pub fn signature_height(config: &LayoutConfig) -> f32 {
    SIGNATURE_SPACE
        + SIGNATURE_LINE_GAP
        + RULE_THICKNESS
        + config.line_height_for(signature_label_size(config))
}
