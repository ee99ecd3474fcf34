//! Placers for single-reservation blocks

use crate::config::LayoutConfig;
use crate::constants::{BANNER_PADDING, BULLET_INDENT, RULE_HEIGHT, RULE_THICKNESS, SIGNATURE_SPACE};
use crate::draw::DrawCommand;
use crate::measure::{
    SIGNATURE_LINE_GAP, heading_height, heading_style, heading_text_width, paragraph_style,
    signature_label_size,
};
use crate::model::{BulletList, Decoration, Heading, Paragraph, SignatureBlock};
use crate::page::Placement;
use crate::style::{Color, TextStyle};
use crate::text::TextMetrics;

const BULLET: &str = "\u{2022}";

/// Share of the column each signature line takes
const SIGNATURE_LINE_SHARE: f32 = 0.45;

/// One text command per line, baselines spaced by the line height
fn text_lines(
    lines: Vec<String>,
    x: f32,
    top: f32,
    style: TextStyle,
    metrics: &TextMetrics,
) -> impl Iterator<Item = DrawCommand> {
    let line_height = metrics.line_height(style.font_size);
    lines.into_iter().enumerate().map(move |(i, text)| DrawCommand::Text {
        x,
        y: top + i as f32 * line_height + style.font_size,
        text,
        style,
    })
}

pub fn place_heading(heading: &Heading, at: &Placement, config: &LayoutConfig) -> Vec<DrawCommand> {
    let metrics = TextMetrics::from_config(config);
    let style = heading_style(heading, config);
    let lines = metrics.wrap(
        &heading.text,
        heading_text_width(heading, at.width),
        style.font_size,
    );

    match heading.decoration {
        Decoration::Banner(color) => {
            let mut commands = vec![DrawCommand::Frame {
                x: at.x,
                y: at.y,
                width: at.width,
                height: heading_height(heading, at.width, config),
                fill: Some(color),
                stroke: None,
            }];
            commands.extend(text_lines(
                lines,
                at.x + BANNER_PADDING,
                at.y + BANNER_PADDING,
                style,
                &metrics,
            ));
            commands
        }
        Decoration::Plain => text_lines(lines, at.x, at.y, style, &metrics).collect(),
    }
}

pub fn place_paragraph(
    paragraph: &Paragraph,
    at: &Placement,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    let metrics = TextMetrics::from_config(config);
    let style = paragraph_style(paragraph, config);
    let lines = metrics.wrap(&paragraph.text, at.width, style.font_size);
    text_lines(lines, at.x, at.y, style, &metrics).collect()
}

pub fn place_bullets(list: &BulletList, at: &Placement, config: &LayoutConfig) -> Vec<DrawCommand> {
    let metrics = TextMetrics::from_config(config);
    let style = TextStyle::regular(config.base_font_size);
    let mut commands = Vec::new();
    let mut top = at.y;

    for item in &list.items {
        let lines = metrics.wrap(item, at.width - BULLET_INDENT, style.font_size);
        let height = lines.len() as f32 * metrics.line_height(style.font_size);

        commands.push(DrawCommand::Text {
            x: at.x,
            y: top + style.font_size,
            text: BULLET.to_string(),
            style,
        });
        commands.extend(text_lines(lines, at.x + BULLET_INDENT, top, style, &metrics));
        top += height;
    }

    commands
}

/// "Place, date" over a left line, an empty signing line on the right,
/// and a label under each
pub fn place_signature(
    signature: &SignatureBlock,
    at: &Placement,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    let line_width = at.width * SIGNATURE_LINE_SHARE;
    let right_x = at.x + at.width - line_width;
    let line_y = at.y + SIGNATURE_SPACE + SIGNATURE_LINE_GAP;
    let label_style = TextStyle::regular(signature_label_size(config)).with_color(Color::gray(0.3));
    let label_y = line_y + RULE_THICKNESS + label_style.font_size;

    let place_and_date = match (signature.place.is_empty(), signature.date.is_empty()) {
        (false, false) => format!("{}, {}", signature.place, signature.date),
        (false, true) => signature.place.clone(),
        (true, _) => signature.date.clone(),
    };

    let line = |x: f32| DrawCommand::Rule {
        x,
        y: line_y,
        width: line_width,
        height: RULE_THICKNESS,
        color: Color::black(),
    };

    vec![
        DrawCommand::Text {
            x: at.x,
            y: at.y + SIGNATURE_SPACE,
            text: place_and_date,
            style: TextStyle::regular(config.base_font_size),
        },
        line(at.x),
        line(right_x),
        DrawCommand::Text {
            x: at.x,
            y: label_y,
            text: "Place, date".to_string(),
            style: label_style,
        },
        DrawCommand::Text {
            x: right_x,
            y: label_y,
            text: signature.label.clone(),
            style: label_style,
        },
    ]
}

pub fn place_rule(at: &Placement) -> Vec<DrawCommand> {
    vec![DrawCommand::Rule {
        x: at.x,
        y: at.y + (RULE_HEIGHT - RULE_THICKNESS) / 2.0,
        width: at.width,
        height: RULE_THICKNESS,
        color: Color::gray(0.5),
    }]
}
