//! PDF backend: writes rendered pages into a lopdf document
//!
//! Uses the standard Type1 Helvetica family in WinAnsi encoding, so no
//! fonts are embedded.

use std::collections::HashMap;
use std::sync::LazyLock;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, instrument, trace, warn};

use crate::Result;
use crate::config::LayoutConfig;
use crate::draw::{DrawCommand, RenderedPage};
use crate::model::DocumentMeta;
use crate::style::{Alignment, BorderStyle, Color, Stroke, TextStyle};
use crate::text::TextMetrics;

const FONTS: [(&str, &str); 4] = [
    ("F1", "Helvetica"),
    ("F1-Bold", "Helvetica-Bold"),
    ("F1-Italic", "Helvetica-Oblique"),
    ("F1-BoldItalic", "Helvetica-BoldOblique"),
];

/// Dash pattern for dashed strokes: 3 on, 2 off
const DASH_PATTERN: [i64; 2] = [3, 2];

/// Character to code lookup built from lopdf's WinAnsi table. Where several
/// codes share a glyph the lowest wins.
static WIN_ANSI: LazyLock<HashMap<char, u8>> = LazyLock::new(|| {
    let font = font_dictionary(FONTS[0].1);
    let mut table = HashMap::new();
    let Ok(encoding) = font.get_font_encoding(&Document::new()) else {
        warn!("WinAnsi encoding unavailable; text will be written as '?'");
        return table;
    };
    for code in 0..=u8::MAX {
        if let Ok(decoded) = Document::decode_text(&encoding, &[code]) {
            let mut chars = decoded.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                table.entry(ch).or_insert(code);
            }
        }
    }
    table
});

/// Standard Type1 font in WinAnsi encoding
fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Build a PDF document from composed pages.
///
/// `config` must be the configuration the pages were composed with; table
/// cell lines are spaced and aligned with its text metrics.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn render_pdf(
    pages: &[RenderedPage],
    config: &LayoutConfig,
    meta: &DocumentMeta,
) -> Result<Document> {
    let geometry = &config.geometry;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for (name, base_font) in FONTS {
        let font_id = doc.add_object(font_dictionary(base_font));
        fonts.set(name, font_id);
    }
    let fonts_id = doc.add_object(fonts);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = write_page(&mut doc, pages_id, fonts_id, page, config)?;
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), geometry.width.into(), geometry.height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(&meta.title), StringFormat::Literal),
        "Author" => Object::String(encode_win_ansi(&meta.organization), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    debug!("Built PDF with {} page(s)", pages.len());
    Ok(doc)
}

/// Render and serialize to bytes
pub fn to_pdf_bytes(
    pages: &[RenderedPage],
    config: &LayoutConfig,
    meta: &DocumentMeta,
) -> Result<Vec<u8>> {
    let mut doc = render_pdf(pages, config, meta)?;
    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn write_page(
    doc: &mut Document,
    pages_id: ObjectId,
    fonts_id: ObjectId,
    page: &RenderedPage,
    config: &LayoutConfig,
) -> Result<ObjectId> {
    let mut painter = Painter::new(config);
    let mut xobjects = Dictionary::new();

    for command in page.commands() {
        match command {
            DrawCommand::Image {
                x,
                y,
                width,
                height,
                bytes,
            } => match lopdf::xobject::image_from(bytes.to_vec()) {
                Ok(stream) => {
                    let image_id = doc.add_object(stream);
                    let name = format!("Im{}", image_id.0);
                    painter.image(&name, *x, *y, *width, *height);
                    xobjects.set(name, image_id);
                }
                Err(err) => {
                    warn!(page = page.number, error = %err, "Image could not be embedded; drawing placeholder");
                    painter.frame(*x, *y, *width, *height, None, Some(Stroke::dashed(1.0, Color::gray(0.5))));
                }
            },
            other => painter.paint(other),
        }
    }

    trace!(page = page.number, operations = painter.operations.len(), "Encoding page content");
    let content = Content {
        operations: painter.operations,
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => fonts_id,
            "XObject" => xobjects,
        },
    }))
}

/// Accumulates content stream operations, flipping y to PDF's
/// bottom-left origin.
struct Painter {
    page_height: f32,
    metrics: TextMetrics,
    operations: Vec<Operation>,
}

impl Painter {
    fn new(config: &LayoutConfig) -> Self {
        Self {
            page_height: config.geometry.height,
            metrics: TextMetrics::from_config(config),
            operations: Vec::new(),
        }
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn paint(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Text { x, y, text, style } => self.text(*x, *y, text, style),
            DrawCommand::Rule {
                x,
                y,
                width,
                height,
                color,
            } => self.fill_rect(*x, *y, *width, *height, *color),
            DrawCommand::Frame {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => self.frame(*x, *y, *width, *height, *fill, *stroke),
            DrawCommand::TableCell {
                x,
                y,
                width,
                height,
                lines,
                style,
                alignment,
                padding,
                background,
                border,
            } => {
                self.frame(*x, *y, *width, *height, *background, Some(*border));

                let line_height = self.metrics.line_height(style.font_size);
                for (i, line) in lines.iter().enumerate() {
                    let text_width = self.metrics.text_width(line, style.font_size);
                    let text_x = match alignment {
                        Alignment::Left => x + padding.left,
                        Alignment::Center => x + (width - text_width) / 2.0,
                        Alignment::Right => x + width - padding.right - text_width,
                    };
                    let baseline = y + padding.top + style.font_size + i as f32 * line_height;
                    self.text(text_x, baseline, line, style);
                }
            }
            // Images need document access and are handled by the caller
            DrawCommand::Image { .. } => {}
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![Object::Name(font_name(style).as_bytes().to_vec()), style.font_size.into()],
        );
        self.set_fill(style.color);
        self.op("Td", vec![x.into(), (self.page_height - y).into()]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    fn set_fill(&mut self, color: Color) {
        self.op("rg", vec![color.r.into(), color.g.into(), color.b.into()]);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.page_height - y - height;
        self.op(
            "re",
            vec![x.into(), bottom.into(), width.into(), height.into()],
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.set_fill(color);
        self.rect(x, y, width, height);
        self.op("f", vec![]);
    }

    fn frame(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    ) {
        if let Some(color) = fill {
            self.fill_rect(x, y, width, height, color);
        }

        let Some(stroke) = stroke else { return };
        if stroke.style == BorderStyle::None {
            return;
        }

        let dashed = stroke.style == BorderStyle::Dashed;
        self.op(
            "RG",
            vec![stroke.color.r.into(), stroke.color.g.into(), stroke.color.b.into()],
        );
        self.op("w", vec![stroke.width.into()]);
        if dashed {
            let pattern = DASH_PATTERN.iter().map(|&v| Object::Integer(v)).collect();
            self.op("d", vec![Object::Array(pattern), Object::Integer(0)]);
        }
        self.rect(x, y, width, height);
        self.op("S", vec![]);
        if dashed {
            self.op("d", vec![Object::Array(vec![]), Object::Integer(0)]);
        }
    }

    fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.page_height - y - height;
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                width.into(),
                Object::Integer(0),
                Object::Integer(0),
                height.into(),
                x.into(),
                bottom.into(),
            ],
        );
        self.op("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.op("Q", vec![]);
    }
}

fn font_name(style: &TextStyle) -> &'static str {
    match (style.bold, style.italic) {
        (false, false) => FONTS[0].0,
        (true, false) => FONTS[1].0,
        (false, true) => FONTS[2].0,
        (true, true) => FONTS[3].0,
    }
}

/// Encode text for the standard fonts' WinAnsi encoding.
///
/// Tabs become spaces; characters outside the code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| if ch == '\t' { ' ' } else { ch })
        .map(|ch| WIN_ANSI.get(&ch).copied().unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataTable;
    use crate::page::{PageManager, RunningStamps};
    use crate::style::Padding;
    use crate::table::place_table;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn meta() -> DocumentMeta {
        DocumentMeta::new(
            "Acme",
            "Report",
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )
    }

    fn png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn sample_pages() -> Vec<RenderedPage> {
        let mut first = RenderedPage::new(1);
        first.body.push(DrawCommand::Text {
            x: 50.0,
            y: 100.0,
            text: "Hello (world)".to_string(),
            style: TextStyle::regular(10.0).bold(),
        });
        first.body.push(DrawCommand::TableCell {
            x: 50.0,
            y: 120.0,
            width: 100.0,
            height: 20.0,
            lines: vec!["cell".to_string()],
            style: TextStyle::regular(10.0),
            alignment: Alignment::Right,
            padding: Padding::default(),
            background: Some(Color::light_gray()),
            border: Stroke::default(),
        });
        first.body.push(DrawCommand::Image {
            x: 50.0,
            y: 200.0,
            width: 40.0,
            height: 20.0,
            bytes: Arc::new(png()),
        });

        let mut second = RenderedPage::new(2);
        second.body.push(DrawCommand::Frame {
            x: 50.0,
            y: 100.0,
            width: 200.0,
            height: 60.0,
            fill: None,
            stroke: Some(Stroke::dashed(1.0, Color::gray(0.5))),
        });
        vec![first, second]
    }

    #[test]
    fn test_render_creates_one_pdf_page_per_rendered_page() {
        let doc = render_pdf(&sample_pages(), &LayoutConfig::default(), &meta()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_serialized_output_reloads() {
        let bytes = to_pdf_bytes(&sample_pages(), &LayoutConfig::default(), &meta()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 2);
    }

    #[test]
    fn test_undecodable_image_falls_back_to_frame() {
        let mut page = RenderedPage::new(1);
        page.body.push(DrawCommand::Image {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            bytes: Arc::new(b"garbage".to_vec()),
        });
        let doc = render_pdf(&[page], &LayoutConfig::default(), &meta()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_painter_flips_y() {
        let config = LayoutConfig::default().with_page_size(600.0, 800.0);
        let mut painter = Painter::new(&config);
        painter.fill_rect(10.0, 100.0, 50.0, 20.0, Color::black());
        let re = painter
            .operations
            .iter()
            .find(|op| op.operator == "re")
            .unwrap();
        assert_eq!(re.operands[1].as_float().unwrap(), 680.0);
    }

    #[test]
    fn test_cell_lines_follow_configured_metrics() {
        let mut config = LayoutConfig::default();
        config.line_height = 1.0;
        config.char_width_ratio = 0.6;
        let stamps = RunningStamps::new(&meta(), None);
        let mut pager = PageManager::new(&config, &stamps);
        let table = DataTable::new(["Notes"]).add_row(["word ".repeat(120)]);
        place_table(&table, &mut pager, &config);
        let pages = pager.finish();

        let cell = &pages[0].body[1];
        let DrawCommand::TableCell { y, height, lines, .. } = cell else {
            panic!("expected cell, got {cell:?}");
        };
        assert!(lines.len() > 3);

        let mut painter = Painter::new(&config);
        painter.paint(cell);
        let cell_bottom = config.geometry.height - (y + height);
        let baselines: Vec<f32> = painter
            .operations
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| op.operands[1].as_float().unwrap())
            .collect();
        assert_eq!(baselines.len(), lines.len());
        assert!(baselines.iter().all(|&baseline| baseline >= cell_bottom));
    }

    #[test]
    fn test_font_selection() {
        assert_eq!(font_name(&TextStyle::regular(10.0)), "F1");
        assert_eq!(font_name(&TextStyle::regular(10.0).bold().italic()), "F1-BoldItalic");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Aé€"), vec![b'A', 0xe9, 0x80]);
        assert_eq!(encode_win_ansi("a\tb"), b"a b".to_vec());
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());

        let font = font_dictionary("Helvetica");
        let encoding = font.get_font_encoding(&Document::new()).unwrap();
        let text = "Café – “quoted” … ™ • Œuvre";
        let decoded = Document::decode_text(&encoding, &encode_win_ansi(text)).unwrap();
        assert_eq!(decoded, text);
    }
}
