//! Backend-independent content model of a report

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::trace;

use crate::Result;
use crate::constants::DATE_FORMAT;
use crate::error::ComposeError;
use crate::style::{Alignment, Color};

/// Shared image data (reference-counted bytes)
pub type SharedImageData = Arc<Vec<u8>>;

/// Heading level; only two levels are used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    One,
    Two,
}

/// Visual treatment of a heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoration {
    /// White text on a full-width colored band
    Banner(Color),
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    pub decoration: Decoration,
}

impl Heading {
    pub fn new<S: Into<String>>(level: HeadingLevel, text: S) -> Self {
        Self {
            level,
            text: text.into(),
            decoration: Decoration::Plain,
        }
    }

    /// Decorate with the default banner color
    pub fn banner(mut self) -> Self {
        self.decoration = Decoration::Banner(Color::banner_blue());
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }
}

/// Ordered label/value pairs rendered as a two-column grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyValueTable {
    pub rows: Vec<(String, String)>,
}

impl KeyValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row<L: Into<String>, V: Into<String>>(mut self, label: L, value: V) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }
}

/// Column width specification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in points
    Points(f32),
    /// Percentage of the available table width (0-100)
    Percentage(f32),
    /// Share the remaining width evenly with other auto columns
    Auto,
}

/// Per-column width and alignment hint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHint {
    pub width: ColumnWidth,
    pub alignment: Alignment,
}

impl ColumnHint {
    pub fn new(width: ColumnWidth) -> Self {
        Self {
            width,
            alignment: Alignment::Left,
        }
    }

    pub fn auto() -> Self {
        Self::new(ColumnWidth::Auto)
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A data table with a header row that repeats on every page it spans
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_hints: Option<Vec<ColumnHint>>,
}

impl DataTable {
    /// Create a table with the given column titles and no rows
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            column_hints: None,
        }
    }

    /// Add a row of cell texts
    pub fn add_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        trace!("Adding row with {} cells", row.len());
        self.rows.push(row);
        self
    }

    pub fn with_column_hints(mut self, hints: Vec<ColumnHint>) -> Self {
        self.column_hints = Some(hints);
        self
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Alignment of a body column, defaulting to left
    pub fn alignment(&self, column: usize) -> Alignment {
        self.column_hints
            .as_ref()
            .and_then(|hints| hints.get(column))
            .map(|hint| hint.alignment)
            .unwrap_or_default()
    }

    /// Validate table structure
    pub fn validate(&self) -> std::result::Result<(), String> {
        let expected_cols = self.column_count();
        if expected_cols == 0 {
            return Err("Table has no columns".to_string());
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != expected_cols {
                return Err(format!(
                    "Row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    expected_cols
                ));
            }
        }

        if let Some(ref hints) = self.column_hints {
            if hints.len() != expected_cols {
                return Err(format!(
                    "Column hints array has {} elements, but table has {} columns",
                    hints.len(),
                    expected_cols
                ));
            }
            for (i, hint) in hints.iter().enumerate() {
                let value = match hint.width {
                    ColumnWidth::Points(v) | ColumnWidth::Percentage(v) => v,
                    ColumnWidth::Auto => 0.0,
                };
                if !value.is_finite() || value < 0.0 {
                    return Err(format!("Column {i} has invalid width {value}"));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulletList {
    pub items: Vec<String>,
}

impl BulletList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item<S: Into<String>>(mut self, text: S) -> Self {
        self.items.push(text.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub emphasis: Emphasis,
}

impl Paragraph {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Normal,
        }
    }

    pub fn bold(mut self) -> Self {
        self.emphasis = Emphasis::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.emphasis = Emphasis::Italic;
        self
    }
}

/// Where an image's encoded bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Bytes already in memory
    Bytes(SharedImageData),
    /// A key resolved by an `ImageFetcher` (path, URL, storage id)
    Reference(String),
}

impl ImageSource {
    pub fn bytes(data: Vec<u8>) -> Self {
        Self::Bytes(Arc::new(data))
    }

    pub fn reference<S: Into<String>>(reference: S) -> Self {
        Self::Reference(reference.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub source: ImageSource,
    pub caption: String,
    /// Width the image is scaled to, in points
    pub target_width: f32,
}

impl ImageBlock {
    pub fn new<S: Into<String>>(source: ImageSource, caption: S, target_width: f32) -> Self {
        Self {
            source,
            caption: caption.into(),
            target_width,
        }
    }
}

/// "Place, date" line plus a signature line with a label underneath
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureBlock {
    pub place: String,
    pub date: String,
    pub label: String,
}

impl SignatureBlock {
    pub fn new<P, D, L>(place: P, date: D, label: L) -> Self
    where
        P: Into<String>,
        D: Into<String>,
        L: Into<String>,
    {
        Self {
            place: place.into(),
            date: date.into(),
            label: label.into(),
        }
    }
}

/// One typed unit of report content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(Heading),
    KeyValueTable(KeyValueTable),
    DataTable(DataTable),
    BulletList(BulletList),
    Paragraph(Paragraph),
    Image(ImageBlock),
    SignatureBlock(SignatureBlock),
    /// Thin divider of fixed height
    Rule,
}

impl Block {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading(_) => "heading",
            Block::KeyValueTable(_) => "key-value table",
            Block::DataTable(_) => "data table",
            Block::BulletList(_) => "bullet list",
            Block::Paragraph(_) => "paragraph",
            Block::Image(_) => "image",
            Block::SignatureBlock(_) => "signature",
            Block::Rule => "rule",
        }
    }
}

macro_rules! impl_from_block {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Block {
                fn from(value: $ty) -> Self {
                    Block::$variant(value)
                }
            }
        )*
    };
}

impl_from_block!(
    Heading(Heading),
    KeyValueTable(KeyValueTable),
    DataTable(DataTable),
    BulletList(BulletList),
    Paragraph(Paragraph),
    Image(ImageBlock),
    SignatureBlock(SignatureBlock),
);

/// Running header/footer metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub organization: String,
    pub logo: Option<ImageSource>,
    pub generated_on: NaiveDate,
    pub title: String,
    /// Kind of report, used as the file name prefix
    pub report_kind: String,
}

impl DocumentMeta {
    pub fn new<O, T>(organization: O, title: T, generated_on: NaiveDate) -> Self
    where
        O: Into<String>,
        T: Into<String>,
    {
        Self {
            organization: organization.into(),
            logo: None,
            generated_on,
            title: title.into(),
            report_kind: "Report".to_string(),
        }
    }

    pub fn with_logo(mut self, logo: ImageSource) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_report_kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.report_kind = kind.into();
        self
    }

    pub fn formatted_date(&self) -> String {
        self.generated_on.format(DATE_FORMAT).to_string()
    }
}

/// A complete report: metadata plus the ordered block sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub meta: DocumentMeta,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(meta: DocumentMeta) -> Self {
        Self {
            meta,
            blocks: Vec::new(),
        }
    }

    /// Append a block
    pub fn push<B: Into<Block>>(mut self, block: B) -> Self {
        self.blocks.push(block.into());
        self
    }

    pub fn rule(self) -> Self {
        self.push(Block::Rule)
    }

    /// File name following `<ReportKind>_<Organization>_<Date>.<ext>`
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            slug::slugify(&self.meta.report_kind),
            slug::slugify(&self.meta.organization),
            self.meta.formatted_date(),
            extension.trim_start_matches('.')
        )
    }

    /// Check every block against the content model contract.
    ///
    /// Fails on the first violation, naming the offending block index.
    pub fn validate(&self, column_width: f32) -> Result<()> {
        for (index, block) in self.blocks.iter().enumerate() {
            match block {
                Block::DataTable(table) => table
                    .validate()
                    .map_err(|reason| ComposeError::invalid_block(index, reason))?,
                Block::Image(image) => {
                    if !image.target_width.is_finite() || image.target_width <= 0.0 {
                        return Err(ComposeError::invalid_block(
                            index,
                            format!("image target width {} is not positive", image.target_width),
                        ));
                    }
                    if image.target_width > column_width {
                        return Err(ComposeError::invalid_block(
                            index,
                            format!(
                                "image target width {} exceeds column width {}",
                                image.target_width, column_width
                            ),
                        ));
                    }
                }
                Block::Heading(_)
                | Block::KeyValueTable(_)
                | Block::BulletList(_)
                | Block::Paragraph(_)
                | Block::SignatureBlock(_)
                | Block::Rule => {}
            }
        }
        Ok(())
    }
}
