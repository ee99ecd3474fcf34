//! Paginated report composition
//!
//! Turns an ordered list of content blocks (headings, key/value grids,
//! data tables, lists, paragraphs, images, signatures and rules) into
//! fixed-size pages of absolutely positioned draw commands. Layout is
//! deterministic: the same document and configuration always produce the
//! same pages.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use report_composer::{Composer, DataTable, Document, DocumentMeta, Heading, HeadingLevel, LayoutConfig};
//!
//! # async fn run() -> report_composer::Result<()> {
//! let meta = DocumentMeta::new("Acme", "Monthly Report", NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
//! let document = Document::new(meta)
//!     .push(Heading::new(HeadingLevel::One, "Overview").banner())
//!     .push(DataTable::new(["Id", "Status"]).add_row(["1", "open"]));
//!
//! let pages = Composer::new(LayoutConfig::a4()).compose(&document).await?;
//! assert!(!pages.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod composer;
pub mod config;
pub mod constants;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod image;
pub mod layout;
pub mod measure;
pub mod model;
pub mod page;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod place;
pub mod style;
pub mod table;
pub mod text;

pub use composer::Composer;
pub use config::LayoutConfig;
pub use draw::{DrawCommand, RenderedPage};
pub use error::{AcquireError, ComposeError, Result};
pub use geometry::{Cursor, Margins, PageGeometry};
pub use crate::image::{FilesystemFetcher, ImageFetcher, InMemoryFetcher, LoadedImage, TimeoutFetcher};
pub use model::{
    Block, BulletList, ColumnHint, ColumnWidth, DataTable, Decoration, Document, DocumentMeta,
    Emphasis, Heading, HeadingLevel, ImageBlock, ImageSource, KeyValueTable, Paragraph,
    SharedImageData, SignatureBlock,
};
pub use page::{PageManager, Placement, RunningStamps};
pub use style::{Alignment, BorderStyle, Color, Padding, Stroke, TextStyle};
pub use table::PagedTableResult;

#[cfg(feature = "pdf")]
pub use pdf::{render_pdf, to_pdf_bytes};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn composer() -> Composer {
        Composer::new(LayoutConfig::default())
    }

    fn meta() -> DocumentMeta {
        DocumentMeta::new(
            "Acme Care Services",
            "Incident Report",
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )
        .with_report_kind("Incident Report")
    }

    fn incident_table(rows: usize) -> DataTable {
        (0..rows).fold(DataTable::new(["Id", "Date", "Description"]), |table, i| {
            table.add_row([
                format!("{i}"),
                "2026-10-01".to_string(),
                format!("Incident number {i}"),
            ])
        })
    }

    fn report(rows: usize) -> Document {
        Document::new(meta())
            .push(Heading::new(HeadingLevel::One, "Incidents").banner())
            .push(
                KeyValueTable::new()
                    .row("Facility", "North wing")
                    .row("Reviewer", "J. Doe")
                    .row("Period", "October"),
            )
            .push(incident_table(rows))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(width, height, ::image::Rgb([10, 120, 60]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_long_table_continues_with_repeated_header() {
        init_tracing();
        let pages = composer().compose(&report(50)).await.unwrap();
        assert!(pages.len() >= 2);

        assert_eq!(pages[0].body_text()[0], "Incidents");
        for page in &pages[1..] {
            let text = page.body_text();
            assert_eq!(&text[..3], &["Id", "Date", "Description"]);
            assert!(!text.iter().any(|t| t == "Incidents"));
        }
    }

    #[tokio::test]
    async fn test_every_table_row_appears_exactly_once() {
        let pages = composer().compose(&report(120)).await.unwrap();
        let descriptions: Vec<String> = pages
            .iter()
            .flat_map(|page| page.body_text())
            .filter(|text| text.starts_with("Incident number"))
            .collect();
        let expected: Vec<String> = (0..120).map(|i| format!("Incident number {i}")).collect();
        assert_eq!(descriptions, expected);
    }

    #[tokio::test]
    async fn test_composition_is_repeatable() {
        let composer = composer();
        let document = report(80);
        let first = composer.compose(&document).await.unwrap();
        let second = composer.compose(&document).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_documents_do_not_interfere() {
        let composer = Arc::new(composer());
        let small = report(2);
        let large = report(150);

        let (a, b) = tokio::join!(composer.compose(&small), composer.compose(&large));
        assert_eq!(a.unwrap(), composer.compose(&small).await.unwrap());
        assert_eq!(b.unwrap(), composer.compose(&large).await.unwrap());
    }

    #[tokio::test]
    async fn test_every_page_is_stamped_and_numbered() {
        let pages = composer().compose(&report(150)).await.unwrap();
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert!(page.has_header());
            let footer: Vec<String> = page.footer.iter().filter_map(DrawCommand::text).collect();
            assert_eq!(
                footer,
                vec![
                    "Acme Care Services | 2026-10-16".to_string(),
                    format!("Page {}", i + 1)
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_body_stays_inside_the_usable_area() {
        let config = LayoutConfig::default();
        let pages = Composer::new(config.clone()).compose(&report(150)).await.unwrap();
        let top = config.geometry.margins.top + config.body_top();
        let bottom = config.geometry.height - config.geometry.margins.bottom;

        for page in &pages {
            for command in &page.body {
                assert!(command.top() >= top - 0.01);
                if let DrawCommand::TableCell { y, height, .. } = command {
                    assert!(y + height <= bottom + 0.01);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_disabled_stamps_leave_pages_bare() {
        let config = LayoutConfig::default().with_header_footer(false);
        let pages = Composer::new(config).compose(&report(3)).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert!(!pages[0].has_header());
        assert!(!pages[0].has_footer());
    }

    #[tokio::test]
    async fn test_oversized_row_overflows_a_single_page() {
        let table = DataTable::new(["Notes"]).add_row(["lorem ".repeat(6000)]);
        let document = Document::new(meta()).push(table);
        let pages = composer().compose(&document).await.unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn test_images_resolve_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.png"), png(40, 20)).unwrap();

        let composer =
            Composer::with_fetcher(LayoutConfig::default(), FilesystemFetcher::new(dir.path()));
        let document = Document::new(meta())
            .push(ImageBlock::new(ImageSource::reference("chart.png"), "Weekly totals", 200.0))
            .push(ImageBlock::new(ImageSource::reference("../escape.png"), "Escaped", 200.0));
        let pages = composer.compose(&document).await.unwrap();

        match &pages[0].body[0] {
            DrawCommand::Image { width, height, .. } => {
                assert_eq!(*width, 200.0);
                assert_eq!(*height, 100.0);
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert!(pages[0].body.iter().any(|c| matches!(c, DrawCommand::Frame { .. })));
        assert_eq!(pages[0].body_text(), vec!["Weekly totals", "Escaped"]);
    }

    #[tokio::test]
    async fn test_logo_is_drawn_in_every_header() {
        let fetcher = InMemoryFetcher::new().with_image("logo.png", png(60, 20));
        let composer = Composer::with_fetcher(LayoutConfig::default(), fetcher);
        let mut document = report(150);
        document.meta = document.meta.with_logo(ImageSource::reference("logo.png"));

        let pages = composer.compose(&document).await.unwrap();
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(matches!(page.header[0], DrawCommand::Image { .. }));
        }
    }

    #[tokio::test]
    async fn test_image_wider_than_column_is_rejected() {
        let document = Document::new(meta())
            .push(ImageBlock::new(ImageSource::bytes(png(2, 2)), "", 10_000.0));
        let err = composer().compose(&document).await.unwrap_err();
        assert!(matches!(err, ComposeError::InvalidBlock { index: 0, .. }));
    }

    #[test]
    fn test_file_name_convention() {
        assert_eq!(
            report(0).file_name("pdf"),
            "incident-report_acme-care-services_2026-10-16.pdf"
        );
    }
}
