//! Page Manager: owns the cursor, reserves vertical space and breaks pages
//!
//! All page-break decisions are made here. Placers only ask for space and
//! receive the origin to draw at.

use crate::config::LayoutConfig;
use crate::constants::{FOOTER_FONT_SIZE, FOOTER_OFFSET, LOGO_HEIGHT, RULE_THICKNESS};
use crate::draw::{DrawCommand, RenderedPage};
use crate::geometry::Cursor;
use crate::image::LoadedImage;
use crate::model::DocumentMeta;
use crate::style::{Color, TextStyle};
use crate::text::TextMetrics;
use tracing::{debug, trace, warn};

/// Tolerance for accumulated float error in fit checks
const FIT_EPSILON: f32 = 0.01;

/// Gap between the logo and the organization name
const LOGO_GAP: f32 = 8.0;

/// Content repeated on every page
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStamps {
    pub organization: String,
    pub title: String,
    pub date: String,
    /// Absent when the document has no logo or it failed to load
    pub logo: Option<LoadedImage>,
}

impl RunningStamps {
    pub fn new(meta: &DocumentMeta, logo: Option<LoadedImage>) -> Self {
        Self {
            organization: meta.organization.clone(),
            title: meta.title.clone(),
            date: meta.formatted_date(),
            logo,
        }
    }
}

/// Origin handed to a placer after a successful reservation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    /// Absolute left edge of the column
    pub x: f32,
    /// Absolute top of the reserved band
    pub y: f32,
    /// Column width
    pub width: f32,
    /// Reserved height
    pub height: f32,
}

/// Tracks the cursor over a fixed page geometry and collects finished pages.
///
/// The manager is always on an open page; the between-pages state only
/// exists inside [`PageManager::break_page`].
#[derive(Debug)]
pub struct PageManager<'a> {
    config: &'a LayoutConfig,
    stamps: &'a RunningStamps,
    metrics: TextMetrics,
    cursor: Cursor,
    current: RenderedPage,
    pages: Vec<RenderedPage>,
}

impl<'a> PageManager<'a> {
    /// Open the first page, stamping its header
    pub fn new(config: &'a LayoutConfig, stamps: &'a RunningStamps) -> Self {
        let mut manager = Self {
            config,
            stamps,
            metrics: TextMetrics::from_config(config),
            cursor: Cursor::new(),
            current: RenderedPage::new(1),
            pages: Vec::new(),
        };
        manager.open_page();
        manager
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn column_width(&self) -> f32 {
        self.config.column_width()
    }

    /// Space left between the cursor and the bottom margin
    pub fn remaining(&self) -> f32 {
        (self.config.geometry.usable_height() - self.cursor.offset).max(0.0)
    }

    pub fn fits(&self, height: f32) -> bool {
        self.cursor.offset + height <= self.config.geometry.usable_height() + FIT_EPSILON
    }

    /// True while nothing has been reserved on the current page
    pub fn is_fresh(&self) -> bool {
        self.cursor.offset <= self.config.body_top()
    }

    /// Reserve `height` points, breaking the page first when needed.
    ///
    /// A block that does not fit even on a fresh page is placed at the top
    /// of one and overflows the bottom margin; a fresh page never breaks,
    /// so this cannot loop.
    pub fn reserve(&mut self, height: f32) -> Placement {
        if !self.fits(height) && !self.is_fresh() {
            self.break_page();
        }

        let geometry = &self.config.geometry;
        let placement = Placement {
            page: self.cursor.page,
            x: geometry.content_left(),
            y: geometry.absolute_y(self.cursor.offset),
            width: geometry.usable_width(),
            height,
        };

        if !self.fits(height) {
            warn!(
                page = self.cursor.page,
                height,
                usable = geometry.usable_height(),
                "Block is taller than a page; allowing overflow"
            );
        }

        self.advance(height);
        trace!(page = placement.page, y = placement.y, height, "Reserved space");
        placement
    }

    /// Move the cursor down without breaking; clamped to the usable height
    pub fn advance(&mut self, height: f32) {
        let usable = self.config.geometry.usable_height();
        self.cursor.offset = (self.cursor.offset + height).min(usable);
    }

    /// Close the current page (footer) and open the next one (header)
    pub fn break_page(&mut self) {
        debug!(page = self.cursor.page, "Breaking page");
        self.stamp_footer();

        self.cursor.page += 1;
        let finished = std::mem::replace(&mut self.current, RenderedPage::new(self.cursor.page));
        self.pages.push(finished);
        self.open_page();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.current.body.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.current.body.extend(commands);
    }

    /// Close the final page and return all pages in order.
    ///
    /// The last page is stamped even when it holds no body content.
    pub fn finish(mut self) -> Vec<RenderedPage> {
        self.stamp_footer();
        self.pages.push(self.current);
        debug!(pages = self.pages.len(), "Finished document");
        self.pages
    }

    fn open_page(&mut self) {
        self.cursor.offset = self.config.body_top();
        self.stamp_header();
    }

    fn stamp_header(&mut self) {
        if !self.config.header_footer {
            return;
        }

        let geometry = &self.config.geometry;
        let left = geometry.content_left();
        let top = geometry.margins.top;
        let font_size = self.config.base_font_size;
        let mut text_x = left;

        if let Some(logo) = &self.stamps.logo {
            let (width, height) = logo.fit_within(geometry.usable_width() / 3.0, LOGO_HEIGHT);
            self.current.header.push(DrawCommand::Image {
                x: left,
                y: top + (LOGO_HEIGHT - height) / 2.0,
                width,
                height,
                bytes: logo.bytes.clone(),
            });
            text_x += width + LOGO_GAP;
        }

        let name_style = TextStyle::regular(font_size + 2.0).bold();
        let baseline = top + (LOGO_HEIGHT + name_style.font_size) / 2.0;
        self.current.header.push(DrawCommand::Text {
            x: text_x,
            y: baseline,
            text: self.stamps.organization.clone(),
            style: name_style,
        });

        if !self.stamps.title.is_empty() {
            let title_style = TextStyle::regular(font_size).with_color(Color::gray(0.3));
            let title_width = self.metrics.text_width(&self.stamps.title, font_size);
            self.current.header.push(DrawCommand::Text {
                x: (left + geometry.usable_width() - title_width).max(left),
                y: baseline,
                text: self.stamps.title.clone(),
                style: title_style,
            });
        }

        let divider_y = top + self.config.header_height - RULE_THICKNESS - self.config.block_spacing / 2.0;
        self.current.header.push(DrawCommand::Rule {
            x: left,
            y: divider_y.max(top + LOGO_HEIGHT),
            width: geometry.usable_width(),
            height: RULE_THICKNESS,
            color: Color::gray(0.5),
        });
    }

    fn stamp_footer(&mut self) {
        if !self.config.header_footer {
            return;
        }

        let geometry = &self.config.geometry;
        let left = geometry.content_left();
        let baseline = (geometry.height - geometry.margins.bottom + FOOTER_OFFSET)
            .min(geometry.height - FOOTER_FONT_SIZE / 2.0);
        let style = TextStyle::regular(FOOTER_FONT_SIZE).with_color(Color::gray(0.4));

        self.current.footer.push(DrawCommand::Text {
            x: left,
            y: baseline,
            text: format!("{} | {}", self.stamps.organization, self.stamps.date),
            style,
        });

        let page_label = format!("Page {}", self.cursor.page);
        let label_width = self.metrics.text_width(&page_label, FOOTER_FONT_SIZE);
        self.current.footer.push(DrawCommand::Text {
            x: left + geometry.usable_width() - label_width,
            y: baseline,
            text: page_label,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamps() -> RunningStamps {
        let meta = DocumentMeta::new(
            "Acme",
            "Report",
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        );
        RunningStamps::new(&meta, None)
    }

    fn rule() -> DrawCommand {
        DrawCommand::Rule {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            color: Color::black(),
        }
    }

    #[test]
    fn test_reserve_within_page_advances_cursor() {
        let config = LayoutConfig::default();
        let stamps = stamps();
        let mut pager = PageManager::new(&config, &stamps);

        let first = pager.reserve(100.0);
        let second = pager.reserve(50.0);

        assert_eq!(first.page, 1);
        assert_eq!(second.page, 1);
        assert_eq!(second.y - first.y, 100.0);
        assert_eq!(pager.cursor().offset, config.body_top() + 150.0);
    }

    #[test]
    fn test_reserve_breaks_when_space_runs_out() {
        let config = LayoutConfig::default();
        let stamps = stamps();
        let mut pager = PageManager::new(&config, &stamps);

        pager.reserve(600.0);
        pager.push(rule());
        let placement = pager.reserve(200.0);
        pager.push(rule());

        assert_eq!(placement.page, 2);
        assert_eq!(
            placement.y,
            config.geometry.absolute_y(config.body_top())
        );

        let pages = pager.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.has_header() && p.has_footer()));
        assert_eq!(pages[1].number, 2);
    }

    #[test]
    fn test_oversized_block_on_fresh_page_overflows_without_breaking() {
        let config = LayoutConfig::default();
        let stamps = stamps();
        let mut pager = PageManager::new(&config, &stamps);

        let placement = pager.reserve(5000.0);
        assert_eq!(placement.page, 1);
        assert_eq!(pager.cursor().offset, config.geometry.usable_height());

        // The next block must start a new page
        let next = pager.reserve(10.0);
        assert_eq!(next.page, 2);
        assert_eq!(pager.finish().len(), 2);
    }

    #[test]
    fn test_final_page_gets_footer_even_when_empty() {
        let config = LayoutConfig::default();
        let stamps = stamps();
        let pages = PageManager::new(&config, &stamps).finish();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].has_footer());
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_disabled_stamps() {
        let config = LayoutConfig::default().with_header_footer(false);
        let stamps = stamps();
        let mut pager = PageManager::new(&config, &stamps);
        let placement = pager.reserve(10.0);
        assert_eq!(placement.y, config.geometry.margins.top);

        let pages = pager.finish();
        assert!(!pages[0].has_header());
        assert!(!pages[0].has_footer());
    }

    #[test]
    fn test_footer_carries_page_number() {
        let config = LayoutConfig::default();
        let stamps = stamps();
        let mut pager = PageManager::new(&config, &stamps);
        pager.break_page();
        let pages = pager.finish();

        let labels: Vec<String> = pages[1].footer.iter().filter_map(DrawCommand::text).collect();
        assert!(labels.contains(&"Page 2".to_string()));
        assert!(labels.contains(&"Acme | 2026-01-02".to_string()));
    }
}
