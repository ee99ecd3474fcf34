//! Table placement across pages with header-row repetition

use crate::config::LayoutConfig;
use crate::draw::DrawCommand;
use crate::layout::{TableLayout, calculate_layout, key_value_layout};
use crate::model::{DataTable, KeyValueTable};
use crate::page::{PageManager, Placement};
use crate::style::{Alignment, Color, Stroke, TextStyle};
use crate::text::TextMetrics;
use tracing::{debug, instrument, trace};

/// Summary of how a table was spread over pages
#[derive(Debug, Clone, PartialEq)]
pub struct PagedTableResult {
    /// Pages the table touched, in order
    pub pages: Vec<usize>,
    /// Number of times the header row was drawn
    pub header_repeats: usize,
}

impl PagedTableResult {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    fn note_page(&mut self, page: usize) {
        if self.pages.last() != Some(&page) {
            self.pages.push(page);
        }
    }
}

/// Look of one row of cells
#[derive(Debug, Clone, Copy)]
struct RowLook {
    style: TextStyle,
    background: Option<Color>,
}

impl RowLook {
    fn header(config: &LayoutConfig) -> Self {
        Self {
            style: TextStyle::regular(config.base_font_size).bold(),
            background: Some(Color::light_gray()),
        }
    }

    fn body(config: &LayoutConfig) -> Self {
        Self {
            style: TextStyle::regular(config.base_font_size),
            background: None,
        }
    }
}

/// Emit one row of cells starting at (`x`, `y`)
fn row_commands<'a>(
    cells: impl Iterator<Item = &'a str>,
    alignments: impl Fn(usize) -> Alignment,
    look: RowLook,
    column_widths: &[f32],
    x: f32,
    y: f32,
    height: f32,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    let metrics = TextMetrics::from_config(config);
    let padding = config.cell_padding;
    let mut current_x = x;

    cells
        .zip(column_widths)
        .enumerate()
        .map(|(col, (text, &width))| {
            let command = DrawCommand::TableCell {
                x: current_x,
                y,
                width,
                height,
                lines: metrics.wrap(text, width - padding.horizontal(), look.style.font_size),
                style: look.style,
                alignment: alignments(col),
                padding,
                background: look.background,
                border: Stroke::default(),
            };
            current_x += width;
            command
        })
        .collect()
}

fn header_commands(
    table: &DataTable,
    layout: &TableLayout,
    x: f32,
    y: f32,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    row_commands(
        table.header.iter().map(String::as_str),
        |col| table.alignment(col),
        RowLook::header(config),
        &layout.column_widths,
        x,
        y,
        layout.header_height,
        config,
    )
}

fn body_row_commands(
    table: &DataTable,
    layout: &TableLayout,
    row_idx: usize,
    x: f32,
    y: f32,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    row_commands(
        table.rows[row_idx].iter().map(String::as_str),
        |col| table.alignment(col),
        RowLook::body(config),
        &layout.column_widths,
        x,
        y,
        layout.row_heights[row_idx],
        config,
    )
}

/// Place a data table, splitting it row-wise across pages.
///
/// The header row is reserved together with the first row on every page so
/// a header never ends up alone at the bottom of a page. Each row is drawn
/// exactly once. A row taller than a whole page is placed at the top of a
/// fresh page and overflows.
#[instrument(skip_all, fields(rows = table.rows.len(), columns = table.column_count()))]
pub fn place_table(
    table: &DataTable,
    pager: &mut PageManager<'_>,
    config: &LayoutConfig,
) -> PagedTableResult {
    let layout = calculate_layout(table, pager.column_width(), config);
    trace!("Calculated layout: {:?}", layout);

    let mut result = PagedTableResult {
        pages: Vec::new(),
        header_repeats: 0,
    };

    if table.rows.is_empty() {
        let at = pager.reserve(layout.header_height);
        pager.extend(header_commands(table, &layout, at.x, at.y, config));
        result.header_repeats = 1;
        result.note_page(at.page);
        return result;
    }

    for row_idx in 0..table.rows.len() {
        let row_height = layout.row_heights[row_idx];

        let at: Placement = if row_idx > 0 && pager.fits(row_height) {
            pager.reserve(row_height)
        } else {
            // First row, or the row starts a continuation page
            if row_idx > 0 {
                debug!("Continuing table on a new page at row {}", row_idx);
            }
            let at = pager.reserve(layout.header_height + row_height);
            pager.extend(header_commands(table, &layout, at.x, at.y, config));
            result.header_repeats += 1;
            Placement {
                y: at.y + layout.header_height,
                height: row_height,
                ..at
            }
        };

        pager.extend(body_row_commands(table, &layout, row_idx, at.x, at.y, config));
        result.note_page(at.page);
    }

    debug!(
        "Placed table over {} page(s), header drawn {} time(s)",
        result.total_pages(),
        result.header_repeats
    );
    result
}

/// Draw commands for a key/value grid at the reserved placement
pub fn place_key_values(
    table: &KeyValueTable,
    at: &Placement,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    let layout = key_value_layout(table, at.width, config);
    let label_look = RowLook {
        style: TextStyle::regular(config.base_font_size).bold(),
        background: Some(Color::gray(0.95)),
    };
    let value_look = RowLook::body(config);

    let mut commands = Vec::with_capacity(table.rows.len() * 2);
    let mut y = at.y;
    for ((label, value), &height) in table.rows.iter().zip(&layout.row_heights) {
        commands.extend(row_commands(
            std::iter::once(label.as_str()),
            |_| Alignment::Left,
            label_look,
            &layout.column_widths[..1],
            at.x,
            y,
            height,
            config,
        ));
        commands.extend(row_commands(
            std::iter::once(value.as_str()),
            |_| Alignment::Left,
            value_look,
            &layout.column_widths[1..],
            at.x + layout.column_widths[0],
            y,
            height,
            config,
        ));
        y += height;
    }
    commands
}
