//! Layout calculation for tables: column widths first, then row heights

use crate::config::LayoutConfig;
use crate::constants::{KEY_COLUMN_SHARE, MIN_COLUMN_WIDTH};
use crate::model::{ColumnHint, ColumnWidth, DataTable, KeyValueTable};
use crate::text::TextMetrics;
use tracing::{debug, trace, warn};

/// Calculated layout information for a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub column_widths: Vec<f32>,
    /// Zero for tables without a header row
    pub header_height: f32,
    pub row_heights: Vec<f32>,
    pub total_width: f32,
}

impl TableLayout {
    /// Header plus every body row
    pub fn total_height(&self) -> f32 {
        self.header_height + self.row_heights.iter().sum::<f32>()
    }
}

/// Calculate the layout for a data table.
///
/// Column widths are resolved before row heights because wrapped cell text
/// depends on the width it wraps at.
pub fn calculate_layout(
    table: &DataTable,
    available_width: f32,
    config: &LayoutConfig,
) -> TableLayout {
    debug!(
        "Calculating layout for table with {} columns, {} rows",
        table.column_count(),
        table.rows.len()
    );

    let column_widths = resolve_column_widths(
        table.column_hints.as_deref(),
        table.column_count(),
        available_width,
    );

    for column in narrow_columns(&column_widths, config) {
        warn!(
            column,
            width = column_widths[column],
            "Column is too narrow to wrap text; cell content will overflow"
        );
    }

    let header_height = row_height(
        table.header.iter().map(String::as_str),
        &column_widths,
        config,
    );
    let row_heights = table
        .rows
        .iter()
        .map(|row| row_height(row.iter().map(String::as_str), &column_widths, config))
        .collect::<Vec<_>>();

    let total_width = column_widths.iter().sum();
    trace!("Calculated row heights: {:?}", row_heights);

    TableLayout {
        column_widths,
        header_height,
        row_heights,
        total_width,
    }
}

/// Layout of a key/value grid: fixed label/value split, no header row
pub fn key_value_layout(
    table: &KeyValueTable,
    available_width: f32,
    config: &LayoutConfig,
) -> TableLayout {
    let label_width = available_width * KEY_COLUMN_SHARE;
    let column_widths = vec![label_width, available_width - label_width];

    let row_heights = table
        .rows
        .iter()
        .map(|(label, value)| {
            row_height(
                [label.as_str(), value.as_str()].into_iter(),
                &column_widths,
                config,
            )
        })
        .collect();

    TableLayout {
        column_widths,
        header_height: 0.0,
        row_heights,
        total_width: available_width,
    }
}

/// Resolve column widths from optional hints.
///
/// Without hints the width is split evenly. With hints, fixed and
/// percentage columns are resolved first and auto columns share what is
/// left. A result wider than the available width is scaled down to fit.
pub fn resolve_column_widths(
    hints: Option<&[ColumnHint]>,
    column_count: usize,
    available_width: f32,
) -> Vec<f32> {
    if column_count == 0 {
        return Vec::new();
    }

    let Some(hints) = hints else {
        return vec![available_width / column_count as f32; column_count];
    };

    let mut resolved_widths = vec![0.0; column_count];
    let mut claimed = 0.0;
    let mut auto_columns = Vec::new();

    for (i, hint) in hints.iter().take(column_count).enumerate() {
        match hint.width {
            ColumnWidth::Points(width) => {
                resolved_widths[i] = width.max(MIN_COLUMN_WIDTH);
            }
            ColumnWidth::Percentage(percent) => {
                resolved_widths[i] = (available_width * percent / 100.0).max(MIN_COLUMN_WIDTH);
            }
            ColumnWidth::Auto => {
                auto_columns.push(i);
                continue;
            }
        }
        claimed += resolved_widths[i];
    }
    // Columns without a hint behave as auto
    auto_columns.extend(hints.len()..column_count);

    if !auto_columns.is_empty() {
        let share = ((available_width - claimed) / auto_columns.len() as f32).max(MIN_COLUMN_WIDTH);
        for &col in &auto_columns {
            resolved_widths[col] = share;
        }
    }

    let total: f32 = resolved_widths.iter().sum();
    if total > available_width {
        let scale = available_width / total;
        for width in &mut resolved_widths {
            *width *= scale;
        }
    }

    trace!("Resolved column widths: {:?}", resolved_widths);
    resolved_widths
}

/// Indexes of columns whose padded text width cannot hold one character.
/// Text in these columns is not wrapped.
pub(crate) fn narrow_columns(column_widths: &[f32], config: &LayoutConfig) -> Vec<usize> {
    let metrics = TextMetrics::from_config(config);
    let char_width = metrics.text_width("M", config.base_font_size);
    column_widths
        .iter()
        .enumerate()
        .filter(|(_, width)| *width - config.cell_padding.horizontal() < char_width)
        .map(|(column, _)| column)
        .collect()
}

/// Height of one row: the tallest wrapped cell plus vertical padding.
///
/// Taking the maximum across cells keeps every cell's content unclipped.
pub fn row_height<'a>(
    cells: impl Iterator<Item = &'a str>,
    column_widths: &[f32],
    config: &LayoutConfig,
) -> f32 {
    let metrics = TextMetrics::from_config(config);
    let font_size = config.base_font_size;
    let padding = config.cell_padding;

    let tallest = cells
        .zip(column_widths)
        .map(|(text, width)| {
            metrics.wrapped_height(text, width - padding.horizontal(), font_size)
        })
        .fold(metrics.line_height(font_size), f32::max);

    tallest + padding.vertical()
}
