//! Header-row detection and trailing-row pruning.

use tracing::debug;

use crate::cell::{Cell, cell_text, join_row};
use crate::config::{IngestConfig, TrailingRowPolicy};

/// Header row used when no keyword matches, provided it holds some text.
const FALLBACK_HEADER_ROW: usize = 5;
/// How many leading cells of a row are searched for a name keyword.
const HEADER_KEYWORD_CELLS: usize = 10;
/// How many leading cells of a row are searched for a summary keyword.
const SUMMARY_KEYWORD_CELLS: usize = 5;

/// Finds the header row index.
///
/// The first of the leading `header_scan_rows` rows whose first ten cells
/// mention a name-column keyword wins. Otherwise row 5 is used when it holds
/// at least one text cell, else row 0.
pub fn detect_header_row(grid: &[Vec<Cell>], config: &IngestConfig) -> usize {
    let found = grid
        .iter()
        .take(config.header_scan_rows)
        .position(|row| {
            let end = row.len().min(HEADER_KEYWORD_CELLS);
            let text = join_row(&row[..end]).to_lowercase();
            config
                .header_keywords
                .iter()
                .any(|k| text.contains(&k.to_lowercase()))
        });

    if let Some(index) = found {
        debug!(header_row = index, "Header row matched by keyword");
        return index;
    }

    let fallback = match grid.get(FALLBACK_HEADER_ROW) {
        Some(row) if row.iter().any(Cell::is_text) => FALLBACK_HEADER_ROW,
        _ => 0,
    };
    debug!(header_row = fallback, "No header keyword found, using fallback row");
    fallback
}

/// Outcome of pruning the rows from the header onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pruned {
    /// Exclusive end of the kept rows, relative to the header row.
    pub end: usize,
    pub empty_rows_trimmed: usize,
    pub summary_row_dropped: bool,
}

/// Trims fully-empty trailing rows, then applies `policy` to the last
/// remaining row. `rows[0]` is the header and is never dropped.
pub fn prune_trailing_rows(rows: &[Vec<Cell>], config: &IngestConfig) -> Pruned {
    let mut end = rows.len();
    while end > 1 && rows[end - 1].iter().all(Cell::is_empty) {
        end -= 1;
    }
    let empty_rows_trimmed = rows.len() - end;

    let drop_last = end > 1
        && match config.trailing_rows {
            TrailingRowPolicy::Always => true,
            TrailingRowPolicy::SummaryOnly => is_summary_row(&rows[end - 1], config),
            TrailingRowPolicy::Never => false,
        };

    if drop_last {
        end -= 1;
    }

    Pruned {
        end,
        empty_rows_trimmed,
        summary_row_dropped: drop_last,
    }
}

/// A summary row carries no student name, or names itself with a summary
/// keyword in its leading cells.
pub fn is_summary_row(row: &[Cell], config: &IngestConfig) -> bool {
    if row.get(1).is_none_or(Cell::is_empty) {
        return true;
    }

    row.iter().take(SUMMARY_KEYWORD_CELLS).any(|cell| {
        let text = cell_text(cell).to_lowercase();
        config
            .summary_keywords
            .iter()
            .any(|k| text.contains(&k.to_lowercase()))
    })
}
