//! Class metadata recovered from the free-text rows above the header.
//!
//! The layout is positional and tied to the wording of the administration
//! software's export. Parsers never fail: unrecognized layouts leave fields
//! empty.

use crate::cell::{Grid, join_row};
use crate::model::ClassMetadata;

/// Extracts [`ClassMetadata`] from a raw grid.
pub trait MetadataParser: Send + Sync {
    fn parse(&self, grid: &Grid) -> ClassMetadata;
}

/// Parser for the standard semester-results export.
///
/// Grammar (0-based rows, whitespace-separated words `w`):
///
/// | Row | Content |
/// |-----|---------|
/// | 2   | directorate, all cells joined |
/// | 3   | school name, all cells joined |
/// | 4   | `w0 w1 SEM SEM YEAR LVL LVL [STREAM.. w(n-2)] CLASS` |
///
/// Row 4 needs at least 7 words, otherwise semester, year, level, stream and
/// class number stay empty. The stream is `w7..w(n-2)` and only exists
/// when there are more than 8 words.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionalMetadataParser;

const DIRECTORATE_ROW: usize = 2;
const SCHOOL_ROW: usize = 3;
const CLASS_LINE_ROW: usize = 4;
const MIN_CLASS_LINE_WORDS: usize = 7;

impl MetadataParser for PositionalMetadataParser {
    fn parse(&self, grid: &Grid) -> ClassMetadata {
        let row_text = |index: usize| grid.get(index).map(|r| join_row(r)).unwrap_or_default();

        let mut meta = ClassMetadata {
            directorate: row_text(DIRECTORATE_ROW),
            school_name: row_text(SCHOOL_ROW),
            ..Default::default()
        };

        let line = row_text(CLASS_LINE_ROW);
        let words: Vec<&str> = line.split_whitespace().collect();

        if words.len() >= MIN_CLASS_LINE_WORDS {
            let n = words.len();
            meta.semester = words[2..4].join(" ");
            meta.school_year = words[4].to_string();
            meta.level = words[5..7].join(" ");
            if n > 8 {
                meta.stream = words[7..n - 2].join(" ");
            }
            meta.class_number = words[n - 1].to_string();
        }

        meta.compose_class_name();
        meta
    }
}
