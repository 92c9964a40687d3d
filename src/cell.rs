//! Raw spreadsheet cells and the single numeric coercion path.

use serde::Serialize;

/// One worksheet cell as read from a source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

/// A worksheet: rows of cells, row 0 being the first row of the sheet.
pub type Grid = Vec<Vec<Cell>>;

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(s) if !s.trim().is_empty())
    }
}

/// Coerces a cell to a finite number.
///
/// Text is trimmed and a comma decimal separator is normalized to a dot
/// (`"12,5"` -> `12.5`). Numbers pass through. Anything that does not end
/// up finite yields `None`.
pub fn coerce_number(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(n) => *n,
        Cell::Text(s) => {
            let normalized = s.trim().replace(',', ".");
            if normalized.is_empty() {
                return None;
            }
            normalized.parse::<f64>().ok()?
        }
    };

    value.is_finite().then_some(value)
}

/// Renders a cell as trimmed text. Whole numbers drop their fraction.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Joins the non-empty cells of a row with spaces, whitespace-collapsed.
pub fn join_row(row: &[Cell]) -> String {
    let joined = row
        .iter()
        .filter(|c| !c.is_empty())
        .map(cell_text)
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Returns the row without its trailing empty cells.
pub fn trim_trailing_empty(row: &[Cell]) -> &[Cell] {
    let end = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    &row[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_coerce_comma_decimal() {
        assert_eq!(coerce_number(&text("12,5")), Some(12.5));
        assert_eq!(coerce_number(&text(" 9.75 ")), Some(9.75));
    }

    #[test]
    fn test_coerce_number_passthrough() {
        assert_eq!(coerce_number(&Cell::Number(14.0)), Some(14.0));
    }

    #[test]
    fn test_coerce_rejects_non_numeric_and_non_finite() {
        assert_eq!(coerce_number(&Cell::Empty), None);
        assert_eq!(coerce_number(&text("")), None);
        assert_eq!(coerce_number(&text("غائب")), None);
        assert_eq!(coerce_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(coerce_number(&text("inf")), None);
    }

    #[test]
    fn test_cell_text_whole_numbers() {
        assert_eq!(cell_text(&Cell::Number(3.0)), "3");
        assert_eq!(cell_text(&Cell::Number(3.5)), "3.5");
        assert_eq!(cell_text(&text("  hello ")), "hello");
    }

    #[test]
    fn test_join_row_collapses_whitespace() {
        let row = vec![text("مديرية  التربية"), Cell::Empty, text(" لولاية\tالجزائر ")];
        assert_eq!(join_row(&row), "مديرية التربية لولاية الجزائر");
    }

    #[test]
    fn test_trim_trailing_empty() {
        let row = vec![text("a"), Cell::Empty, text("b"), Cell::Empty, text("  ")];
        assert_eq!(trim_trailing_empty(&row).len(), 3);
        assert!(trim_trailing_empty(&[Cell::Empty]).is_empty());
    }
}
