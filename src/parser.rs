//! Decodes raw file bytes into a [`Grid`].
//!
//! Workbooks (xlsx, xls, xlsb, ods) go through `calamine` and only the first
//! worksheet is read. CSV goes through `csv`.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::cell::{Cell, Grid};
use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl SourceFormat {
    /// Picks the format from the file extension, falling back to the
    /// leading bytes (zip or OLE container means a workbook).
    pub fn detect(source_name: &str, bytes: &[u8]) -> Self {
        let ext = source_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => SourceFormat::Csv,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => SourceFormat::Workbook,
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => {
                SourceFormat::Workbook
            }
            _ => SourceFormat::Csv,
        }
    }
}

/// Decodes `bytes` into the first worksheet's grid.
///
/// Row and column indexes match the sheet: a workbook whose used range
/// starts below A1 is padded with empty cells.
///
/// # Errors
///
/// [`IngestError::UnreadableSheet`] if the bytes are not a readable
/// workbook or CSV file.
pub fn parse_grid(source_name: &str, bytes: &[u8]) -> Result<Grid, IngestError> {
    let format = SourceFormat::detect(source_name, bytes);
    debug!(source = source_name, ?format, bytes = bytes.len(), "Decoding grid");

    let unreadable = |reason: String| IngestError::UnreadableSheet {
        source_name: source_name.to_string(),
        reason,
    };

    match format {
        SourceFormat::Workbook => parse_workbook(bytes).map_err(unreadable),
        SourceFormat::Csv => parse_csv(bytes).map_err(unreadable),
    }
}

fn parse_workbook(bytes: &[u8]) -> Result<Grid, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("failed to open workbook: {e}"))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("failed to read sheet '{sheet_name}': {e}"))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        grid.push(cells);
    }

    Ok(grid)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Grid, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Grid::new();
    // newlines inside quoted fields advance the line count without starting a row
    let mut embedded_newlines = 0u64;
    for result in rdr.records() {
        let record = result.map_err(|e| format!("invalid CSV: {e}"))?;

        // the reader skips blank lines, and a record's position is taken before
        // the skip; count them back so row indexes match the sheet
        if let Some(pos) = record.position() {
            let skipped = bytes
                .get(pos.byte() as usize..)
                .unwrap_or_default()
                .iter()
                .take_while(|b| matches!(b, b'\r' | b'\n'))
                .filter(|&&b| b == b'\n')
                .count() as u64;
            let row = (pos.line().saturating_sub(1) + skipped).saturating_sub(embedded_newlines);
            while grid.len() < row as usize {
                grid.push(Vec::new());
            }
        }
        embedded_newlines += record
            .iter()
            .map(|field| field.matches('\n').count() as u64)
            .sum::<u64>();

        grid.push(record.iter().map(csv_field_to_cell).collect());
    }

    Ok(grid)
}

/// Plain dot-decimal numbers become numeric cells; everything else, comma
/// decimals included, stays text for the grade coercion to handle.
fn csv_field_to_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(field.to_string()),
    }
}
