//! Turns one loosely-structured grade sheet into normalized records.
//!
//! The sheet has no declared schema: metadata sits in free-text rows at
//! fixed positions, the header row is found by keyword, and the number of
//! subject columns is read from the header.

pub mod header;
pub mod metadata;
pub mod records;

use tracing::{debug, info};

use crate::cell::{Grid, trim_trailing_empty};
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::model::{ClassMetadata, Dataset, Student};

pub use metadata::{MetadataParser, PositionalMetadataParser};

/// How the sheet was read, for callers that want to inspect the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub header_row: usize,
    pub empty_rows_trimmed: usize,
    pub summary_row_dropped: bool,
    pub candidate_subjects: usize,
}

/// Result of ingesting one sheet.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub students: Vec<Student>,
    pub subjects: Vec<String>,
    pub metadata: ClassMetadata,
    pub report: IngestReport,
}

impl ParsedSheet {
    pub fn into_dataset(self) -> Dataset {
        Dataset::new(self.students, self.subjects, self.metadata)
    }
}

pub struct SpreadsheetIngestor {
    config: IngestConfig,
    metadata: Box<dyn MetadataParser>,
}

impl Default for SpreadsheetIngestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl SpreadsheetIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            metadata: Box::new(PositionalMetadataParser),
        }
    }

    /// Swaps the metadata heuristic for another layout.
    pub fn with_metadata_parser(mut self, parser: impl MetadataParser + 'static) -> Self {
        self.metadata = Box::new(parser);
        self
    }

    /// Parses one grid.
    ///
    /// # Errors
    ///
    /// [`IngestError::EmptyInput`] for a grid without rows,
    /// [`IngestError::UnsupportedHeader`] when the header row has fewer than
    /// three cells, [`IngestError::InsufficientData`] when no student row
    /// survives pruning.
    pub fn ingest(&self, grid: &Grid) -> Result<ParsedSheet, IngestError> {
        if grid.is_empty() {
            return Err(IngestError::EmptyInput);
        }

        let metadata = self.metadata.parse(grid);

        let header_row = header::detect_header_row(grid, &self.config);
        let header = trim_trailing_empty(&grid[header_row]);
        if header.len() < 3 {
            return Err(IngestError::UnsupportedHeader {
                cells: header.len(),
            });
        }

        let pruned = header::prune_trailing_rows(&grid[header_row..], &self.config);
        let data_rows = &grid[header_row + 1..header_row + pruned.end];
        if data_rows.is_empty() {
            return Err(IngestError::InsufficientData { header_row });
        }

        let candidates = records::subject_candidates(header);
        let average_col = records::average_column(header);
        let mut students =
            records::build_students(data_rows, &candidates, average_col, &self.config);
        if students.is_empty() {
            return Err(IngestError::InsufficientData { header_row });
        }

        let subjects = records::retain_active_subjects(&mut students, &candidates);

        debug!(
            header_row,
            empty_rows_trimmed = pruned.empty_rows_trimmed,
            summary_row_dropped = pruned.summary_row_dropped,
            candidates = candidates.len(),
            "Sheet layout resolved"
        );
        info!(
            class = %metadata.class_name,
            students = students.len(),
            subjects = subjects.len(),
            dropped_subjects = candidates.len() - subjects.len(),
            "Sheet ingested"
        );

        Ok(ParsedSheet {
            students,
            subjects,
            metadata,
            report: IngestReport {
                header_row,
                empty_rows_trimmed: pruned.empty_rows_trimmed,
                summary_row_dropped: pruned.summary_row_dropped,
                candidate_subjects: candidates.len(),
            },
        })
    }
}
