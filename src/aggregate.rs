//! Merging several per-class sheets of one level and stream.

use tracing::{info, warn};

use crate::cell::{Grid, collapse_whitespace};
use crate::error::IngestError;
use crate::ingest::{ParsedSheet, SpreadsheetIngestor};
use crate::model::{ClassMetadata, Dataset, Student};

/// Class-number marker of an aggregated dataset.
pub const ALL_CLASSES: &str = "all classes";

/// Accumulates sheets one at a time.
///
/// [`add`](Self::add) consumes the aggregator, so after a failure there is
/// nothing left to finish: a batch either merges completely or not at all.
pub struct Aggregator<'a> {
    ingestor: &'a SpreadsheetIngestor,
    first: Option<(ClassMetadata, Vec<String>)>,
    students: Vec<Student>,
    files: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(ingestor: &'a SpreadsheetIngestor) -> Self {
        Self {
            ingestor,
            first: None,
            students: Vec::new(),
            files: 0,
        }
    }

    /// Ingests one more file and validates it against the first one.
    ///
    /// # Errors
    ///
    /// Any ingestion error of the file, or [`IngestError::MetadataMismatch`]
    /// when its level or stream differs from the first file's.
    pub fn add(mut self, source_name: &str, grid: &Grid) -> Result<Self, IngestError> {
        let ParsedSheet {
            students,
            subjects,
            metadata,
            ..
        } = self.ingestor.ingest(grid)?;

        match &self.first {
            None => self.first = Some((metadata.clone(), subjects)),
            Some((first, first_subjects)) => {
                check_field(source_name, "level", &first.level, &metadata.level)?;
                check_field(source_name, "stream", &first.stream, &metadata.stream)?;
                let missing = first_subjects.iter().filter(|s| !subjects.contains(s)).count();
                if missing > 0 {
                    warn!(file = source_name, missing, "File lacks subjects of the first file");
                }
            }
        }

        let file_index = self.files;
        let count = students.len();
        let active: &[String] = self.first.as_ref().map(|(_, s)| s.as_slice()).unwrap_or_default();
        self.students
            .extend(students.into_iter().enumerate().map(|(i, mut student)| {
                student.id = format!("f{file_index}-s{i}");
                student.source_class = Some(metadata.class_number.clone());
                // merged subjects are the first file's
                student.grades.retain(|subject, _| active.contains(subject));
                student
            }));
        self.files += 1;

        info!(
            file = source_name,
            file_index,
            students = count,
            class = %metadata.class_name,
            "File merged"
        );
        Ok(self)
    }

    pub fn files(&self) -> usize {
        self.files
    }

    /// Builds the merged dataset, `None` when no file was added.
    ///
    /// The first file's subject list is kept as the merged subject set.
    pub fn finish(self) -> Option<Dataset> {
        let (first, subjects) = self.first?;

        let mut metadata = ClassMetadata {
            class_number: ALL_CLASSES.to_string(),
            is_aggregated: true,
            ..first
        };
        metadata.class_name =
            collapse_whitespace(&format!("{} {} ({ALL_CLASSES})", metadata.level, metadata.stream));

        Some(Dataset::new(self.students, subjects, metadata))
    }
}

fn check_field(file: &str, field: &'static str, expected: &str, found: &str) -> Result<(), IngestError> {
    if expected == found {
        return Ok(());
    }
    Err(IngestError::MetadataMismatch {
        file: file.to_string(),
        field,
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

/// Aggregates named grids in order, stopping at the first failure.
///
/// A single grid still yields an aggregated dataset; callers wanting the
/// plain single-class view use [`SpreadsheetIngestor::ingest`].
pub fn aggregate<'g>(
    ingestor: &SpreadsheetIngestor,
    sheets: impl IntoIterator<Item = (&'g str, &'g Grid)>,
) -> Result<Dataset, IngestError> {
    let mut aggregator = Aggregator::new(ingestor);
    for (name, grid) in sheets {
        aggregator = aggregator.add(name, grid)?;
    }
    aggregator.finish().ok_or(IngestError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::class_sheet;
    use std::collections::HashSet;

    fn students(n: usize) -> Vec<(&'static str, &'static str, bool, Vec<f64>, f64)> {
        (0..n)
            .map(|i| ("طالب", if i % 2 == 0 { "ذكر" } else { "أنثى" }, false, vec![11.0, 9.0], 10.5))
            .collect()
    }

    fn line(level: &str, class: &str) -> String {
        format!("كشف النقاط الفصل الأول 2023-2024 {level} جذع مشترك علوم القسم {class}")
    }

    #[test]
    fn test_ids_unique_across_files() {
        let a = class_sheet(&line("أولى ثانوي", "1"), &["math", "physics"], &students(30));
        let b = class_sheet(&line("أولى ثانوي", "2"), &["math", "physics"], &students(25));

        let dataset = aggregate(&SpreadsheetIngestor::default(), [("a.xlsx", &a), ("b.xlsx", &b)]).unwrap();

        assert_eq!(dataset.students().len(), 55);
        let ids: HashSet<_> = dataset.students().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 55);
        assert!(ids.contains("f0-s0") && ids.contains("f0-s29"));
        assert!(ids.contains("f1-s0") && ids.contains("f1-s24"));
        assert_eq!(dataset.students()[30].source_class.as_deref(), Some("2"));
    }

    #[test]
    fn test_aggregated_metadata() {
        let a = class_sheet(&line("أولى ثانوي", "1"), &["math", "physics"], &students(3));
        let b = class_sheet(&line("أولى ثانوي", "4"), &["math"], &students(3));

        let dataset = aggregate(&SpreadsheetIngestor::default(), [("a", &a), ("b", &b)]).unwrap();
        let meta = dataset.metadata();

        assert!(meta.is_aggregated);
        assert_eq!(meta.class_number, ALL_CLASSES);
        assert_eq!(meta.class_name, "أولى ثانوي جذع مشترك علوم (all classes)");
        assert_eq!(meta.school_year, "2023-2024");
        assert_eq!(dataset.subjects(), ["math".to_string(), "physics".to_string()]);
    }

    #[test]
    fn test_later_file_grades_limited_to_first_file_subjects() {
        let a = class_sheet(
            &line("أولى ثانوي", "1"),
            &["math", "music"],
            &[("أ", "ذكر", false, vec![12.0, 0.0], 12.0), ("ب", "أنثى", false, vec![9.0, 0.0], 9.0)],
        );
        let b = class_sheet(
            &line("أولى ثانوي", "2"),
            &["math", "music"],
            &[("ج", "ذكر", false, vec![12.0, 15.0], 13.0)],
        );

        let dataset = aggregate(&SpreadsheetIngestor::default(), [("a", &a), ("b", &b)]).unwrap();

        assert_eq!(dataset.subjects(), ["math".to_string()]);
        for student in dataset.students() {
            assert!(student.grades.keys().all(|k| dataset.subjects().contains(k)));
        }
        let later = &dataset.students()[2];
        assert_eq!(later.id, "f1-s0");
        assert_eq!(later.grade("math"), Some(12.0));
        assert_eq!(later.grade("music"), None);
    }

    #[test]
    fn test_level_mismatch_aborts_whole_batch() {
        let a = class_sheet(&line("1AS x", "1"), &["math"], &students(4));
        let b = class_sheet(&line("2AS x", "2"), &["math"], &students(4));

        let err = aggregate(&SpreadsheetIngestor::default(), [("a.xlsx", &a), ("b.xlsx", &b)]).unwrap_err();
        match err {
            IngestError::MetadataMismatch { file, field, expected, found } => {
                assert_eq!(file, "b.xlsx");
                assert_eq!(field, "level");
                assert_eq!(expected, "1AS x");
                assert_eq!(found, "2AS x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stream_mismatch() {
        let a = class_sheet(&line("أولى ثانوي", "1"), &["math"], &students(2));
        let b = class_sheet(
            "كشف النقاط الفصل الأول 2023-2024 أولى ثانوي جذع مشترك آداب القسم 2",
            &["math"],
            &students(2),
        );

        let err = aggregate(&SpreadsheetIngestor::default(), [("a", &a), ("b", &b)]).unwrap_err();
        assert!(matches!(err, IngestError::MetadataMismatch { field: "stream", .. }));
    }

    #[test]
    fn test_ingestion_error_of_later_file_propagates() {
        let a = class_sheet(&line("أولى ثانوي", "1"), &["math"], &students(2));
        let empty: Grid = vec![];

        let err = aggregate(&SpreadsheetIngestor::default(), [("a", &a), ("empty", &empty)]).unwrap_err();
        assert!(matches!(err, IngestError::EmptyInput));
    }

    #[test]
    fn test_no_files() {
        let ingestor = SpreadsheetIngestor::default();
        assert!(Aggregator::new(&ingestor).finish().is_none());
        assert!(aggregate(&ingestor, Vec::<(&str, &Grid)>::new()).is_err());
    }
}
