//! Normalized records produced by ingestion and consumed by the analysis views.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cell::Cell;

/// One student row after normalization.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    /// Unique within a loaded dataset.
    pub id: String,
    pub name: String,
    pub gender: String,
    /// Only subjects the student was graded in; keys are active subjects.
    pub grades: BTreeMap<String, f64>,
    /// Taken from the source's average column, never recomputed.
    pub semester_average: f64,
    pub is_repeater: bool,
    /// Class number of the file the student came from.
    pub source_class: Option<String>,
    pub original_row: Vec<Cell>,
}

impl Student {
    pub fn grade(&self, subject: &str) -> Option<f64> {
        self.grades.get(subject).copied()
    }
}

/// Best-effort descriptive fields. Empty strings mean "not recognized".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassMetadata {
    pub directorate: String,
    pub school_name: String,
    pub school_year: String,
    pub semester: String,
    pub level: String,
    pub stream: String,
    pub class_number: String,
    pub class_name: String,
    pub is_aggregated: bool,
}

impl ClassMetadata {
    /// `level stream classNumber`, trimmed and single-spaced.
    pub fn compose_class_name(&mut self) {
        self.class_name = crate::cell::collapse_whitespace(&format!(
            "{} {} {}",
            self.level, self.stream, self.class_number
        ));
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// An immutable ingested dataset.
///
/// Every construction draws a fresh `revision`, which the analysis cache uses
/// as the dataset's identity. Replacing the data means building a new
/// `Dataset`.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    students: Vec<Student>,
    subjects: Vec<String>,
    metadata: ClassMetadata,
    #[serde(skip)]
    revision: u64,
}

impl Dataset {
    pub fn new(students: Vec<Student>, subjects: Vec<String>, metadata: ClassMetadata) -> Self {
        Self {
            students,
            subjects,
            metadata,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Active subjects in source column order.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn metadata(&self) -> &ClassMetadata {
        &self.metadata
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
