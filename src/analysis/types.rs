//! Statistic views handed to the reporting layer.

use std::collections::BTreeMap;

use serde::Serialize;

/// Where a subject average sits relative to the class's semester average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Above,
    Below,
    Equal,
}

/// Grade counts per band: `< 8`, `8..10`, `10..15`, `>= 15`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub under_8: usize,
    pub from_8_to_10: usize,
    pub from_10_to_15: usize,
    pub from_15: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStats {
    pub subject: String,
    /// Students holding a grade in the subject.
    pub graded: usize,
    pub average: f64,
    pub pass_rate: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub mode: f64,
    pub distribution: Distribution,
    /// Grades `>= 10`.
    pub passed: usize,
    pub comparison: Comparison,
}

/// Statistics over the students' semester-average column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub students: usize,
    pub average: f64,
    pub pass_rate: f64,
    pub std_dev: f64,
    pub mode: f64,
    pub passed: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderStats {
    pub count: usize,
    pub passed: usize,
    pub success_rate: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub passed: usize,
    pub overall_success_rate: f64,
    pub by_gender: BTreeMap<String, GenderStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionalSubjectStats {
    pub subject: String,
    pub count: usize,
    pub average: f64,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralSubjectStats {
    pub subject: String,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Grades `>= 15`.
    pub excellent: usize,
    /// Grades `< 10`.
    pub failing: usize,
    pub graded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub by_gender: BTreeMap<String, usize>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
    pub graded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeaterStats {
    pub repeaters: GroupStats,
    pub non_repeaters: GroupStats,
    pub repeater_success_rate: f64,
    /// Averages among repeaters only, weakest subject first.
    pub repeater_subjects: Vec<SubjectAverage>,
}

/// The table form of a subject's grade distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub subject: String,
    pub graded: usize,
    pub distribution: Distribution,
    pub passed: usize,
    pub pass_rate: f64,
}

/// Pairwise Pearson correlation between active subjects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub subjects: Vec<String>,
    /// `matrix[i][j]` correlates `subjects[i]` with `subjects[j]`.
    pub matrix: Vec<Vec<f64>>,
    /// Each subject against the semester average.
    pub with_semester_average: Vec<f64>,
}

/// One origin class of an aggregated dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassGroupStats {
    pub class: String,
    pub students: usize,
    pub average: f64,
    pub std_dev: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStudent {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub source_class: Option<String>,
    pub semester_average: f64,
}
