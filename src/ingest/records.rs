//! Student rows and active-subject filtering.

use std::collections::{BTreeMap, HashSet};

use crate::cell::{Cell, cell_text, coerce_number};
use crate::config::IngestConfig;
use crate::model::Student;

const NAME_COL: usize = 1;
const GENDER_COL: usize = 3;
const REPEATER_COL: usize = 4;
/// First grade column; subjects follow in header order.
pub const FIRST_GRADE_COL: usize = 5;

/// A subject column announced by the header.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectColumn {
    pub name: String,
    pub col: usize,
}

/// Header cells from column 5 up to, not including, the last header cell,
/// which labels the semester average. Blank and repeated labels are skipped.
pub fn subject_candidates(header: &[Cell]) -> Vec<SubjectColumn> {
    if header.len() <= FIRST_GRADE_COL {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    header[FIRST_GRADE_COL..header.len() - 1]
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let name = cell_text(cell);
            (!name.is_empty() && seen.insert(name.clone())).then(|| SubjectColumn {
                name,
                col: FIRST_GRADE_COL + i,
            })
        })
        .collect()
}

/// Column holding the semester average: the last header cell, never left of
/// the grade area.
pub fn average_column(header: &[Cell]) -> usize {
    header.len().saturating_sub(1).max(FIRST_GRADE_COL)
}

/// Builds one [`Student`] per row that carries a name.
pub fn build_students(
    rows: &[Vec<Cell>],
    subjects: &[SubjectColumn],
    average_col: usize,
    config: &IngestConfig,
) -> Vec<Student> {
    let markers: Vec<String> = config
        .repeater_markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .collect();

    rows.iter()
        .filter_map(|row| {
            let name = row.get(NAME_COL).map(cell_text).unwrap_or_default();
            if name.is_empty() {
                return None;
            }

            let gender = row
                .get(GENDER_COL)
                .map(cell_text)
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| config.default_gender.clone());

            let is_repeater = row
                .get(REPEATER_COL)
                .map(|c| cell_text(c).to_lowercase())
                .is_some_and(|v| markers.contains(&v));

            let grades: BTreeMap<String, f64> = subjects
                .iter()
                .filter_map(|s| {
                    let grade = row.get(s.col).and_then(coerce_number)?;
                    Some((s.name.clone(), grade))
                })
                .collect();

            let semester_average = row.get(average_col).and_then(coerce_number).unwrap_or(0.0);

            Some(Student {
                id: String::new(),
                name,
                gender,
                grades,
                semester_average,
                is_repeater,
                source_class: None,
                original_row: row.clone(),
            })
        })
        .enumerate()
        .map(|(i, mut student)| {
            student.id = format!("s{i}");
            student
        })
        .collect()
}

/// Keeps the candidates somebody holds a positive grade in, in column order,
/// and strips grades for the dropped subjects from every student.
pub fn retain_active_subjects(
    students: &mut [Student],
    candidates: &[SubjectColumn],
) -> Vec<String> {
    let active: Vec<String> = candidates
        .iter()
        .filter(|s| {
            students
                .iter()
                .any(|st| st.grade(&s.name).is_some_and(|g| g > 0.0))
        })
        .map(|s| s.name.clone())
        .collect();

    for student in students.iter_mut() {
        student.grades.retain(|subject, _| active.contains(subject));
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn header() -> Vec<Cell> {
        ["رقم", "الاسم", "الميلاد", "الجنس", "معيد", "رياضيات", "فيزياء", "معدل"]
            .iter()
            .map(|s| text(s))
            .collect()
    }

    #[test]
    fn test_candidates_exclude_average_column() {
        let candidates = subject_candidates(&header());
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["رياضيات", "فيزياء"]);
        assert_eq!(candidates[1].col, 6);
        assert_eq!(average_column(&header()), 7);
    }

    #[test]
    fn test_candidates_need_more_than_five_cells() {
        let short: Vec<Cell> = header().into_iter().take(5).collect();
        assert!(subject_candidates(&short).is_empty());
        assert_eq!(average_column(&short), FIRST_GRADE_COL);
    }

    #[test]
    fn test_build_students_coerces_and_defaults() {
        let rows = vec![
            vec![
                Cell::Number(1.0),
                text("أمينة"),
                Cell::Empty,
                Cell::Empty,
                text("نعم"),
                text("12,5"),
                text("ABS"),
                text("11,75"),
            ],
            vec![Cell::Number(2.0), Cell::Empty, Cell::Empty, text("ذكر")],
            vec![
                Cell::Number(3.0),
                text("Karim"),
                Cell::Empty,
                text("ذكر"),
                text("لا"),
                Cell::Number(8.0),
                Cell::Number(14.0),
            ],
        ];
        let config = IngestConfig::default();
        let students = build_students(&rows, &subject_candidates(&header()), 7, &config);

        assert_eq!(students.len(), 2);
        let first = &students[0];
        assert_eq!(first.id, "s0");
        assert_eq!(first.gender, "unspecified");
        assert!(first.is_repeater);
        assert_eq!(first.grade("رياضيات"), Some(12.5));
        assert_eq!(first.grade("فيزياء"), None);
        assert_eq!(first.semester_average, 11.75);

        let second = &students[1];
        assert_eq!(second.id, "s1");
        assert!(!second.is_repeater);
        assert_eq!(second.grades.len(), 2);
        assert_eq!(second.semester_average, 0.0);
        assert_eq!(second.original_row.len(), 7);
    }

    #[test]
    fn test_repeater_marker_is_case_insensitive() {
        let rows = vec![vec![
            Cell::Empty,
            text("Lina"),
            Cell::Empty,
            text("F"),
            text(" YES "),
        ]];
        let students = build_students(&rows, &[], 5, &IngestConfig::default());
        assert!(students[0].is_repeater);
    }

    #[test]
    fn test_subject_with_only_zero_or_missing_grades_is_dropped() {
        let rows = vec![
            vec![Cell::Empty, text("a"), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Number(0.0), Cell::Number(9.0), Cell::Number(9.0)],
            vec![Cell::Empty, text("b"), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Number(11.0), Cell::Number(11.0)],
        ];
        let candidates = subject_candidates(&header());
        let mut students = build_students(&rows, &candidates, 7, &IngestConfig::default());
        let active = retain_active_subjects(&mut students, &candidates);

        assert_eq!(active, vec!["فيزياء".to_string()]);
        assert!(students[0].grade("رياضيات").is_none());
        assert!(students.iter().all(|s| s.grades.keys().all(|k| active.contains(k))));
    }
}
