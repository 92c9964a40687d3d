//! Pure view functions over `(students, subjects)`.
//!
//! Every view derives its pass counts and pass rates from the same grade
//! vector, so a subject's pass rate always equals `passed / graded * 100`
//! whichever view reports it.

use std::collections::BTreeMap;

use crate::analysis::types::{
    CategoryStats, ClassGroupStats, Comparison, CorrelationMatrix, Distribution, DistributionRow,
    GenderStats, GeneralSubjectStats, GlobalStats, GroupStats, OptionalSubjectStats,
    RankedStudent, RepeaterStats, SubjectAverage, SubjectStats,
};
use crate::model::Student;
use crate::stats::{
    PASS_THRESHOLD, average, coefficient_of_variation, correlation, count_at_least, count_below,
    max, min, mode, pass_percentage, pct, standard_deviation,
};

const WEAK_THRESHOLD: f64 = 8.0;
const EXCELLENT_THRESHOLD: f64 = 15.0;

/// Grades of students graded in `subject`, in student order.
pub fn subject_grades<'a>(students: impl IntoIterator<Item = &'a Student>, subject: &str) -> Vec<f64> {
    students.into_iter().filter_map(|s| s.grade(subject)).collect()
}

pub fn semester_averages(students: &[Student]) -> Vec<f64> {
    students.iter().map(|s| s.semester_average).collect()
}

pub fn distribution(grades: &[f64]) -> Distribution {
    let mut d = Distribution::default();
    for &g in grades {
        if g < WEAK_THRESHOLD {
            d.under_8 += 1;
        } else if g < PASS_THRESHOLD {
            d.from_8_to_10 += 1;
        } else if g < EXCELLENT_THRESHOLD {
            d.from_10_to_15 += 1;
        } else {
            d.from_15 += 1;
        }
    }
    d
}

fn compare(value: f64, reference: f64) -> Comparison {
    if value > reference {
        Comparison::Above
    } else if value < reference {
        Comparison::Below
    } else {
        Comparison::Equal
    }
}

pub fn subject_analysis(students: &[Student], subjects: &[String]) -> Vec<SubjectStats> {
    let class_average = average(&semester_averages(students));

    subjects
        .iter()
        .map(|subject| {
            let grades = subject_grades(students, subject);
            let avg = average(&grades);
            let std_dev = standard_deviation(&grades);

            SubjectStats {
                subject: subject.clone(),
                graded: grades.len(),
                average: avg,
                pass_rate: pass_percentage(&grades, PASS_THRESHOLD),
                std_dev,
                coefficient_of_variation: coefficient_of_variation(avg, std_dev),
                mode: mode(&grades),
                distribution: distribution(&grades),
                passed: count_at_least(&grades, PASS_THRESHOLD),
                comparison: compare(avg, class_average),
            }
        })
        .collect()
}

pub fn global_semester_stats(students: &[Student]) -> GlobalStats {
    let averages = semester_averages(students);

    GlobalStats {
        students: averages.len(),
        average: average(&averages),
        pass_rate: pass_percentage(&averages, PASS_THRESHOLD),
        std_dev: standard_deviation(&averages),
        mode: mode(&averages),
        passed: count_at_least(&averages, PASS_THRESHOLD),
        min: min(&averages),
        max: max(&averages),
    }
}

/// Headcounts and success rates, overall and per gender label.
pub fn category_global_stats(students: &[Student]) -> CategoryStats {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for s in students {
        groups
            .entry(s.gender.clone())
            .or_default()
            .push(s.semester_average);
    }

    let by_gender = groups
        .into_iter()
        .map(|(gender, averages)| {
            let passed = count_at_least(&averages, PASS_THRESHOLD);
            let stats = GenderStats {
                count: averages.len(),
                passed,
                success_rate: pct(passed, averages.len()),
                average: average(&averages),
            };
            (gender, stats)
        })
        .collect();

    let passed = students
        .iter()
        .filter(|s| s.semester_average >= PASS_THRESHOLD)
        .count();

    CategoryStats {
        total: students.len(),
        passed,
        overall_success_rate: pct(passed, students.len()),
        by_gender,
    }
}

/// Designated optional subjects that are active, among students graded in them.
pub fn optional_subjects_stats(
    students: &[Student],
    subjects: &[String],
    optional: &[String],
) -> Vec<OptionalSubjectStats> {
    optional
        .iter()
        .filter(|o| subjects.contains(o))
        .map(|subject| {
            let grades = subject_grades(students, subject);
            OptionalSubjectStats {
                subject: subject.clone(),
                count: grades.len(),
                average: average(&grades),
                pass_rate: pass_percentage(&grades, PASS_THRESHOLD),
            }
        })
        .collect()
}

pub fn general_subject_summary(
    students: &[Student],
    subjects: &[String],
) -> Vec<GeneralSubjectStats> {
    subjects
        .iter()
        .map(|subject| {
            let grades = subject_grades(students, subject);
            GeneralSubjectStats {
                subject: subject.clone(),
                average: average(&grades),
                max: max(&grades),
                min: min(&grades),
                excellent: count_at_least(&grades, EXCELLENT_THRESHOLD),
                failing: count_below(&grades, PASS_THRESHOLD),
                graded: grades.len(),
            }
        })
        .collect()
}

fn group_stats<'a>(students: impl Iterator<Item = &'a Student>) -> (GroupStats, Vec<f64>) {
    let mut group = GroupStats::default();
    let mut averages = Vec::new();
    for s in students {
        group.count += 1;
        *group.by_gender.entry(s.gender.clone()).or_default() += 1;
        averages.push(s.semester_average);
    }
    group.average = average(&averages);
    (group, averages)
}

pub fn repeater_stats(students: &[Student], subjects: &[String]) -> RepeaterStats {
    let repeaters: Vec<&Student> = students.iter().filter(|s| s.is_repeater).collect();
    let (repeater_group, repeater_averages) = group_stats(repeaters.iter().copied());
    let (non_repeater_group, _) = group_stats(students.iter().filter(|s| !s.is_repeater));

    let mut repeater_subjects: Vec<SubjectAverage> = subjects
        .iter()
        .filter_map(|subject| {
            let grades = subject_grades(repeaters.iter().copied(), subject);
            (!grades.is_empty()).then(|| SubjectAverage {
                subject: subject.clone(),
                average: average(&grades),
                graded: grades.len(),
            })
        })
        .collect();
    repeater_subjects.sort_by(|a, b| a.average.total_cmp(&b.average));

    RepeaterStats {
        repeaters: repeater_group,
        non_repeaters: non_repeater_group,
        repeater_success_rate: pass_percentage(&repeater_averages, PASS_THRESHOLD),
        repeater_subjects,
    }
}

/// Bucket counts and pass rates only, for table rendering.
pub fn distribution_stats(students: &[Student], subjects: &[String]) -> Vec<DistributionRow> {
    subjects
        .iter()
        .map(|subject| {
            let grades = subject_grades(students, subject);
            DistributionRow {
                subject: subject.clone(),
                graded: grades.len(),
                distribution: distribution(&grades),
                passed: count_at_least(&grades, PASS_THRESHOLD),
                pass_rate: pass_percentage(&grades, PASS_THRESHOLD),
            }
        })
        .collect()
}

/// Pairs of grades held by the same students, aligned by student.
fn aligned_pairs(students: &[Student], a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    students
        .iter()
        .filter_map(|s| Some((s.grade(a)?, s.grade(b)?)))
        .unzip()
}

pub fn subject_correlations(students: &[Student], subjects: &[String]) -> CorrelationMatrix {
    let matrix: Vec<Vec<f64>> = subjects
        .iter()
        .map(|a| {
            subjects
                .iter()
                .map(|b| {
                    let (xs, ys) = aligned_pairs(students, a, b);
                    correlation(&xs, &ys)
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let with_semester_average: Vec<f64> = subjects
        .iter()
        .map(|subject| {
            let (xs, ys): (Vec<f64>, Vec<f64>) = students
                .iter()
                .filter_map(|s| Some((s.grade(subject)?, s.semester_average)))
                .unzip();
            correlation(&xs, &ys)
        })
        .collect();

    CorrelationMatrix {
        subjects: subjects.to_vec(),
        matrix,
        with_semester_average,
    }
}

/// Per origin class, in order of first appearance. Students without an
/// origin class are grouped under `default_class`.
pub fn class_comparison(students: &[Student], default_class: &str) -> Vec<ClassGroupStats> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for s in students {
        let class = s.source_class.as_deref().unwrap_or(default_class);
        match groups.iter().position(|(c, _)| c == class) {
            Some(i) => groups[i].1.push(s.semester_average),
            None => groups.push((class.to_string(), vec![s.semester_average])),
        }
    }

    groups
        .into_iter()
        .map(|(class, averages)| ClassGroupStats {
            class,
            students: averages.len(),
            average: average(&averages),
            std_dev: standard_deviation(&averages),
            success_rate: pass_percentage(&averages, PASS_THRESHOLD),
        })
        .collect()
}

/// The `n` best semester averages; equal averages keep input order.
pub fn top_students(students: &[Student], n: usize) -> Vec<RankedStudent> {
    let mut ranked: Vec<&Student> = students.iter().collect();
    ranked.sort_by(|a, b| b.semester_average.total_cmp(&a.semester_average));

    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, s)| RankedStudent {
            rank: i + 1,
            id: s.id.clone(),
            name: s.name.clone(),
            source_class: s.source_class.clone(),
            semester_average: s.semester_average,
        })
        .collect()
}
