//! The full set of views for one dataset, bundled for the reporting layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::cache::AnalysisCache;
use crate::analysis::types::{
    CategoryStats, ClassGroupStats, CorrelationMatrix, DistributionRow, GeneralSubjectStats,
    GlobalStats, OptionalSubjectStats, RankedStudent, RepeaterStats, SubjectStats,
};
use crate::config::AnalysisConfig;
use crate::model::{ClassMetadata, Dataset};

/// Bump when the report layout changes.
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub metadata: ClassMetadata,
    pub student_count: usize,
    pub subjects: Vec<String>,
    pub global: GlobalStats,
    pub categories: CategoryStats,
    pub subject_analysis: Vec<SubjectStats>,
    pub general_summary: Vec<GeneralSubjectStats>,
    pub optional_subjects: Vec<OptionalSubjectStats>,
    pub repeaters: RepeaterStats,
    pub distribution: Vec<DistributionRow>,
    pub correlations: CorrelationMatrix,
    pub classes: Vec<ClassGroupStats>,
    pub top_students: Vec<RankedStudent>,
}

/// Computes (or reuses) every view of `dataset`.
pub fn build_report(
    cache: &mut AnalysisCache,
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let report = AnalysisReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        metadata: dataset.metadata().clone(),
        student_count: dataset.students().len(),
        subjects: dataset.subjects().to_vec(),
        global: (*cache.global_semester_stats(dataset)).clone(),
        categories: (*cache.category_global_stats(dataset)).clone(),
        subject_analysis: cache.subject_analysis(dataset).to_vec(),
        general_summary: cache.general_subject_summary(dataset).to_vec(),
        optional_subjects: cache
            .optional_subjects_stats(dataset, &config.optional_subjects)
            .to_vec(),
        repeaters: (*cache.repeater_stats(dataset)).clone(),
        distribution: cache.distribution_stats(dataset).to_vec(),
        correlations: (*cache.subject_correlations(dataset)).clone(),
        classes: cache.class_comparison(dataset).to_vec(),
        top_students: cache.top_students(dataset, config.top_students).to_vec(),
    };

    info!(
        class = %report.metadata.class_name,
        students = report.student_count,
        subjects = report.subjects.len(),
        success_rate = report.categories.overall_success_rate,
        "Analysis report built"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::views::tests::student;

    #[test]
    fn test_report_collects_every_view() {
        let mut meta = ClassMetadata {
            level: "1AS".to_string(),
            class_number: "2".to_string(),
            ..Default::default()
        };
        meta.compose_class_name();
        let dataset = Dataset::new(
            vec![
                student("1", "F", false, &[("math", 15.0), ("music", 12.0)], 13.0),
                student("2", "M", true, &[("math", 9.0)], 9.0),
            ],
            vec!["math".to_string(), "music".to_string()],
            meta,
        );
        let config = AnalysisConfig {
            optional_subjects: vec!["music".to_string()],
            top_students: 1,
            ..Default::default()
        };
        let mut cache = AnalysisCache::new();

        let report = build_report(&mut cache, &dataset, &config);

        assert_eq!(report.student_count, 2);
        assert_eq!(report.subject_analysis.len(), 2);
        assert_eq!(report.optional_subjects.len(), 1);
        assert_eq!(report.optional_subjects[0].count, 1);
        assert_eq!(report.top_students.len(), 1);
        assert_eq!(report.top_students[0].id, "1");
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.classes[0].class, "2");
        assert_eq!(report.categories.overall_success_rate, 50.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metadata"]["class_name"], "1AS 2");
        assert_eq!(json["subject_analysis"][0]["comparison"], "above");
    }

    #[test]
    fn test_second_report_reuses_cached_views() {
        let dataset = Dataset::new(
            vec![student("1", "F", false, &[("math", 11.0)], 11.0)],
            vec!["math".to_string()],
            ClassMetadata::default(),
        );
        let config = AnalysisConfig::default();
        let mut cache = AnalysisCache::new();

        build_report(&mut cache, &dataset, &config);
        let misses = cache.stats().misses;
        build_report(&mut cache, &dataset, &config);

        assert_eq!(cache.stats().misses, misses);
        assert_eq!(cache.stats().hits, misses);
    }
}
