//! Memoization of the analysis views.
//!
//! Each view keeps only its most recent result. The key is the dataset's
//! revision plus a fingerprint of any extra argument, so a replaced dataset
//! always recomputes even when its contents happen to be identical.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::analysis::types::{
    CategoryStats, ClassGroupStats, CorrelationMatrix, DistributionRow, GeneralSubjectStats,
    GlobalStats, OptionalSubjectStats, RankedStudent, RepeaterStats, SubjectStats,
};
use crate::analysis::views;
use crate::model::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    extra: u64,
}

impl CacheKey {
    fn new(dataset: &Dataset) -> Self {
        Self {
            revision: dataset.revision(),
            extra: 0,
        }
    }

    fn with_extra(dataset: &Dataset, extra: impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        extra.hash(&mut hasher);
        Self {
            revision: dataset.revision(),
            extra: hasher.finish(),
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    entry: Option<(CacheKey, Arc<T>)>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

/// Hit and miss counters across all views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Single-slot cache per view, keyed by dataset revision.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    subject_analysis: Slot<Vec<SubjectStats>>,
    global: Slot<GlobalStats>,
    categories: Slot<CategoryStats>,
    optional: Slot<Vec<OptionalSubjectStats>>,
    general: Slot<Vec<GeneralSubjectStats>>,
    repeaters: Slot<RepeaterStats>,
    distribution: Slot<Vec<DistributionRow>>,
    correlations: Slot<CorrelationMatrix>,
    classes: Slot<Vec<ClassGroupStats>>,
    top: Slot<Vec<RankedStudent>>,
    stats: CacheStats,
}

fn cached<T>(
    slot: &mut Slot<T>,
    stats: &mut CacheStats,
    key: CacheKey,
    view: &'static str,
    compute: impl FnOnce() -> T,
) -> Arc<T> {
    if let Some((k, value)) = &slot.entry {
        if *k == key {
            stats.hits += 1;
            debug!(view, revision = key.revision, "Analysis cache hit");
            return Arc::clone(value);
        }
    }

    stats.misses += 1;
    debug!(view, revision = key.revision, "Analysis cache miss, computing view");
    let value = Arc::new(compute());
    slot.entry = Some((key, Arc::clone(&value)));
    value
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject_analysis(&mut self, dataset: &Dataset) -> Arc<Vec<SubjectStats>> {
        cached(
            &mut self.subject_analysis,
            &mut self.stats,
            CacheKey::new(dataset),
            "subject_analysis",
            || views::subject_analysis(dataset.students(), dataset.subjects()),
        )
    }

    pub fn global_semester_stats(&mut self, dataset: &Dataset) -> Arc<GlobalStats> {
        cached(
            &mut self.global,
            &mut self.stats,
            CacheKey::new(dataset),
            "global_semester_stats",
            || views::global_semester_stats(dataset.students()),
        )
    }

    pub fn category_global_stats(&mut self, dataset: &Dataset) -> Arc<CategoryStats> {
        cached(
            &mut self.categories,
            &mut self.stats,
            CacheKey::new(dataset),
            "category_global_stats",
            || views::category_global_stats(dataset.students()),
        )
    }

    pub fn optional_subjects_stats(
        &mut self,
        dataset: &Dataset,
        optional: &[String],
    ) -> Arc<Vec<OptionalSubjectStats>> {
        cached(
            &mut self.optional,
            &mut self.stats,
            CacheKey::with_extra(dataset, optional),
            "optional_subjects_stats",
            || views::optional_subjects_stats(dataset.students(), dataset.subjects(), optional),
        )
    }

    pub fn general_subject_summary(&mut self, dataset: &Dataset) -> Arc<Vec<GeneralSubjectStats>> {
        cached(
            &mut self.general,
            &mut self.stats,
            CacheKey::new(dataset),
            "general_subject_summary",
            || views::general_subject_summary(dataset.students(), dataset.subjects()),
        )
    }

    pub fn repeater_stats(&mut self, dataset: &Dataset) -> Arc<RepeaterStats> {
        cached(
            &mut self.repeaters,
            &mut self.stats,
            CacheKey::new(dataset),
            "repeater_stats",
            || views::repeater_stats(dataset.students(), dataset.subjects()),
        )
    }

    pub fn distribution_stats(&mut self, dataset: &Dataset) -> Arc<Vec<DistributionRow>> {
        cached(
            &mut self.distribution,
            &mut self.stats,
            CacheKey::new(dataset),
            "distribution_stats",
            || views::distribution_stats(dataset.students(), dataset.subjects()),
        )
    }

    pub fn subject_correlations(&mut self, dataset: &Dataset) -> Arc<CorrelationMatrix> {
        cached(
            &mut self.correlations,
            &mut self.stats,
            CacheKey::new(dataset),
            "subject_correlations",
            || views::subject_correlations(dataset.students(), dataset.subjects()),
        )
    }

    pub fn class_comparison(&mut self, dataset: &Dataset) -> Arc<Vec<ClassGroupStats>> {
        let default_class = dataset.metadata().class_number.as_str();
        cached(
            &mut self.classes,
            &mut self.stats,
            CacheKey::with_extra(dataset, default_class),
            "class_comparison",
            || views::class_comparison(dataset.students(), default_class),
        )
    }

    pub fn top_students(&mut self, dataset: &Dataset, n: usize) -> Arc<Vec<RankedStudent>> {
        cached(
            &mut self.top,
            &mut self.stats,
            CacheKey::with_extra(dataset, n),
            "top_students",
            || views::top_students(dataset.students(), n),
        )
    }

    /// Drops every cached view.
    pub fn invalidate(&mut self) {
        let stats = self.stats;
        *self = Self {
            stats,
            ..Self::default()
        };
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::views::tests::student;
    use crate::model::ClassMetadata;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                student("1", "F", false, &[("math", 12.0)], 12.0),
                student("2", "M", true, &[("math", 6.0)], 7.5),
            ],
            vec!["math".to_string()],
            ClassMetadata::default(),
        )
    }

    #[test]
    fn test_same_dataset_returns_cached_view() {
        let data = dataset();
        let mut cache = AnalysisCache::new();

        let first = cache.subject_analysis(&data);
        let second = cache.subject_analysis(&data);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_new_dataset_recomputes_even_if_identical() {
        let mut cache = AnalysisCache::new();
        let first = cache.global_semester_stats(&dataset());
        let second = cache.global_semester_stats(&dataset());

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_only_latest_result_is_kept() {
        let a = dataset();
        let b = dataset();
        let mut cache = AnalysisCache::new();

        cache.repeater_stats(&a);
        cache.repeater_stats(&b);
        cache.repeater_stats(&a);

        assert_eq!(cache.stats().misses, 3);
    }

    #[test]
    fn test_extra_argument_is_part_of_key() {
        let data = dataset();
        let mut cache = AnalysisCache::new();
        let optional = vec!["math".to_string()];

        cache.optional_subjects_stats(&data, &optional);
        cache.optional_subjects_stats(&data, &optional);
        cache.optional_subjects_stats(&data, &[]);
        cache.top_students(&data, 1);
        cache.top_students(&data, 2);

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 4 });
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let data = dataset();
        let mut cache = AnalysisCache::new();

        let first = cache.distribution_stats(&data);
        cache.invalidate();
        let second = cache.distribution_stats(&data);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().misses, 2);
    }
}
