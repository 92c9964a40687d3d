//! Descriptive statistics and cohort comparisons over an ingested dataset.
//!
//! [`views`] holds pure functions of `(students, subjects)`, [`cache`]
//! memoizes them per dataset revision, and [`report`] bundles every view
//! into one serializable document.

pub mod cache;
pub mod report;
pub mod types;
pub mod views;

pub use cache::AnalysisCache;
pub use report::{AnalysisReport, build_report};
