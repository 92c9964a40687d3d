//! Ingestion and statistics engine for semester-grade spreadsheets.
//!
//! Raw grids (one per class file) are normalized by [`ingest`], merged by
//! [`aggregate`] when several classes are loaded together, and analysed by
//! [`analysis`] on top of the numeric functions in [`stats`].

pub mod aggregate;
pub mod analysis;
pub mod cell;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;

pub use error::IngestError;
