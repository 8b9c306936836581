//! Grade Sheet Library
//!
//! Fetches per-student results from the university results portal for a
//! fixed roll-number range, pivots the subject grades into one row per
//! student and writes the table to an .xlsx workbook.

pub mod config;
pub mod model;
pub mod fetcher;
pub mod pacer;
pub mod aggregator;
pub mod exporter;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use config::{Settings, roll_numbers};
pub use model::{StudentRecord, SubjectGrade, SubjectSet};
pub use fetcher::{FetchError, Lookup, PortalClient, ResultsSource};
pub use pacer::RequestPacer;
pub use aggregator::{Aggregation, collect_students, is_reportable};
pub use exporter::{ExportRow, GradeSheet, SheetWriter, XlsxWriter};
pub use pipeline::{GradePipeline, RunSummary};
pub use server::{AppState, router};
