//! Fetch -> aggregate -> pivot -> write, end to end

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::aggregator::collect_students;
use crate::exporter::{GradeSheet, SheetWriter};
use crate::fetcher::ResultsSource;
use crate::pacer::RequestPacer;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub file_path: PathBuf,
    pub students_processed: usize,
    pub students_skipped: usize,
}

/// One grade sheet run; cheap to share between requests
pub struct GradePipeline {
    source: Arc<dyn ResultsSource>,
    writer: Arc<dyn SheetWriter>,
    pacer: RequestPacer,
    roll_numbers: Vec<String>,
}

impl GradePipeline {
    pub fn new(
        source: Arc<dyn ResultsSource>,
        writer: Arc<dyn SheetWriter>,
        pacer: RequestPacer,
        roll_numbers: Vec<String>,
    ) -> Self {
        Self {
            source,
            writer,
            pacer,
            roll_numbers,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        info!(
            "Starting grade sheet run over {} roll numbers",
            self.roll_numbers.len()
        );

        let aggregation =
            collect_students(self.source.as_ref(), &self.pacer, &self.roll_numbers).await;
        let sheet = GradeSheet::pivot(&aggregation);
        let file_path = self.writer.write_sheet(&sheet).await?;

        let summary = RunSummary {
            file_path,
            students_processed: sheet.row_count(),
            students_skipped: aggregation.skipped,
        };

        info!(
            "Grade sheet written to {:?}: {} students processed, {} skipped",
            summary.file_path, summary.students_processed, summary.students_skipped
        );

        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::aggregator::tests::FakeSource;
    use crate::config::roll_numbers;
    use crate::exporter::tests::{read_cells, row_count_in_file, temp_dir};
    use crate::exporter::XlsxWriter;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Keeps written sheets in memory
    #[derive(Default)]
    pub(crate) struct MemoryWriter {
        pub sheets: Mutex<Vec<GradeSheet>>,
    }

    #[async_trait]
    impl SheetWriter for MemoryWriter {
        async fn write_sheet(&self, sheet: &GradeSheet) -> Result<PathBuf> {
            self.sheets.lock().unwrap().push(sheet.clone());
            Ok(PathBuf::from("/tmp/studentGrades.xlsx"))
        }
    }

    pub(crate) struct FailingWriter;

    #[async_trait]
    impl SheetWriter for FailingWriter {
        async fn write_sheet(&self, _sheet: &GradeSheet) -> Result<PathBuf> {
            anyhow::bail!("disk full")
        }
    }

    pub(crate) fn alice_and_bob() -> FakeSource {
        FakeSource::default()
            .with("2101110022", "Alice", &[("Maths", "A")])
            .with("2101110023", "Bob", &[("Physics", "B")])
    }

    #[tokio::test]
    async fn test_run_alice_and_bob() {
        let writer = Arc::new(MemoryWriter::default());
        let pipeline = GradePipeline::new(
            Arc::new(alice_and_bob()),
            writer.clone(),
            RequestPacer::disabled(),
            roll_numbers(),
        );

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.students_processed, 2);
        assert_eq!(summary.students_skipped, 58);
        assert_eq!(summary.file_path, PathBuf::from("/tmp/studentGrades.xlsx"));

        let sheets = writer.sheets.lock().unwrap();
        let sheet = &sheets[0];
        assert_eq!(
            sheet.columns,
            vec!["Roll Number", "Student Name", "Maths", "Physics"]
        );
        assert_eq!(sheet.rows[0].values, vec!["2101110022", "Alice", "A", ""]);
        assert_eq!(sheet.rows[1].values, vec!["2101110023", "Bob", "", "B"]);
        assert_eq!(summary.students_processed, sheet.rows.len());
    }

    #[tokio::test]
    async fn test_run_writes_processed_students_to_workbook() {
        let dir = temp_dir("grade-sheet-pipeline");
        let path = dir.join("studentGrades.xlsx");
        let pipeline = GradePipeline::new(
            Arc::new(alice_and_bob()),
            Arc::new(XlsxWriter::new(&path)),
            RequestPacer::disabled(),
            roll_numbers(),
        );

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.file_path, path);
        assert_eq!(row_count_in_file(&path), summary.students_processed + 1);

        let cells = read_cells(&path);
        assert_eq!(cells.get("B2").map(String::as_str), Some("Alice"));
        assert_eq!(cells.get("D2").map(String::as_str), Some(""));
        assert_eq!(cells.get("C3").map(String::as_str), Some(""));
        assert_eq!(cells.get("D3").map(String::as_str), Some("B"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_run_twice_produces_identical_sheets() {
        let writer = Arc::new(MemoryWriter::default());
        let pipeline = GradePipeline::new(
            Arc::new(alice_and_bob()),
            writer.clone(),
            RequestPacer::disabled(),
            roll_numbers(),
        );

        pipeline.run().await.unwrap();
        pipeline.run().await.unwrap();

        let sheets = writer.sheets.lock().unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0], sheets[1]);
    }

    #[tokio::test]
    async fn test_run_surfaces_writer_failure() {
        let pipeline = GradePipeline::new(
            Arc::new(alice_and_bob()),
            Arc::new(FailingWriter),
            RequestPacer::disabled(),
            roll_numbers(),
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}
