//! Sequential collection of student records over the roll-number range

use tracing::{info, warn};

use crate::fetcher::ResultsSource;
use crate::model::{StudentRecord, SubjectSet};
use crate::pacer::RequestPacer;

/// Result of one pass over the roll-number range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Included students, in roll-number order
    pub students: Vec<StudentRecord>,
    /// Subjects of the included students, in first-seen order
    pub subjects: SubjectSet,
    /// Roll numbers whose fetch failed or whose record had no subjects
    pub skipped: usize,
}

impl Aggregation {
    /// Fold one fetched record into the aggregation
    fn with_record(mut self, record: StudentRecord) -> Self {
        self.subjects.extend_from(&record);
        self.students.push(record);
        self
    }
}

/// Whether a fetched record makes it into the sheet
pub fn is_reportable(record: &StudentRecord) -> bool {
    !record.subjects.is_empty()
}

/// Fetch every roll number in order, pausing after each one (including the last)
pub async fn collect_students<S>(
    source: &S,
    pacer: &RequestPacer,
    roll_numbers: &[String],
) -> Aggregation
where
    S: ResultsSource + ?Sized,
{
    let mut aggregation = Aggregation::default();

    for roll_no in roll_numbers {
        info!("Fetching data for {}...", roll_no);

        let outcome = source.fetch_student(roll_no).await;
        pacer.pause().await;

        aggregation = match outcome {
            Ok(record) if is_reportable(&record) => aggregation.with_record(record),
            Ok(_) => {
                info!("Skipping {}: no subjects returned", roll_no);
                Aggregation {
                    skipped: aggregation.skipped + 1,
                    ..aggregation
                }
            }
            Err(e) => {
                warn!("Error fetching data for roll no {}: {}", roll_no, e);
                Aggregation {
                    skipped: aggregation.skipped + 1,
                    ..aggregation
                }
            }
        };
    }

    info!(
        "Collected {} students with {} subjects ({} skipped)",
        aggregation.students.len(),
        aggregation.subjects.len(),
        aggregation.skipped
    );

    aggregation
}
