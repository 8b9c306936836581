//! Spreadsheet export
//!
//! [`GradeSheet::pivot`] turns the per-student subject lists into one wide
//! row per student. [`XlsxWriter`] serializes the result as a single-sheet
//! workbook, replacing whatever file was at the target path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregator::Aggregation;

pub const ROLL_NUMBER_COLUMN: &str = "Roll Number";
pub const STUDENT_NAME_COLUMN: &str = "Student Name";
pub const SHEET_NAME: &str = "Student Grades";

/// Widths of the identity columns, in character units
const IDENTITY_COLUMN_WIDTHS: [f64; 2] = [15.0, 30.0];

/// Cell values of one student, aligned with [`GradeSheet::columns`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub values: Vec<String>,
}

/// Rectangular table: identity columns, then one column per subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSheet {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl GradeSheet {
    pub fn pivot(aggregation: &Aggregation) -> Self {
        let mut columns = vec![
            ROLL_NUMBER_COLUMN.to_string(),
            STUDENT_NAME_COLUMN.to_string(),
        ];
        let mut index: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        for subject in aggregation.subjects.iter() {
            if !index.contains_key(subject) {
                index.insert(subject.to_string(), columns.len());
                columns.push(subject.to_string());
            }
        }

        let rows = aggregation
            .students
            .iter()
            .map(|student| {
                let mut values = vec![String::new(); columns.len()];
                values[0] = student.roll_no.clone();
                values[1] = student.name.clone();
                for subject in &student.subjects {
                    if let Some(&col) = index.get(&subject.subject_name) {
                        values[col] = subject.grade.clone();
                    }
                }
                ExportRow { values }
            })
            .collect();

        Self { columns, rows }
    }

    /// Value of `column` in row `row`
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .get(row)
            .and_then(|r| r.values.get(col))
            .map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Destination for a finished grade sheet
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Write the sheet and return the path it was written to
    async fn write_sheet(&self, sheet: &GradeSheet) -> Result<PathBuf>;
}

/// Writes the grade sheet as an .xlsx workbook at a fixed path
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    path: PathBuf,
}

impl XlsxWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn write_workbook(sheet: &GradeSheet, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, width) in IDENTITY_COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (col, header) in sheet.columns.iter().enumerate() {
        let col = u16::try_from(col).context("Too many subject columns")?;
        worksheet.write_string(0, col, header)?;
    }

    // empty grades still get a cell so every row spans the full column set
    let blank = Format::new().set_align(FormatAlign::Left);
    for (row, export_row) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(row + 1).context("Too many student rows")?;
        for (col, value) in export_row.values.iter().enumerate() {
            let col = u16::try_from(col).context("Too many subject columns")?;
            if value.is_empty() {
                worksheet.write_blank(row, col, &blank)?;
            } else {
                worksheet.write_string(row, col, value)?;
            }
        }
    }

    workbook
        .save(path)
        .context(format!("Failed to save workbook to {:?}", path))?;

    Ok(())
}

#[async_trait]
impl SheetWriter for XlsxWriter {
    async fn write_sheet(&self, sheet: &GradeSheet) -> Result<PathBuf> {
        let path = self.path.clone();
        let owned = sheet.clone();

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_workbook(&owned, &target))
            .await
            .context("Workbook writer task failed")??;

        info!(
            "Wrote {} rows x {} columns to {:?}",
            sheet.row_count(),
            sheet.columns.len(),
            path
        );

        Ok(path)
    }
}
