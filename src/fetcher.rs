//! Results portal client
//!
//! Each student takes two lookups against the portal: the details lookup
//! (name) followed by the subject list lookup for the fixed semester and
//! session. Either lookup failing yields a [`FetchError`] for that roll number.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{Settings, SEMESTER_ID, SESSION};
use crate::model::{StudentRecord, SubjectGrade};

const DETAILS_PATH: &str = "student-detsils-results";
const SUBJECTS_PATH: &str = "student-results-subjects-list";

/// Which of the two portal lookups an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    StudentDetails,
    SubjectList,
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::StudentDetails => write!(f, "student details"),
            Lookup::SubjectList => write!(f, "subject list"),
        }
    }
}

/// Reason a roll number produced no student record
#[derive(Debug)]
pub enum FetchError {
    Transport { lookup: Lookup, message: String },
    Status { lookup: Lookup, status: u16 },
    EmptyPayload { lookup: Lookup },
    Decode { lookup: Lookup, message: String },
}

impl FetchError {
    pub fn lookup(&self) -> Lookup {
        match self {
            FetchError::Transport { lookup, .. }
            | FetchError::Status { lookup, .. }
            | FetchError::EmptyPayload { lookup }
            | FetchError::Decode { lookup, .. } => *lookup,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport { lookup, message } => {
                write!(f, "{} request failed: {}", lookup, message)
            }
            FetchError::Status { lookup, status } => {
                write!(f, "{} request returned status {}", lookup, status)
            }
            FetchError::EmptyPayload { lookup } => write!(f, "{} returned no data", lookup),
            FetchError::Decode { lookup, message } => {
                write!(f, "{} payload could not be decoded: {}", lookup, message)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of student records, keyed by roll number
#[async_trait]
pub trait ResultsSource: Send + Sync {
    async fn fetch_student(&self, roll_no: &str) -> Result<StudentRecord, FetchError>;
}

#[derive(Debug, Deserialize)]
struct StudentDetails {
    #[serde(default, rename = "studentName")]
    student_name: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    #[serde(default, rename = "subjectName")]
    subject_name: Option<Value>,
    #[serde(default)]
    grade: Option<Value>,
}

/// Render a loosely typed JSON field as cell text; absent and null become ""
fn text_of(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// HTTP client for the results portal
pub struct PortalClient {
    base_url: String,
    client: reqwest::Client,
}

impl PortalClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// POST to `path` with `query` and return the decoded JSON body
    async fn lookup(
        &self,
        lookup: Lookup,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Requesting {} from {}", lookup, url);

        let response = self
            .client
            .post(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                lookup,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                lookup,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Transport {
            lookup,
            message: e.to_string(),
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyPayload { lookup });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Null) => Err(FetchError::EmptyPayload { lookup }),
            Ok(value) => Ok(value),
            Err(e) => Err(FetchError::Decode {
                lookup,
                message: e.to_string(),
            }),
        }
    }

    async fn student_name(&self, roll_no: &str) -> Result<String, FetchError> {
        let lookup = Lookup::StudentDetails;
        let value = self
            .lookup(lookup, DETAILS_PATH, &[("rollNo", roll_no.to_string())])
            .await?;

        let details: StudentDetails =
            serde_json::from_value(value).map_err(|e| FetchError::Decode {
                lookup,
                message: e.to_string(),
            })?;

        Ok(text_of(details.student_name))
    }

    async fn subjects(&self, roll_no: &str) -> Result<Vec<SubjectGrade>, FetchError> {
        let lookup = Lookup::SubjectList;
        let query = [
            ("semid", SEMESTER_ID.to_string()),
            ("rollNo", roll_no.to_string()),
            ("session", SESSION.to_string()),
        ];
        let value = self.lookup(lookup, SUBJECTS_PATH, &query).await?;

        let entries: Vec<SubjectEntry> =
            serde_json::from_value(value).map_err(|e| FetchError::Decode {
                lookup,
                message: e.to_string(),
            })?;

        Ok(entries
            .into_iter()
            .map(|entry| SubjectGrade {
                subject_name: text_of(entry.subject_name),
                grade: text_of(entry.grade),
            })
            .collect())
    }
}

#[async_trait]
impl ResultsSource for PortalClient {
    async fn fetch_student(&self, roll_no: &str) -> Result<StudentRecord, FetchError> {
        let name = self.student_name(roll_no).await?;
        let subjects = self.subjects(roll_no).await?;

        Ok(StudentRecord {
            roll_no: roll_no.to_string(),
            name,
            subjects,
        })
    }
}
