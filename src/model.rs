//! Student records as returned by the results portal

use std::collections::HashSet;

/// One subject and the grade obtained in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectGrade {
    pub subject_name: String,
    pub grade: String,
}

impl SubjectGrade {
    pub fn new(subject_name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            grade: grade.into(),
        }
    }
}

/// A student fetched from the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub roll_no: String,
    pub name: String,
    pub subjects: Vec<SubjectGrade>,
}

/// Distinct subject names in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl SubjectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subject name; returns false if it was already present
    pub fn insert(&mut self, subject: &str) -> bool {
        if self.seen.contains(subject) {
            return false;
        }
        self.seen.insert(subject.to_string());
        self.order.push(subject.to_string());
        true
    }

    pub fn extend_from(&mut self, record: &StudentRecord) {
        for subject in &record.subjects {
            self.insert(&subject.subject_name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
