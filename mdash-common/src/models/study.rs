//! Study-group assignments and grading

use super::Attendee;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAssignment {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub max_score: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
    pub graded_by: String,
    pub graded_at: DateTime<Utc>,
}

/// A member's hand-in for one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSubmission {
    pub id: String,
    pub assignment_id: String,
    pub member: Attendee,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub grade: Option<Grade>,
}

impl AssignmentSubmission {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

/// Body of `PUT /study-groups/submissions/{id}/grade`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub graded_by: String,
}

impl GradeRequest {
    /// Build a grade, rejecting scores outside `0..=max_score`
    pub fn new(
        score: f64,
        max_score: f64,
        feedback: Option<String>,
        graded_by: impl Into<String>,
    ) -> Result<Self> {
        if !score.is_finite() || !max_score.is_finite() {
            return Err(Error::InvalidInput("score must be a finite number".to_string()));
        }
        if score < 0.0 || score > max_score {
            return Err(Error::InvalidInput(format!(
                "score {} is outside 0..={}",
                score, max_score
            )));
        }
        Ok(Self {
            score,
            feedback: feedback.filter(|f| !f.trim().is_empty()),
            graded_by: graded_by.into(),
        })
    }
}
