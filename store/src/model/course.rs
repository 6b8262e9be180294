use std::{fmt, str::FromStr};

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Theory,
    Practice,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Theory => write!(f, "theory"),
            Section::Practice => write!(f, "practice"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseCategory {
    #[serde(rename = "atld")]
    Atld,
    #[serde(rename = "hoc-nghe")]
    HocNghe,
}

/// Listing filter: one category, or every active course.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseKind {
    Atld,
    HocNghe,
    All,
}

impl CourseKind {
    pub fn category(&self) -> Option<CourseCategory> {
        match self {
            CourseKind::Atld => Some(CourseCategory::Atld),
            CourseKind::HocNghe => Some(CourseCategory::HocNghe),
            CourseKind::All => None,
        }
    }

    pub fn matches(&self, category: CourseCategory) -> bool {
        self.category().is_none_or(|c| c == category)
    }
}

impl FromStr for CourseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atld" => Ok(CourseKind::Atld),
            "hoc-nghe" => Ok(CourseKind::HocNghe),
            "all" => Ok(CourseKind::All),
            other => Err(Error::Validation(format!(
                "unknown course kind '{other}', expected one of: atld, hoc-nghe, all"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseDetail {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    pub active: bool,
    pub thumbnail: Option<String>,
    pub theory: Vec<Video>,
    pub practice: Vec<Video>,
    pub exams: Vec<Exam>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl CourseDetail {
    pub fn section(&self, section: Section) -> &[Video] {
        match section {
            Section::Theory => &self.theory,
            Section::Practice => &self.practice,
        }
    }

    pub fn video(&self, section: Section, index: u32) -> Option<&Video> {
        self.section(section).get(index as usize)
    }

    pub fn exam(&self, exam_id: &ObjectId) -> Option<&Exam> {
        self.exams.iter().find(|e| &e.id == exam_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub url: String,
    /// Seconds
    pub length: u32,
    #[serde(rename = "canSeek")]
    pub can_seek: bool,
    #[serde(rename = "shouldCompleteToPassed")]
    pub should_complete_to_passed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exam {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Retake scope
    #[serde(rename = "groupId")]
    pub group_id: ObjectId,
    pub title: String,
    #[serde(rename = "timeLimitInS")]
    pub time_limit_in_s: u32,
    /// Overrides the service-wide passing policy when set
    #[serde(rename = "passingPercent")]
    pub passing_percent: Option<f64>,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    pub options: Vec<QuestionOption>,
    /// Id of the correct option
    pub answer: ObjectId,
}

impl Question {
    pub fn has_option(&self, option_id: &ObjectId) -> bool {
        self.options.iter().any(|o| &o.id == option_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
}
