use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::course::Section;

/// Identifies a watched video by its position in a course section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedVideo {
    pub section: Section,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamAttempt {
    #[serde(rename = "examId")]
    pub exam_id: ObjectId,
    #[serde(rename = "groupId")]
    pub group_id: ObjectId,
    pub correct: u32,
    pub total: u32,
    /// Percentage, 0.0 to 100.0
    pub score: f64,
    pub passed: bool,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime,
}

/// All progress for one user in one course lives in a single document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseProgress {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "userId")]
    pub user_id: ObjectId,
    #[serde(rename = "courseId")]
    pub course_id: ObjectId,
    #[serde(rename = "completedVideos", default)]
    pub completed_videos: Vec<CompletedVideo>,
    #[serde(rename = "examAttempts", default)]
    pub exam_attempts: Vec<ExamAttempt>,
    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_at: DateTime,
    #[serde(rename = "completedAt", default)]
    pub completed_at: Option<DateTime>,
}

impl CourseProgress {
    /// Progress as it looks before the first interaction. Never persisted as is.
    pub fn empty(user_id: ObjectId, course_id: ObjectId, now: DateTime) -> Self {
        CourseProgress {
            id: ObjectId::new(),
            user_id,
            course_id,
            completed_videos: vec![],
            exam_attempts: vec![],
            is_completed: false,
            started_at: now,
            last_updated_at: now,
            completed_at: None,
        }
    }

    pub fn attempts_for(&self, exam_id: &ObjectId) -> impl Iterator<Item = &ExamAttempt> {
        self.exam_attempts
            .iter()
            .filter(move |a| &a.exam_id == exam_id)
    }
}
