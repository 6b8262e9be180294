use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Denormalised report row. Derived from `CourseProgress` and `User`, never authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    #[serde(rename = "userId")]
    pub user_id: ObjectId,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub email: String,
    pub company: Option<String>,
    #[serde(rename = "courseId")]
    pub course_id: ObjectId,
    #[serde(rename = "courseTitle")]
    pub course_title: String,
    #[serde(rename = "completedVideos")]
    pub completed_videos: u32,
    #[serde(rename = "requiredVideos")]
    pub required_videos: u32,
    #[serde(rename = "examsPassed")]
    pub exams_passed: u32,
    #[serde(rename = "examsTotal")]
    pub exams_total: u32,
    #[serde(rename = "bestScore")]
    pub best_score: Option<f64>,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_at: DateTime,
}
