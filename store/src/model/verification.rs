use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// An accepted identity photo, valid only for the session it was captured in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "userId")]
    pub user_id: ObjectId,
    #[serde(rename = "courseId")]
    pub course_id: ObjectId,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "photoKey")]
    pub photo_key: String,
    #[serde(rename = "acceptedAt")]
    pub accepted_at: DateTime,
}
