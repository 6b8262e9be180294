//! Document store for the learning platform
//!
//! - Document types persisted in MongoDB
//! - Error taxonomy shared by every crate in the workspace
//! - `DocumentStore`, the typed adapter the services talk to
//!
pub mod db;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod model;

use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};

pub use error::{Error, ErrorKind, Result};
use model::*;

/// Typed reads and writes over the document database.
///
/// Every progress mutation touches a single `(user, course)` document, except
/// `clear_exam_group` which is scoped to one user.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_course(&self, course_id: ObjectId) -> Result<Option<CourseDetail>>;
    /// Active courses in stored order.
    async fn list_courses(&self, kind: CourseKind) -> Result<Vec<CourseDetail>>;

    async fn find_user(&self, user_id: ObjectId) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn find_progress(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<CourseProgress>>;
    async fn list_progress(&self, user_id: ObjectId) -> Result<Vec<CourseProgress>>;
    /// Upserts the progress document and adds `video` to its completed set.
    async fn add_completed_video(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        video: CompletedVideo,
        now: DateTime,
    ) -> Result<CourseProgress>;
    /// Upserts the progress document and appends `attempt`.
    async fn push_exam_attempt(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        attempt: ExamAttempt,
        now: DateTime,
    ) -> Result<CourseProgress>;
    /// Writes `isCompleted` only if the document's videos and attempts still match
    /// `snapshot`. Returns false when another write got there first.
    async fn set_completed(
        &self,
        snapshot: &CourseProgress,
        completed: bool,
        now: DateTime,
    ) -> Result<bool>;
    /// Removes every attempt of `group_id` from the user's progress documents,
    /// marking the touched documents as not completed. Returns the number modified.
    async fn clear_exam_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
        now: DateTime,
    ) -> Result<u64>;

    async fn list_docs(&self) -> Result<Vec<Doc>>;
    async fn find_doc(&self, doc_id: ObjectId) -> Result<Option<Doc>>;
    async fn insert_doc(&self, doc: Doc) -> Result<()>;
    /// Returns false if no document has `doc.id`.
    async fn update_doc(&self, doc: Doc) -> Result<bool>;
    async fn delete_doc(&self, doc_id: ObjectId) -> Result<bool>;

    async fn find_verification(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<VerificationRecord>>;
    /// Replaces a record left by another session. Returns false, writing nothing,
    /// when `record.session_id` already holds the `(user, course)` record.
    async fn insert_verification(&self, record: VerificationRecord) -> Result<bool>;
    async fn delete_verification(&self, user_id: ObjectId, course_id: ObjectId) -> Result<bool>;
}
