//! In-process `DocumentStore`, mirroring the MongoDB adapter's semantics.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::{
    DocumentStore,
    error::{Error, Result},
    model::*,
};

#[derive(Debug, Default)]
struct State {
    courses: Vec<CourseDetail>,
    users: Vec<User>,
    progress: Vec<CourseProgress>,
    docs: Vec<Doc>,
    verifications: Vec<VerificationRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, course: CourseDetail) -> Self {
        self.lock().courses.push(course);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.lock().users.push(user);
        self
    }

    pub fn with_doc(self, doc: Doc) -> Self {
        self.lock().docs.push(doc);
        self
    }

    pub fn progress_count(&self) -> usize {
        self.lock().progress.len()
    }

    pub fn doc_count(&self) -> usize {
        self.lock().docs.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl State {
    fn progress_mut(
        &mut self,
        user_id: ObjectId,
        course_id: ObjectId,
        now: DateTime,
    ) -> &mut CourseProgress {
        let pos = self
            .progress
            .iter()
            .position(|p| p.user_id == user_id && p.course_id == course_id);
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.progress
                    .push(CourseProgress::empty(user_id, course_id, now));
                self.progress.len() - 1
            }
        };
        &mut self.progress[pos]
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_course(&self, course_id: ObjectId) -> Result<Option<CourseDetail>> {
        Ok(self
            .lock()
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned())
    }

    async fn list_courses(&self, kind: CourseKind) -> Result<Vec<CourseDetail>> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| c.active && kind.matches(c.category))
            .cloned()
            .collect())
    }

    async fn find_user(&self, user_id: ObjectId) -> Result<Option<User>> {
        let user = self.lock().users.iter().find(|u| u.id == user_id).cloned();
        if let Some(user) = &user {
            user.validate()?;
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.lock().users.clone();
        users.iter().try_for_each(User::validate)?;
        Ok(users)
    }

    async fn find_progress(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<CourseProgress>> {
        Ok(self
            .lock()
            .progress
            .iter()
            .find(|p| p.user_id == user_id && p.course_id == course_id)
            .cloned())
    }

    async fn list_progress(&self, user_id: ObjectId) -> Result<Vec<CourseProgress>> {
        Ok(self
            .lock()
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_completed_video(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        video: CompletedVideo,
        now: DateTime,
    ) -> Result<CourseProgress> {
        let mut state = self.lock();
        let progress = state.progress_mut(user_id, course_id, now);
        if !progress.completed_videos.contains(&video) {
            progress.completed_videos.push(video);
        }
        progress.last_updated_at = now;
        Ok(progress.clone())
    }

    async fn push_exam_attempt(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        attempt: ExamAttempt,
        now: DateTime,
    ) -> Result<CourseProgress> {
        let mut state = self.lock();
        let progress = state.progress_mut(user_id, course_id, now);
        progress.exam_attempts.push(attempt);
        progress.last_updated_at = now;
        Ok(progress.clone())
    }

    async fn set_completed(
        &self,
        snapshot: &CourseProgress,
        completed: bool,
        now: DateTime,
    ) -> Result<bool> {
        let mut state = self.lock();
        let Some(progress) = state.progress.iter_mut().find(|p| {
            p.id == snapshot.id
                && p.completed_videos == snapshot.completed_videos
                && p.exam_attempts == snapshot.exam_attempts
        }) else {
            return Ok(false);
        };
        progress.is_completed = completed;
        progress.completed_at = completed.then_some(now);
        Ok(true)
    }

    async fn clear_exam_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
        now: DateTime,
    ) -> Result<u64> {
        let mut state = self.lock();
        let mut modified = 0;
        for progress in state.progress.iter_mut().filter(|p| {
            p.user_id == user_id && p.exam_attempts.iter().any(|a| a.group_id == group_id)
        }) {
            progress.exam_attempts.retain(|a| a.group_id != group_id);
            progress.is_completed = false;
            progress.completed_at = None;
            progress.last_updated_at = now;
            modified += 1;
        }
        Ok(modified)
    }

    async fn list_docs(&self) -> Result<Vec<Doc>> {
        Ok(self.lock().docs.clone())
    }

    async fn find_doc(&self, doc_id: ObjectId) -> Result<Option<Doc>> {
        Ok(self.lock().docs.iter().find(|d| d.id == doc_id).cloned())
    }

    async fn insert_doc(&self, doc: Doc) -> Result<()> {
        let mut state = self.lock();
        if state.docs.iter().any(|d| d.id == doc.id) {
            return Err(Error::Store(format!("duplicate doc id {}", doc.id)));
        }
        state.docs.push(doc);
        Ok(())
    }

    async fn update_doc(&self, doc: Doc) -> Result<bool> {
        let mut state = self.lock();
        match state.docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_doc(&self, doc_id: ObjectId) -> Result<bool> {
        let mut state = self.lock();
        let before = state.docs.len();
        state.docs.retain(|d| d.id != doc_id);
        Ok(state.docs.len() < before)
    }

    async fn find_verification(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<VerificationRecord>> {
        Ok(self
            .lock()
            .verifications
            .iter()
            .find(|v| v.user_id == user_id && v.course_id == course_id)
            .cloned())
    }

    async fn insert_verification(&self, record: VerificationRecord) -> Result<bool> {
        let mut state = self.lock();
        match state
            .verifications
            .iter_mut()
            .find(|v| v.user_id == record.user_id && v.course_id == record.course_id)
        {
            Some(existing) if existing.session_id == record.session_id => return Ok(false),
            Some(existing) => {
                existing.session_id = record.session_id;
                existing.photo_key = record.photo_key;
                existing.accepted_at = record.accepted_at;
            }
            None => state.verifications.push(record),
        }
        Ok(true)
    }

    async fn delete_verification(&self, user_id: ObjectId, course_id: ObjectId) -> Result<bool> {
        let mut state = self.lock();
        let before = state.verifications.len();
        state
            .verifications
            .retain(|v| !(v.user_id == user_id && v.course_id == course_id));
        Ok(state.verifications.len() < before)
    }
}
