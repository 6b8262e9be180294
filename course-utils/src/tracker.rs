use std::sync::Arc;

use mongodb::bson::{DateTime, oid::ObjectId};
use store::{
    DocumentStore, Error, Result,
    model::{CompletedVideo, CourseDetail, CourseProgress, ExamAttempt, Section},
};
use tracing::{info, instrument, warn};

use crate::{
    grading::{Answer, PassingPolicy, grade_exam},
    progress::is_course_completed,
    resolver::load_course,
    view::{CompletedCourse, ProgressView},
};

/// Outcome of one exam submission.
#[derive(Clone, Debug)]
pub struct ExamResult {
    pub attempt: ExamAttempt,
    pub progress: CourseProgress,
}

/// Records video and exam events into the per-user, per-course progress document.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn DocumentStore>,
    policy: PassingPolicy,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn DocumentStore>, policy: PassingPolicy) -> Self {
        ProgressTracker { store, policy }
    }

    /// Idempotent: marking an already-completed video only bumps `lastUpdatedAt`.
    #[instrument(skip(self), err(Debug))]
    pub async fn mark_video_completed(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        section: Section,
        index: u32,
    ) -> Result<CourseProgress> {
        let course = load_course(self.store.as_ref(), course_id).await?;
        if course.video(section, index).is_none() {
            return Err(Error::Validation(format!(
                "course {course_id} has no {section} video at index {index}"
            )));
        }

        let now = DateTime::now();
        let progress = self
            .store
            .add_completed_video(user_id, course_id, CompletedVideo { section, index }, now)
            .await?;

        self.sync_completion(&course, progress, now).await
    }

    #[instrument(skip(self, answers), err(Debug))]
    pub async fn record_exam_result(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        exam_id: ObjectId,
        answers: &[Answer],
    ) -> Result<ExamResult> {
        let course = load_course(self.store.as_ref(), course_id).await?;
        let exam = course
            .exam(&exam_id)
            .ok_or_else(|| Error::not_found("exam", exam_id))?;

        let grade = grade_exam(exam, answers, self.policy)?;
        let now = DateTime::now();
        let attempt = ExamAttempt {
            exam_id,
            group_id: exam.group_id,
            correct: grade.correct,
            total: grade.total,
            score: grade.score,
            passed: grade.passed,
            submitted_at: now,
        };
        info!(
            user = %user_id,
            exam = %exam_id,
            score = attempt.score,
            passed = attempt.passed,
            "exam graded"
        );

        let progress = self
            .store
            .push_exam_attempt(user_id, course_id, attempt.clone(), now)
            .await?;
        let progress = self.sync_completion(&course, progress, now).await?;

        Ok(ExamResult { attempt, progress })
    }

    /// Clears the attempts of one exam group so it can be submitted again.
    #[instrument(skip(self), err(Debug))]
    pub async fn retake_exam(&self, user_id: ObjectId, group_id: ObjectId) -> Result<u64> {
        let modified = self
            .store
            .clear_exam_group(user_id, group_id, DateTime::now())
            .await?;
        info!(user = %user_id, group = %group_id, modified, "exam group reset");
        Ok(modified)
    }

    pub async fn get_progress(&self, user_id: ObjectId, course_id: ObjectId) -> Result<ProgressView> {
        let course = load_course(self.store.as_ref(), course_id).await?;
        let progress = self.store.find_progress(user_id, course.id).await?;
        Ok(ProgressView::new(&course.id, progress.as_ref()))
    }

    /// Completed courses that are still published.
    pub async fn completed_courses(&self, user_id: ObjectId) -> Result<Vec<CompletedCourse>> {
        let progress = self.store.list_progress(user_id).await?;

        let mut completed = vec![];
        for p in progress.iter().filter(|p| p.is_completed) {
            match load_course(self.store.as_ref(), p.course_id).await {
                Ok(course) => completed.push(CompletedCourse::new(&course, p)),
                Err(Error::NotFound { .. }) => {
                    warn!(user = %user_id, course = %p.course_id, "completed course no longer published");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(completed)
    }

    /// Writes `isCompleted` back when the completion rule disagrees with the stored flag.
    ///
    /// The write only lands on the exact state `progress` was read in. If another
    /// write moved the document on, that writer owns the flag and the stored
    /// document is returned instead.
    async fn sync_completion(
        &self,
        course: &CourseDetail,
        mut progress: CourseProgress,
        now: DateTime,
    ) -> Result<CourseProgress> {
        let completed = is_course_completed(course, &progress);
        if completed == progress.is_completed {
            return Ok(progress);
        }

        if self.store.set_completed(&progress, completed, now).await? {
            progress.is_completed = completed;
            progress.completed_at = completed.then_some(now);
            info!(user = %progress.user_id, course = %course.id, completed, "course completion changed");
            return Ok(progress);
        }

        warn!(user = %progress.user_id, course = %course.id, "progress changed during completion sync");
        self.store
            .find_progress(progress.user_id, course.id)
            .await?
            .ok_or_else(|| Error::not_found("progress", progress.id))
    }
}
