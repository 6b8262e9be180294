//! JSON shapes handed to the presentation layer.
//!
//! Ids are hex strings and timestamps RFC 3339. Correct answers never leave the server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use store::model::*;

use crate::progress::{Cursor, best_score, exam_passed, is_video_active, is_video_completed};

fn ts(dt: mongodb::bson::DateTime) -> DateTime<Utc> {
    dt.to_chrono()
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePreview {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    pub thumbnail: Option<String>,
    pub theory_videos: usize,
    pub practice_videos: usize,
    pub exams: usize,
    pub total_length_in_s: u64,
}

impl From<&CourseDetail> for CoursePreview {
    fn from(course: &CourseDetail) -> Self {
        let total_length_in_s = course
            .theory
            .iter()
            .chain(course.practice.iter())
            .map(|v| v.length as u64)
            .sum();
        CoursePreview {
            id: course.id.to_hex(),
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category,
            thumbnail: course.thumbnail.clone(),
            theory_videos: course.theory.len(),
            practice_videos: course.practice.len(),
            exams: course.exams.len(),
            total_length_in_s,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: String,
    pub title: String,
    pub url: String,
    pub length: u32,
    pub can_seek: bool,
    pub should_complete_to_passed: bool,
    pub completed: bool,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionView {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<OptionView>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        QuestionView {
            id: question.id.to_hex(),
            text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|o| OptionView {
                    id: o.id.to_hex(),
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub time_limit_in_s: u32,
    pub questions: Vec<QuestionView>,
    pub attempts: usize,
    pub passed: bool,
    pub best_score: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub exam_id: String,
    pub group_id: String,
    pub correct: u32,
    pub total: u32,
    pub score: f64,
    pub passed: bool,
    pub submitted_at: DateTime<Utc>,
}

impl From<&ExamAttempt> for AttemptView {
    fn from(attempt: &ExamAttempt) -> Self {
        AttemptView {
            exam_id: attempt.exam_id.to_hex(),
            group_id: attempt.group_id.to_hex(),
            correct: attempt.correct,
            total: attempt.total,
            score: attempt.score,
            passed: attempt.passed,
            submitted_at: ts(attempt.submitted_at),
        }
    }
}

/// Timestamps are absent until the first interaction creates the progress document.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub course_id: String,
    pub completed_videos: Vec<CompletedVideo>,
    pub exam_attempts: Vec<AttemptView>,
    pub is_completed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressView {
    pub fn new(course_id: &mongodb::bson::oid::ObjectId, progress: Option<&CourseProgress>) -> Self {
        match progress {
            Some(p) => ProgressView {
                course_id: course_id.to_hex(),
                completed_videos: p.completed_videos.clone(),
                exam_attempts: p.exam_attempts.iter().map(AttemptView::from).collect(),
                is_completed: p.is_completed,
                started_at: Some(ts(p.started_at)),
                last_updated_at: Some(ts(p.last_updated_at)),
                completed_at: p.completed_at.map(ts),
            },
            None => ProgressView {
                course_id: course_id.to_hex(),
                completed_videos: vec![],
                exam_attempts: vec![],
                is_completed: false,
                started_at: None,
                last_updated_at: None,
                completed_at: None,
            },
        }
    }
}

/// Full course merged with the viewer's progress.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    pub thumbnail: Option<String>,
    pub theory: Vec<VideoView>,
    pub practice: Vec<VideoView>,
    pub exams: Vec<ExamView>,
    pub progress: ProgressView,
}

impl CourseView {
    pub fn new(course: &CourseDetail, progress: Option<&CourseProgress>) -> Self {
        let completed: &[CompletedVideo] = progress
            .map(|p| p.completed_videos.as_slice())
            .unwrap_or_default();

        let videos = |section: Section| -> Vec<VideoView> {
            course
                .section(section)
                .iter()
                .enumerate()
                .map(|(index, v)| VideoView {
                    id: v.id.to_hex(),
                    title: v.title.clone(),
                    url: v.url.clone(),
                    length: v.length,
                    can_seek: v.can_seek,
                    should_complete_to_passed: v.should_complete_to_passed,
                    completed: is_video_completed(completed, section, index as u32),
                    active: false,
                })
                .collect()
        };

        let exams = course
            .exams
            .iter()
            .map(|exam| ExamView {
                id: exam.id.to_hex(),
                group_id: exam.group_id.to_hex(),
                title: exam.title.clone(),
                time_limit_in_s: exam.time_limit_in_s,
                questions: exam.questions.iter().map(QuestionView::from).collect(),
                attempts: progress.map_or(0, |p| p.attempts_for(&exam.id).count()),
                passed: progress.is_some_and(|p| exam_passed(p, &exam.id)),
                best_score: progress.and_then(|p| best_score(p, &exam.id)),
            })
            .collect();

        CourseView {
            id: course.id.to_hex(),
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category,
            thumbnail: course.thumbnail.clone(),
            theory: videos(Section::Theory),
            practice: videos(Section::Practice),
            exams,
            progress: ProgressView::new(&course.id, progress),
        }
        .with_cursor(Cursor::default())
    }

    /// Highlights the video under `cursor`.
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        for (section, videos) in [
            (Section::Theory, &mut self.theory),
            (Section::Practice, &mut self.practice),
        ] {
            for (index, video) in videos.iter_mut().enumerate() {
                video.active =
                    is_video_active(section, index as u32, cursor.section, cursor.video_index);
            }
        }
        self
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourse {
    pub course: CoursePreview,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletedCourse {
    pub fn new(course: &CourseDetail, progress: &CourseProgress) -> Self {
        CompletedCourse {
            course: CoursePreview::from(course),
            completed_at: progress.completed_at.map(ts),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            company: user.company.clone(),
            job_title: user.job_title.clone(),
            created_at: ts(user.created_at),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Doc> for DocView {
    fn from(doc: &Doc) -> Self {
        DocView {
            id: doc.id.to_hex(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            file_url: doc.file_url.clone(),
            created_at: ts(doc.created_at),
            updated_at: ts(doc.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn course_view_hides_answers_and_hydrates_completion() {
        let course = sample_course();
        let mut progress =
            CourseProgress::empty(ObjectId::new(), course.id, mongodb::bson::DateTime::now());
        progress.completed_videos.push(CompletedVideo {
            section: Section::Theory,
            index: 1,
        });

        let view = CourseView::new(&course, Some(&progress));
        assert!(!view.theory[0].completed);
        assert!(view.theory[1].completed);
        assert!(!view.practice[0].completed);

        let json = serde_json::to_string(&view).unwrap();
        let answer = course.exams[0].questions[0].answer.to_hex();
        assert_eq!(json.matches(&answer).count(), 1, "answer id only appears as an option");
        assert!(!json.contains("\"answer\""));
    }

    #[test]
    fn cursor_moves_the_highlight() {
        let course = sample_course();
        let view = CourseView::new(&course, None);
        assert!(view.theory[0].active);
        assert!(!view.theory[1].active);

        let view = view.with_cursor(Cursor {
            section: Section::Practice,
            video_index: Some(0),
        });
        assert!(!view.theory[0].active);
        assert!(view.practice[0].active);
    }

    #[test]
    fn preview_sums_lengths() {
        let course = sample_course();
        let preview = CoursePreview::from(&course);
        assert_eq!(preview.theory_videos, 2);
        assert_eq!(preview.practice_videos, 1);
        assert_eq!(preview.total_length_in_s, 120 + 90 + 300);
    }

    #[test]
    fn empty_progress_has_no_timestamps() {
        let view = ProgressView::new(&ObjectId::new(), None);
        assert!(view.started_at.is_none());
        assert!(!view.is_completed);
    }
}
