use mongodb::bson::oid::ObjectId;
use store::model::{CompletedVideo, CourseDetail, CourseProgress, Section};

/// Navigation position inside the learn flow.
///
/// A fresh cursor points at the theory section with no explicit video index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub section: Section,
    pub video_index: Option<u32>,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            section: Section::Theory,
            video_index: None,
        }
    }
}

pub fn is_video_completed(videos: &[CompletedVideo], section: Section, index: u32) -> bool {
    videos
        .iter()
        .any(|v| v.section == section && v.index == index)
}

/// Whether the video at `(section, index)` is highlighted for the given cursor.
///
/// Two clauses can both hold for index 0: an exact cursor match, and the first
/// video of the current section while the cursor has no index yet.
pub fn is_video_active(
    section: Section,
    index: u32,
    current_section: Section,
    current_video_index: Option<u32>,
) -> bool {
    let exact = section == current_section && current_video_index == Some(index);
    let default_first =
        section == current_section && index == 0 && current_video_index.is_none();
    exact || default_first
}

/// Every `(section, index)` that must be watched for the course to pass.
pub fn required_videos(course: &CourseDetail) -> impl Iterator<Item = CompletedVideo> + '_ {
    [Section::Theory, Section::Practice]
        .into_iter()
        .flat_map(move |section| {
            course
                .section(section)
                .iter()
                .enumerate()
                .filter(|(_, v)| v.should_complete_to_passed)
                .map(move |(index, _)| CompletedVideo {
                    section,
                    index: index as u32,
                })
        })
}

pub fn exam_passed(progress: &CourseProgress, exam_id: &ObjectId) -> bool {
    progress.attempts_for(exam_id).any(|a| a.passed)
}

pub fn best_score(progress: &CourseProgress, exam_id: &ObjectId) -> Option<f64> {
    progress
        .attempts_for(exam_id)
        .map(|a| a.score)
        .max_by(f64::total_cmp)
}

/// A course is completed when all required videos are watched and every exam has a passing attempt.
pub fn is_course_completed(course: &CourseDetail, progress: &CourseProgress) -> bool {
    let videos_done = required_videos(course)
        .all(|v| is_video_completed(&progress.completed_videos, v.section, v.index));
    let exams_done = course.exams.iter().all(|e| exam_passed(progress, &e.id));

    videos_done && exams_done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use mongodb::bson::DateTime;
    use store::model::ExamAttempt;

    #[test]
    fn default_cursor_activates_first_theory_video() {
        let cursor = Cursor::default();
        assert!(is_video_active(
            Section::Theory,
            0,
            cursor.section,
            cursor.video_index
        ));
        assert!(!is_video_active(
            Section::Theory,
            1,
            cursor.section,
            cursor.video_index
        ));
    }

    #[test]
    fn other_section_is_never_active() {
        assert!(!is_video_active(Section::Practice, 0, Section::Theory, Some(0)));
        assert!(!is_video_active(Section::Practice, 0, Section::Theory, None));
    }

    #[test]
    fn explicit_index_wins_over_default() {
        assert!(is_video_active(Section::Practice, 3, Section::Practice, Some(3)));
        assert!(!is_video_active(Section::Practice, 0, Section::Practice, Some(3)));
        assert!(is_video_active(Section::Practice, 0, Section::Practice, Some(0)));
    }

    #[test]
    fn membership_is_per_section() {
        let videos = vec![CompletedVideo {
            section: Section::Practice,
            index: 1,
        }];
        assert!(is_video_completed(&videos, Section::Practice, 1));
        assert!(!is_video_completed(&videos, Section::Theory, 1));
        assert!(!is_video_completed(&[], Section::Theory, 0));
    }

    #[test]
    fn only_flagged_videos_are_required() {
        let course = sample_course();
        let required: Vec<_> = required_videos(&course).collect();
        assert_eq!(
            required,
            vec![
                CompletedVideo {
                    section: Section::Theory,
                    index: 0
                },
                CompletedVideo {
                    section: Section::Practice,
                    index: 0
                },
            ]
        );
    }

    #[test]
    fn completion_needs_videos_and_passing_exam() {
        let course = sample_course();
        let exam = &course.exams[0];
        let mut progress = CourseProgress::empty(ObjectId::new(), course.id, DateTime::now());
        assert!(!is_course_completed(&course, &progress));

        progress.completed_videos = required_videos(&course).collect();
        assert!(!is_course_completed(&course, &progress));

        let mut attempt = ExamAttempt {
            exam_id: exam.id,
            group_id: exam.group_id,
            correct: 1,
            total: 2,
            score: 50.0,
            passed: false,
            submitted_at: DateTime::now(),
        };
        progress.exam_attempts.push(attempt.clone());
        assert!(!is_course_completed(&course, &progress));

        attempt.correct = 2;
        attempt.score = 100.0;
        attempt.passed = true;
        progress.exam_attempts.push(attempt);
        assert!(is_course_completed(&course, &progress));
        assert_eq!(best_score(&progress, &exam.id), Some(100.0));
    }
}
