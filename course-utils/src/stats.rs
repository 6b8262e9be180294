use store::model::{CourseDetail, CourseProgress, StudentStats, User};

use crate::progress::{best_score, exam_passed, is_video_completed, required_videos};

/// Derives the report row for one learner in one course.
///
/// `completed_videos` counts only required videos, so it never exceeds `required_videos`.
pub fn student_stats(user: &User, course: &CourseDetail, progress: &CourseProgress) -> StudentStats {
    let (mut required, mut completed) = (0, 0);
    for v in required_videos(course) {
        required += 1;
        if is_video_completed(&progress.completed_videos, v.section, v.index) {
            completed += 1;
        }
    }

    let exams_passed = course
        .exams
        .iter()
        .filter(|e| exam_passed(progress, &e.id))
        .count() as u32;
    let best_score = course
        .exams
        .iter()
        .filter_map(|e| best_score(progress, &e.id))
        .max_by(f64::total_cmp);

    StudentStats {
        user_id: user.id,
        user_name: user.name.clone(),
        email: user.email.clone(),
        company: user.company.clone(),
        course_id: course.id,
        course_title: course.title.clone(),
        completed_videos: completed,
        required_videos: required,
        exams_passed,
        exams_total: course.exams.len() as u32,
        best_score,
        is_completed: progress.is_completed,
        started_at: progress.started_at,
        last_updated_at: progress.last_updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use mongodb::bson::{DateTime, oid::ObjectId};
    use store::model::{CompletedVideo, ExamAttempt, Role, Section};

    fn user() -> User {
        User {
            id: ObjectId::new(),
            name: "Nguyễn Văn A".to_string(),
            email: "a@example.vn".to_string(),
            role: Role::Student,
            phone: None,
            company: Some("Công ty B".to_string()),
            job_title: None,
            created_at: DateTime::now(),
        }
    }

    #[test]
    fn counts_only_required_videos() {
        let course = sample_course();
        let user = user();
        let mut progress = CourseProgress::empty(user.id, course.id, DateTime::now());
        progress.completed_videos = vec![
            CompletedVideo {
                section: Section::Theory,
                index: 0,
            },
            CompletedVideo {
                section: Section::Theory,
                index: 1,
            },
        ];

        let stats = student_stats(&user, &course, &progress);
        assert_eq!(stats.required_videos, 2);
        assert_eq!(stats.completed_videos, 1);
        assert_eq!(stats.exams_total, 1);
        assert_eq!(stats.exams_passed, 0);
        assert_eq!(stats.best_score, None);
        assert_eq!(stats.company.as_deref(), Some("Công ty B"));
    }

    #[test]
    fn best_score_spans_attempts() {
        let course = sample_course();
        let exam = &course.exams[0];
        let user = user();
        let mut progress = CourseProgress::empty(user.id, course.id, DateTime::now());
        for (correct, passed) in [(1, false), (2, true), (0, false)] {
            progress.exam_attempts.push(ExamAttempt {
                exam_id: exam.id,
                group_id: exam.group_id,
                correct,
                total: 2,
                score: correct as f64 * 50.0,
                passed,
                submitted_at: DateTime::now(),
            });
        }

        let stats = student_stats(&user, &course, &progress);
        assert_eq!(stats.exams_passed, 1);
        assert_eq!(stats.best_score, Some(100.0));
    }
}
