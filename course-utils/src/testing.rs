//! Fixtures shared by the unit tests.

use mongodb::bson::{DateTime, oid::ObjectId};
use store::model::*;

pub fn video(title: &str, length: u32, required: bool) -> Video {
    Video {
        id: ObjectId::new(),
        title: title.to_string(),
        url: format!("https://cdn.example.vn/{title}.mp4"),
        length,
        can_seek: !required,
        should_complete_to_passed: required,
    }
}

pub fn sample_exam(questions: usize) -> Exam {
    Exam {
        id: ObjectId::new(),
        group_id: ObjectId::new(),
        title: "Final exam".to_string(),
        time_limit_in_s: 900,
        passing_percent: None,
        questions: (0..questions)
            .map(|i| {
                let options: Vec<QuestionOption> = (0..3)
                    .map(|o| QuestionOption {
                        id: ObjectId::new(),
                        text: format!("Option {o}"),
                    })
                    .collect();
                Question {
                    id: ObjectId::new(),
                    text: format!("Question {i}"),
                    answer: options[1].id,
                    options,
                }
            })
            .collect(),
    }
}

/// Two theory videos (first required), one required practice video, one exam of two questions.
pub fn sample_course() -> CourseDetail {
    CourseDetail {
        id: ObjectId::new(),
        title: "An toàn lao động nhóm 3".to_string(),
        description: "Huấn luyện an toàn, vệ sinh lao động".to_string(),
        category: CourseCategory::Atld,
        active: true,
        thumbnail: None,
        theory: vec![video("intro", 120, true), video("extra", 90, false)],
        practice: vec![video("drill", 300, true)],
        exams: vec![sample_exam(2)],
        created_at: DateTime::now(),
    }
}
