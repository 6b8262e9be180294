use store::model::{CourseDetail, Section};

/// Validate a course definition:
/// - `title` is not empty
/// - every video has a `length` greater than zero
/// - every exam has at least one question
/// - `exam.passing_percent`, if set, is between 0 and 100
/// - every question has non-empty text and at least two options
/// - every question's `answer` is one of its own options
pub fn validate_course(course: &CourseDetail) -> Result<(), String> {
    if course.title.trim().is_empty() {
        return Err(format!("Course {} has an empty title", course.id));
    }

    for section in [Section::Theory, Section::Practice] {
        for (index, video) in course.section(section).iter().enumerate() {
            if video.length == 0 {
                return Err(format!(
                    "Video {} ({section} #{index}) in course {} has zero length",
                    video.id, course.id
                ));
            }
        }
    }

    for exam in &course.exams {
        if exam.questions.is_empty() {
            return Err(format!("Exam {} has no questions", exam.id));
        }
        if let Some(percent) = exam.passing_percent {
            if !(0.0..=100.0).contains(&percent) {
                return Err(format!(
                    "Exam {} passing percent must be between 0.0 and 100.0",
                    exam.id
                ));
            }
        }
        for question in &exam.questions {
            if question.text.trim().is_empty() {
                return Err(format!("Question {} has empty text", question.id));
            }
            if question.options.len() < 2 {
                return Err(format!(
                    "Question {} needs at least two options",
                    question.id
                ));
            }
            if !question.has_option(&question.answer) {
                return Err(format!(
                    "Question {} answer {} is not one of its options",
                    question.id, question.answer
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn sample_course_is_valid() {
        assert_eq!(validate_course(&sample_course()), Ok(()));
    }

    #[test]
    fn zero_length_video_is_invalid() {
        let mut course = sample_course();
        course.practice[0].length = 0;
        let err = validate_course(&course).unwrap_err();
        assert!(err.contains("zero length"), "{err}");
    }

    #[test]
    fn answer_must_reference_own_option() {
        let mut course = sample_course();
        course.exams[0].questions[0].answer = ObjectId::new();
        let err = validate_course(&course).unwrap_err();
        assert!(err.contains("not one of its options"), "{err}");
    }

    #[test]
    fn exam_without_questions_is_invalid() {
        let mut course = sample_course();
        course.exams[0].questions.clear();
        assert!(validate_course(&course).is_err());
    }
}
