use mongodb::bson::oid::ObjectId;
use store::{
    Error,
    model::{Exam, Question},
};

/// How a graded exam is turned into pass or fail.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PassingPolicy {
    /// Every question answered correctly
    #[default]
    AllCorrect,
    /// Score (0.0 to 100.0) at or above the threshold
    Percent(f64),
}

impl PassingPolicy {
    /// 100% and above is the same as requiring every answer.
    pub fn from_percent(percent: f64) -> Result<Self, Error> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::Validation(format!(
                "passing percent must be between 0.0 and 100.0, got {percent}"
            )));
        }
        if percent >= 100.0 {
            Ok(PassingPolicy::AllCorrect)
        } else {
            Ok(PassingPolicy::Percent(percent))
        }
    }

    /// The exam's own threshold, if any, takes precedence.
    pub fn for_exam(&self, exam: &Exam) -> PassingPolicy {
        match exam.passing_percent {
            Some(percent) => PassingPolicy::from_percent(percent).unwrap_or(*self),
            None => *self,
        }
    }

    pub fn passes(&self, correct: u32, total: u32) -> bool {
        match self {
            PassingPolicy::AllCorrect => total > 0 && correct == total,
            PassingPolicy::Percent(threshold) => score(correct, total) >= *threshold,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Answer {
    pub question_id: ObjectId,
    pub answer_id: ObjectId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    pub score: f64,
    pub passed: bool,
}

pub fn score(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (correct as f64 / total as f64) * 100.0
}

/// Grades `answers` against the stored correct option of each question.
///
/// Unanswered questions count as wrong. An answer naming a question outside the
/// exam, an option outside its question, or the same question twice is rejected.
pub fn grade_exam(exam: &Exam, answers: &[Answer], policy: PassingPolicy) -> Result<Grade, Error> {
    let mut answered: Vec<&ObjectId> = Vec::with_capacity(answers.len());
    let mut correct: u32 = 0;

    for answer in answers {
        let question = find_question(exam, &answer.question_id)?;

        if answered.contains(&&answer.question_id) {
            return Err(Error::Validation(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }
        answered.push(&answer.question_id);

        if !question.has_option(&answer.answer_id) {
            return Err(Error::Validation(format!(
                "answer {} is not an option of question {}",
                answer.answer_id, question.id
            )));
        }

        if compare_answer(question, &answer.answer_id) {
            correct += 1;
        }
    }

    let total = exam.questions.len() as u32;
    Ok(Grade {
        correct,
        total,
        score: score(correct, total),
        passed: policy.for_exam(exam).passes(correct, total),
    })
}

pub fn compare_answer(question: &Question, answer_id: &ObjectId) -> bool {
    &question.answer == answer_id
}

fn find_question<'e>(exam: &'e Exam, question_id: &ObjectId) -> Result<&'e Question, Error> {
    exam.questions
        .iter()
        .find(|q| &q.id == question_id)
        .ok_or_else(|| {
            Error::Validation(format!(
                "question {} does not belong to exam {}",
                question_id, exam.id
            ))
        })
}
