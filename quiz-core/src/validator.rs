//! Answer matching.
//!
//! An answer is accepted when any entry of the question is the wildcard, or
//! occurs as a substring of the lowercased answer. Containment tolerates
//! extra words ("the strokes forever") and also accepts answers that merely
//! mention an entry ("not six at all").

use crate::question::{AcceptedAnswer, Question, QuestionBank};

/// Check a raw answer against one question.
pub fn matches(question: &Question, raw_answer: &str) -> bool {
    let answer = raw_answer.to_lowercase();

    question.accepted_answers.iter().any(|accepted| match accepted {
        AcceptedAnswer::Any => true,
        AcceptedAnswer::Contains(entry) => answer.contains(&entry.to_lowercase()),
    })
}

impl QuestionBank {
    /// Validate an answer for `question_id`. Unknown ids never validate.
    pub fn validate(&self, question_id: i64, raw_answer: &str) -> bool {
        self.get(question_id)
            .is_some_and(|question| matches(question, raw_answer))
    }
}
