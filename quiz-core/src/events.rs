//! Activity events emitted by the gate and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Feedback left on the final page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Positive,
    Negative,
}

impl Feedback {
    /// Anything other than `"positive"` counts as negative.
    pub fn from_label(label: &str) -> Self {
        if label == "positive" {
            Feedback::Positive
        } else {
            Feedback::Negative
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feedback::Positive => "Mais trop (positif)",
            Feedback::Negative => "Mouis, c'est un peu le malaise (négatif)",
        }
    }
}

/// Something worth a line in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizEvent {
    QuestionDisplayed { question_id: u32 },
    AnswerSubmitted { question_id: u32, answer: String, correct: bool },
    QuestionValidated { question_id: u32 },
    QuizCompleted,
    SessionResumed { question_id: u32 },
    FeedbackSubmitted { feedback: Feedback },
    ButtonClicked { button: String, page: String },
}

impl QuizEvent {
    /// Upper-case tag written before the message.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizEvent::QuestionDisplayed { .. } => "QUESTION_DISPLAYED",
            QuizEvent::AnswerSubmitted { .. } => "ANSWER_SUBMITTED",
            QuizEvent::QuestionValidated { .. } => "QUESTION_VALIDATED",
            QuizEvent::QuizCompleted => "QUIZ_COMPLETED",
            QuizEvent::SessionResumed { .. } => "SESSION_RESUMED",
            QuizEvent::FeedbackSubmitted { .. } => "FEEDBACK_SUBMITTED",
            QuizEvent::ButtonClicked { .. } => "BUTTON_CLICKED",
        }
    }

    pub fn message(&self) -> String {
        match self {
            QuizEvent::QuestionDisplayed { question_id } => {
                format!("Question {} displayed", question_id)
            }
            QuizEvent::AnswerSubmitted {
                question_id,
                answer,
                correct,
            } => {
                let status = if *correct { "correct" } else { "incorrect" };
                format!("Question {} answered '{}' ({})", question_id, answer, status)
            }
            QuizEvent::QuestionValidated { question_id } => {
                format!("Question {} validated, moving to next", question_id)
            }
            QuizEvent::QuizCompleted => "Quiz completed successfully".to_string(),
            QuizEvent::SessionResumed { question_id } => {
                format!("Session resumed at question {}", question_id)
            }
            QuizEvent::FeedbackSubmitted { feedback } => {
                format!("User feedback: {}", feedback.description())
            }
            QuizEvent::ButtonClicked { button, page } => {
                format!("Button '{}' clicked on page '{}'", button, page)
            }
        }
    }
}

/// Receives events. Implementations must not block and must swallow their
/// own failures.
pub trait EventSink: Send + Sync {
    fn record(&self, event: QuizEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: QuizEvent) {}
}

/// Keeps events in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<QuizEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<QuizEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(QuizEvent::kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: QuizEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
