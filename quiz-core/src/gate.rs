//! Progress gate.
//!
//! Each session carries a single integer under [`PROGRESS_KEY`]: the highest
//! question the visitor may open. It starts at 1 (absent), grows by one on
//! every correct answer and reaches `N + 1` once the last question is
//! answered. Only [`ProgressGate::reset`] lowers it.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::clock::Clock;
use crate::error::{QuizError, Result};
use crate::events::{EventSink, QuizEvent};
use crate::question::{Question, QuestionBank};
use crate::session::Session;
use crate::token::{QuestionToken, TokenGenerator};

/// Session key holding the allowed question.
pub const PROGRESS_KEY: &str = "quiz_progress";

/// A question id paired with the token that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAddress {
    pub question_id: u32,
    pub token: QuestionToken,
}

/// Everything needed to render the start page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartView {
    pub first_token: QuestionToken,
    /// Allowed question, clamped to the bank.
    pub progress: u32,
    /// Set when the visitor already got past question 1.
    pub resume: Option<QuestionAddress>,
}

/// A question the visitor is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub question: &'static Question,
    pub total: u32,
    pub progress_percent: u32,
    pub token: QuestionToken,
}

/// Result of opening a question URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Show(QuestionView),
    /// Unknown question or forged token.
    RedirectToStart,
    /// The visitor asked for a question beyond their progress.
    RedirectToQuestion(QuestionAddress),
}

/// Result of a well-formed answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Incorrect,
    Advanced(QuestionAddress),
    Completed,
}

/// Enforces sequential access and advances progress.
#[derive(Clone)]
pub struct ProgressGate {
    bank: QuestionBank,
    tokens: TokenGenerator,
    clock: Arc<dyn Clock>,
}

impl ProgressGate {
    pub fn new(bank: QuestionBank, tokens: TokenGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            bank,
            tokens,
            clock,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Token for `question_id` in this session, for today.
    pub fn token_for(&self, question_id: u32, session: &dyn Session) -> QuestionToken {
        self.tokens
            .generate(question_id, session.id(), self.clock.today())
    }

    fn address(&self, question_id: u32, session: &dyn Session) -> QuestionAddress {
        QuestionAddress {
            question_id,
            token: self.token_for(question_id, session),
        }
    }

    fn raw_progress(&self, session: &dyn Session) -> i64 {
        session.get_i64(PROGRESS_KEY, 1)
    }

    /// Highest question the session may open, within `1..=N`.
    pub fn allowed_question(&self, session: &dyn Session) -> u32 {
        let last = i64::from(self.bank.len().max(1));
        self.raw_progress(session).clamp(1, last) as u32
    }

    /// Whether the final question has been answered.
    pub fn is_completed(&self, session: &dyn Session) -> bool {
        self.raw_progress(session) > i64::from(self.bank.len())
    }

    /// Forget all progress for the session.
    pub fn reset(&self, session: &mut dyn Session) {
        debug!("Resetting progress for session {}", session.id());
        session.remove(PROGRESS_KEY);
    }

    /// Landing page state, optionally resetting first.
    pub fn start(&self, session: &mut dyn Session, reset: bool, events: &dyn EventSink) -> StartView {
        if reset {
            self.reset(session);
        }

        let progress = self.allowed_question(session);
        let resume = (progress > 1).then(|| self.address(progress, session));
        if resume.is_some() {
            events.record(QuizEvent::SessionResumed {
                question_id: progress,
            });
        }

        StartView {
            first_token: self.token_for(1, session),
            progress,
            resume,
        }
    }

    /// Decide what to do with a request for `/question/{id}/{token}`.
    pub fn view(
        &self,
        session: &dyn Session,
        id: i64,
        token: &str,
        events: &dyn EventSink,
    ) -> ViewOutcome {
        let Some(question) = self.bank.get(id) else {
            debug!("Question {} out of range", id);
            return ViewOutcome::RedirectToStart;
        };

        let expected = self.token_for(question.id, session);
        if expected != *token {
            debug!("Token mismatch for question {} in session {}", id, session.id());
            return ViewOutcome::RedirectToStart;
        }

        let allowed = self.allowed_question(session);
        if question.id > allowed {
            debug!(
                "Question {} not unlocked yet for session {}, sending to {}",
                question.id,
                session.id(),
                allowed
            );
            return ViewOutcome::RedirectToQuestion(self.address(allowed, session));
        }

        events.record(QuizEvent::QuestionDisplayed {
            question_id: question.id,
        });

        let total = self.bank.len();
        ViewOutcome::Show(QuestionView {
            question,
            total,
            progress_percent: (f64::from(question.id) / f64::from(total) * 100.0).round() as u32,
            token: expected,
        })
    }

    /// Evaluate an answer and advance progress when it is correct.
    ///
    /// Malformed input is an error and leaves the session untouched.
    pub fn submit(
        &self,
        session: &mut dyn Session,
        id: i64,
        answer: &str,
        events: &dyn EventSink,
    ) -> Result<SubmitOutcome> {
        let Some(question) = self.bank.get(id) else {
            return Err(QuizError::InvalidQuestion(id));
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(QuizError::EmptyAnswer);
        }

        let correct = self.bank.validate(id, answer);
        events.record(QuizEvent::AnswerSubmitted {
            question_id: question.id,
            answer: answer.to_string(),
            correct,
        });

        if !correct {
            return Ok(SubmitOutcome::Incorrect);
        }

        events.record(QuizEvent::QuestionValidated {
            question_id: question.id,
        });

        let next = i64::from(question.id) + 1;
        if next > self.raw_progress(session) {
            session.set(PROGRESS_KEY, json!(next));
        }
        debug!(
            "Session {} progress now {}",
            session.id(),
            self.raw_progress(session)
        );

        if question.id == self.bank.len() {
            events.record(QuizEvent::QuizCompleted);
            return Ok(SubmitOutcome::Completed);
        }

        Ok(SubmitOutcome::Advanced(
            self.address(question.id + 1, session),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::events::RecordingSink;
    use crate::session::MemorySession;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn gate() -> ProgressGate {
        ProgressGate::new(
            QuestionBank::default(),
            TokenGenerator::new("test-secret"),
            Arc::new(FixedClock(today())),
        )
    }

    const ANSWERS: [&str; 4] = ["20/05/2017", "six", "the strokes", "mou"];

    #[test]
    fn test_fresh_session_starts_at_one() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        let start = gate.start(&mut session, false, &sink);
        assert_eq!(start.progress, 1);
        assert!(start.resume.is_none());
        assert_eq!(start.first_token, gate.token_for(1, &session));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_view_renders_allowed_question() {
        let gate = gate();
        let session = MemorySession::new("s1");
        let sink = RecordingSink::new();
        let token = gate.token_for(1, &session);

        match gate.view(&session, 1, token.as_str(), &sink) {
            ViewOutcome::Show(view) => {
                assert_eq!(view.question.id, 1);
                assert_eq!(view.total, 4);
                assert_eq!(view.progress_percent, 25);
                assert_eq!(view.token, token);
            }
            other => panic!("Expected Show, got {:?}", other),
        }
        assert_eq!(sink.kinds(), vec!["QUESTION_DISPLAYED"]);
    }

    #[test]
    fn test_view_out_of_range_goes_to_start() {
        let gate = gate();
        let session = MemorySession::new("s1");
        let sink = RecordingSink::new();
        let token = gate.token_for(1, &session);

        assert_eq!(
            gate.view(&session, 0, token.as_str(), &sink),
            ViewOutcome::RedirectToStart
        );
        assert_eq!(
            gate.view(&session, 5, token.as_str(), &sink),
            ViewOutcome::RedirectToStart
        );
    }

    #[test]
    fn test_view_rejects_forged_token() {
        let gate = gate();
        let session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        assert_eq!(
            gate.view(&session, 1, "deadbeef", &sink),
            ViewOutcome::RedirectToStart
        );
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_token_from_other_session_rejected() {
        let gate = gate();
        let session_a = MemorySession::new("session-a");
        let session_b = MemorySession::new("session-b");
        let sink = RecordingSink::new();
        let token_a = gate.token_for(1, &session_a);

        assert_eq!(
            gate.view(&session_b, 1, token_a.as_str(), &sink),
            ViewOutcome::RedirectToStart
        );
    }

    #[test]
    fn test_skipping_ahead_redirects_to_allowed() {
        let gate = gate();
        let session = MemorySession::new("s1");
        let sink = RecordingSink::new();
        let token_three = gate.token_for(3, &session);

        match gate.view(&session, 3, token_three.as_str(), &sink) {
            ViewOutcome::RedirectToQuestion(address) => {
                assert_eq!(address.question_id, 1);
                assert_eq!(address.token, gate.token_for(1, &session));
            }
            other => panic!("Expected redirect, got {:?}", other),
        }
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_correct_answer_advances() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        let outcome = gate.submit(&mut session, 1, "  20 mai 2017 ", &sink).unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Advanced(QuestionAddress {
                question_id: 2,
                token: gate.token_for(2, &session),
            })
        );
        assert_eq!(gate.allowed_question(&session), 2);
        assert_eq!(sink.kinds(), vec!["ANSWER_SUBMITTED", "QUESTION_VALIDATED"]);
    }

    #[test]
    fn test_incorrect_answer_keeps_progress() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        let outcome = gate.submit(&mut session, 2, "5", &sink).unwrap();
        assert_eq!(outcome, SubmitOutcome::Incorrect);
        assert!(session.is_empty());
        assert_eq!(
            sink.events(),
            vec![QuizEvent::AnswerSubmitted {
                question_id: 2,
                answer: "5".to_string(),
                correct: false,
            }]
        );
    }

    #[test]
    fn test_invalid_submissions_are_rejected() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        assert_eq!(
            gate.submit(&mut session, 0, "six", &sink),
            Err(QuizError::InvalidQuestion(0))
        );
        assert_eq!(
            gate.submit(&mut session, 5, "six", &sink),
            Err(QuizError::InvalidQuestion(5))
        );
        assert_eq!(
            gate.submit(&mut session, 1, "   \t\n", &sink),
            Err(QuizError::EmptyAnswer)
        );
        assert!(session.is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_full_run_completes() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        for (idx, answer) in ANSWERS.iter().enumerate() {
            let id = idx as i64 + 1;
            let outcome = gate.submit(&mut session, id, answer, &sink).unwrap();
            if id == 4 {
                assert_eq!(outcome, SubmitOutcome::Completed);
            } else {
                assert!(matches!(outcome, SubmitOutcome::Advanced(ref a) if a.question_id as i64 == id + 1));
            }
        }

        assert!(gate.is_completed(&session));
        assert_eq!(gate.allowed_question(&session), 4);
        assert_eq!(sink.kinds().last(), Some(&"QUIZ_COMPLETED"));
    }

    #[test]
    fn test_progress_never_decreases() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        gate.submit(&mut session, 1, ANSWERS[0], &sink).unwrap();
        gate.submit(&mut session, 2, ANSWERS[1], &sink).unwrap();
        assert_eq!(gate.allowed_question(&session), 3);

        // Answering an earlier question again must not roll progress back.
        gate.submit(&mut session, 1, ANSWERS[0], &sink).unwrap();
        assert_eq!(gate.allowed_question(&session), 3);

        gate.submit(&mut session, 3, "wrong", &sink).unwrap();
        assert_eq!(gate.allowed_question(&session), 3);
    }

    #[test]
    fn test_reset_returns_to_start_and_resume() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        gate.submit(&mut session, 1, ANSWERS[0], &sink).unwrap();
        gate.submit(&mut session, 2, ANSWERS[1], &sink).unwrap();

        let start = gate.start(&mut session, false, &sink);
        assert_eq!(start.progress, 3);
        assert_eq!(start.resume.map(|a| a.question_id), Some(3));
        assert_eq!(sink.kinds().last(), Some(&"SESSION_RESUMED"));

        let start = gate.start(&mut session, true, &sink);
        assert_eq!(start.progress, 1);
        assert!(start.resume.is_none());
        assert!(session.get(PROGRESS_KEY).is_none());
    }

    #[test]
    fn test_garbage_progress_is_clamped() {
        let gate = gate();
        let mut session = MemorySession::new("s1");
        session.set(PROGRESS_KEY, json!(-7));
        assert_eq!(gate.allowed_question(&session), 1);
        session.set(PROGRESS_KEY, json!(99));
        assert_eq!(gate.allowed_question(&session), 4);
    }

    struct SteppingClock(Mutex<NaiveDate>);

    impl Clock for SteppingClock {
        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn test_token_issued_yesterday_sends_back_to_start() {
        let clock = Arc::new(SteppingClock(Mutex::new(today())));
        let gate = ProgressGate::new(
            QuestionBank::default(),
            TokenGenerator::new("test-secret"),
            clock.clone(),
        );
        let mut session = MemorySession::new("s1");
        let sink = RecordingSink::new();

        let SubmitOutcome::Advanced(next) = gate.submit(&mut session, 1, ANSWERS[0], &sink).unwrap()
        else {
            panic!("Expected advance");
        };

        *clock.0.lock().unwrap() = today().succ_opt().unwrap();
        assert_eq!(
            gate.view(&session, 2, next.token.as_str(), &sink),
            ViewOutcome::RedirectToStart
        );

        // Progress survives; only the link went stale.
        let fresh = gate.token_for(2, &session);
        assert!(matches!(
            gate.view(&session, 2, fresh.as_str(), &sink),
            ViewOutcome::Show(_)
        ));
    }
}
