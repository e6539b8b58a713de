//! Quiz core - progress gating and question tokens
//!
//! This crate holds the rules of a sequential quiz: which question a visitor
//! may open, how the URL of each question is protected, and when an answer
//! counts as correct. It has no HTTP or storage code of its own; callers pass
//! in a [`Session`] handle and an [`EventSink`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use quiz_core::{
//!     FixedClock, MemorySession, NullSink, ProgressGate, QuestionBank, SubmitOutcome,
//!     TokenGenerator,
//! };
//!
//! let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
//! let gate = ProgressGate::new(
//!     QuestionBank::default(),
//!     TokenGenerator::new("secret"),
//!     Arc::new(FixedClock(day)),
//! );
//!
//! let mut session = MemorySession::new("visitor-1");
//! let outcome = gate.submit(&mut session, 2, "six", &NullSink).unwrap();
//! assert!(matches!(outcome, SubmitOutcome::Advanced(_)));
//! ```
//!
//! # Modules
//!
//! - [`gate`] - progress state machine
//! - [`token`] - per-session, per-question, per-day tokens
//! - [`validator`] - answer matching
//! - [`question`] - the static bank

pub mod clock;
pub mod error;
pub mod events;
pub mod gate;
pub mod question;
pub mod session;
pub mod token;
pub mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{QuizError, Result};
pub use events::{EventSink, Feedback, NullSink, QuizEvent, RecordingSink};
pub use gate::{
    PROGRESS_KEY, ProgressGate, QuestionAddress, QuestionView, StartView, SubmitOutcome,
    ViewOutcome,
};
pub use question::{AcceptedAnswer, Question, QuestionBank};
pub use session::{MemorySession, Session};
pub use token::{QuestionToken, TokenGenerator};
