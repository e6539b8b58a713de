//! Question access tokens.
//!
//! A token is the SHA-256 of the session id, the question id and a secret
//! suffixed with the calendar day. It is never stored: the gate recomputes
//! it and compares. Because the day is part of the input, every token issued
//! before midnight stops validating after it, and a visitor whose quiz spans
//! midnight is sent back to the start page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded token carried in question URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionToken(String);

impl QuestionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QuestionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for QuestionToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Derives tokens from a shared secret.
#[derive(Clone)]
pub struct TokenGenerator {
    secret: String,
}

impl TokenGenerator {
    /// Create a generator. The secret is combined with the day on each call.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Derive the token for `question_id` within `session_id` on `day`.
    pub fn generate(&self, question_id: u32, session_id: &str, day: NaiveDate) -> QuestionToken {
        let mut hasher = Sha256::new();
        hasher.update(session_id.as_bytes());
        hasher.update(question_id.to_string().as_bytes());
        hasher.update(self.daily_secret(day).as_bytes());
        QuestionToken(hex::encode(hasher.finalize()))
    }

    /// Check `candidate` against the token expected for the same inputs.
    pub fn verify(&self, question_id: u32, session_id: &str, day: NaiveDate, candidate: &str) -> bool {
        self.generate(question_id, session_id, day) == *candidate
    }

    fn daily_secret(&self, day: NaiveDate) -> String {
        format!("{}_{}", self.secret, day.format("%Y-%m-%d"))
    }
}

impl fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("secret", &"<redacted>")
            .finish()
    }
}
