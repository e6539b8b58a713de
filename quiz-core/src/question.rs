//! Static question bank.

/// One accepted answer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedAnswer {
    /// Matches any non-empty answer.
    Any,
    /// Matches when the text occurs anywhere in the answer, ignoring case.
    Contains(&'static str),
}

impl AcceptedAnswer {
    /// Parse a bank entry, treating `*` as the wildcard.
    pub const fn from_entry(entry: &'static str) -> Self {
        if entry.len() == 1 && entry.as_bytes()[0] == b'*' {
            AcceptedAnswer::Any
        } else {
            AcceptedAnswer::Contains(entry)
        }
    }
}

/// A quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 1-based position in the bank.
    pub id: u32,
    /// Prompt shown to the user.
    pub text: &'static str,
    /// Entries checked in order by the validator.
    pub accepted_answers: &'static [AcceptedAnswer],
}

static QUESTIONS: [Question; 4] = [
    Question {
        id: 1,
        text: "Le jour où l'on s'est vus pour la première fois ?",
        accepted_answers: &[
            AcceptedAnswer::from_entry("20/05/2017"),
            AcceptedAnswer::from_entry("20-05-2017"),
            AcceptedAnswer::from_entry("20 05 2017"),
            AcceptedAnswer::from_entry("20 mai 2017"),
        ],
    },
    Question {
        id: 2,
        text: "Le nombre de pays qu'on a vus ensemble ?",
        accepted_answers: &[
            AcceptedAnswer::from_entry("6"),
            AcceptedAnswer::from_entry("six"),
        ],
    },
    Question {
        id: 3,
        text: "Un groupe qu'on adorait tous les deux avant de se connaître ?",
        accepted_answers: &[
            AcceptedAnswer::from_entry("strokes"),
            AcceptedAnswer::from_entry("the strokes"),
        ],
    },
    Question {
        id: 4,
        text: "L'expression qui te définit le mieux pour moi (comment je t'appelle) ?",
        accepted_answers: &[
            AcceptedAnswer::from_entry("mou"),
            AcceptedAnswer::from_entry("légendaire"),
            AcceptedAnswer::from_entry("mou légendaire"),
        ],
    },
];

/// Ordered, immutable set of questions.
///
/// Question ids are contiguous and start at 1, so the bank's length is also
/// the id of the final question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionBank {
    questions: &'static [Question],
}

impl QuestionBank {
    /// Wrap a static slice of questions. Ids must be `1..=len` in order.
    pub const fn new(questions: &'static [Question]) -> Self {
        Self { questions }
    }

    /// Number of questions, also the id of the last one.
    pub fn len(&self) -> u32 {
        self.questions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Whether `id` names a question in this bank.
    pub fn contains(&self, id: i64) -> bool {
        id >= 1 && id <= i64::from(self.len())
    }

    /// Look up a question by id.
    pub fn get(&self, id: i64) -> Option<&'static Question> {
        if !self.contains(id) {
            return None;
        }
        self.questions.get((id - 1) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Question> {
        self.questions.iter()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(&QUESTIONS)
    }
}
