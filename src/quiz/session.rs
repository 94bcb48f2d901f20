use std::time::Instant;

use log::warn;

use crate::quiz::{Question, Summary, UserId};

/// One user's quiz in flight. Owned by the `SessionStore`; nothing else keeps
/// a long-lived handle to it, so every transition happens under the store's
/// per-user lock.
#[derive(Debug)]
pub struct Session {
    user_id: UserId,
    questions: Vec<Question>,
    cursor: usize,
    score: u32,
    correct: u32,
    incorrect: u32,
    attempted: u32,
    started_at: Instant,
    last_presented: Option<i64>,
}

/// What the quiz shows next after a transition. `skipped` counts the
/// malformed questions jumped over on the way there so the caller can
/// surface a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Question {
        question: Question,
        index: usize,
        total: usize,
        skipped: usize,
    },
    Complete {
        summary: Summary,
        skipped: usize,
    },
}

/// Verdict on a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub correct_answer: String,
}

impl Session {
    /// The questions are the caller's already-shuffled snapshot; their order
    /// never changes for the lifetime of the session.
    pub fn new(user_id: UserId, questions: Vec<Question>) -> Self {
        Self {
            user_id,
            questions,
            cursor: 0,
            score: 0,
            correct: 0,
            incorrect: 0,
            attempted: 0,
            started_at: Instant::now(),
            last_presented: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    /// Finds the next presentable question. Malformed entries are skipped in
    /// a forward-only loop (the cursor never moves back, so this terminates
    /// after at most `questions.len()` steps) without touching any counter.
    pub fn advance(&mut self) -> Advance {
        let mut skipped = 0;
        while let Some(question) = self.questions.get(self.cursor) {
            if question.is_valid() {
                return Advance::Question {
                    question: question.clone(),
                    index: self.cursor,
                    total: self.questions.len(),
                    skipped,
                };
            }
            warn!(
                "user {}: skipping malformed question at position {}",
                self.user_id, self.cursor
            );
            self.cursor += 1;
            skipped += 1;
        }
        Advance::Complete {
            summary: self.summary(),
            skipped,
        }
    }

    /// Scores the answer against the current question and moves on. Returns
    /// `None` when the quiz is already over -- a duplicate tap that lost the
    /// race must not touch any counter.
    pub fn submit_answer(&mut self, selected: &str) -> Option<(Feedback, Advance)> {
        let question = self.questions.get(self.cursor)?;
        let correct = selected == question.answer;
        let correct_answer = question.answer.clone();

        self.attempted += 1;
        if correct {
            self.score += 1;
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.cursor += 1;

        Some((
            Feedback {
                correct,
                correct_answer,
            },
            self.advance(),
        ))
    }

    /// Passes on the current question without scoring it.
    pub fn skip(&mut self) -> Option<Advance> {
        if self.is_complete() {
            return None;
        }
        self.cursor += 1;
        Some(self.advance())
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.score,
            correct: self.correct,
            incorrect: self.incorrect,
            attempted: self.attempted,
            elapsed_secs: self.started_at.elapsed().as_secs_f64().round() as u64,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Opaque handle to the last question view the transport rendered (for
    /// Telegram that is a message id). Lets the adapter edit or re-render
    /// the same message instead of posting a fresh one.
    pub fn last_presented(&self) -> Option<i64> {
        self.last_presented
    }

    pub fn set_last_presented(&mut self, handle: i64) {
        self.last_presented = Some(handle);
    }
}
