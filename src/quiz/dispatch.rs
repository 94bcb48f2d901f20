use std::sync::Arc;

use log::{error, warn};
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::quiz::catalog::{Category, TopicCatalog, TopicEntry};
use crate::quiz::loader::{self, LoadError};
use crate::quiz::session::Advance;
use crate::quiz::store::SessionStore;
use crate::quiz::{Question, Summary, UserId};

/// Inbound action, already stripped of any transport detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ShowMenu,
    SelectCategory(Category),
    SelectTopic(Category, String),
    SubmitAnswer(String),
    SkipQuestion,
}

/// One view for the transport to render. A single event can produce a short
/// ordered sequence of these (answer feedback followed by the next question,
/// or a summary followed by the menu).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    MainMenu,
    CategoryMenu {
        category: Category,
        entries: Vec<TopicEntry>,
    },
    QuizStarted {
        title: String,
    },
    QuestionView {
        question: Question,
        index: usize,
        total: usize,
    },
    AnswerFeedback {
        correct: bool,
        correct_answer: String,
    },
    QuizSummary(Summary),
    Error(ErrorKind),
}

/// User-scoped failures. None of these ever aborts the process; the worst
/// case is one user being sent back to the menu.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("topic not found")]
    TopicNotFound,
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Soft diagnostic: this many malformed questions were skipped on the
    /// way to the accompanying view. The quiz keeps going.
    #[error("skipped {0} malformed question(s)")]
    InvalidQuestion(usize),
    #[error("no quiz in progress")]
    SessionNotFound,
}

fn push_skip_diagnostic(outcomes: &mut Vec<Outcome>, skipped: usize) {
    if skipped > 0 {
        outcomes.push(Outcome::Error(ErrorKind::InvalidQuestion(skipped)));
    }
}

/// Routes events to the catalog, loader and session store. Knows nothing
/// about the chat transport.
pub struct Dispatcher {
    catalog: Arc<TopicCatalog>,
    store: SessionStore,
}

impl Dispatcher {
    pub fn new(catalog: Arc<TopicCatalog>) -> Self {
        Self {
            catalog,
            store: SessionStore::new(),
        }
    }

    /// Records the transport's handle to the question view it just rendered
    /// so a later event for the same user can reuse it.
    pub async fn note_presented(&self, user_id: UserId, handle: i64) {
        if let Some(session) = self.store.get(user_id) {
            session.lock().await.set_last_presented(handle);
        }
    }

    pub async fn handle(&self, user_id: UserId, event: Event) -> Vec<Outcome> {
        match event {
            Event::ShowMenu => vec![Outcome::MainMenu],
            Event::SelectCategory(category) => vec![Outcome::CategoryMenu {
                category,
                entries: self.catalog.list(category).to_vec(),
            }],
            Event::SelectTopic(category, id) => self.start_quiz(user_id, category, &id).await,
            Event::SubmitAnswer(option) => self.submit_answer(user_id, &option).await,
            Event::SkipQuestion => self.skip_question(user_id).await,
        }
    }

    async fn start_quiz(&self, user_id: UserId, category: Category, id: &str) -> Vec<Outcome> {
        let Some(entry) = self.catalog.resolve(category, id) else {
            warn!("user {}: unknown topic {}/{}", user_id, category.code(), id);
            return vec![Outcome::Error(ErrorKind::TopicNotFound), Outcome::MainMenu];
        };
        let title = entry.title.clone();
        let path = entry.path.clone();

        // The file read runs off the async workers so one slow topic file
        // cannot stall events from other users.
        let loaded = tokio::task::spawn_blocking(move || loader::load(&path)).await;
        let mut questions = match loaded {
            Ok(Ok(questions)) => questions,
            Ok(Err(err)) => {
                warn!("user {}: failed to load topic '{}': {}", user_id, id, err);
                return vec![Outcome::Error(err.into()), Outcome::MainMenu];
            }
            Err(err) => {
                error!("topic load task for '{}' failed: {}", id, err);
                let err = LoadError::Malformed("load task failed".to_string());
                return vec![Outcome::Error(err.into()), Outcome::MainMenu];
            }
        };

        // Uniform unseeded shuffle; two runs over the same topic rarely
        // present the same order.
        questions.shuffle(&mut thread_rng());

        let session = self.store.start(user_id, questions);
        let next = session.lock().await.advance();

        let mut outcomes = vec![Outcome::QuizStarted { title }];
        match next {
            Advance::Question {
                question,
                index,
                total,
                skipped,
            } => {
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuestionView {
                    question,
                    index,
                    total,
                });
            }
            Advance::Complete { summary, skipped } => {
                // Unreachable with a well-behaved loader (it rejects sets
                // with no valid question), kept as a safe landing.
                self.store.end_if(user_id, &session);
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuizSummary(summary));
                outcomes.push(Outcome::MainMenu);
            }
        }
        outcomes
    }

    async fn submit_answer(&self, user_id: UserId, option: &str) -> Vec<Outcome> {
        let Some(session) = self.store.get(user_id) else {
            return vec![Outcome::Error(ErrorKind::SessionNotFound)];
        };
        let Some((feedback, next)) = session.lock().await.submit_answer(option) else {
            // Duplicate tap that lost the race against quiz completion.
            return vec![Outcome::Error(ErrorKind::SessionNotFound)];
        };

        let mut outcomes = vec![Outcome::AnswerFeedback {
            correct: feedback.correct,
            correct_answer: feedback.correct_answer,
        }];
        match next {
            Advance::Question {
                question,
                index,
                total,
                skipped,
            } => {
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuestionView {
                    question,
                    index,
                    total,
                });
            }
            Advance::Complete { summary, skipped } => {
                // Only tear down the session this transition ran on; a
                // replacement started in the meantime must survive.
                self.store.end_if(user_id, &session);
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuizSummary(summary));
                outcomes.push(Outcome::MainMenu);
            }
        }
        outcomes
    }

    async fn skip_question(&self, user_id: UserId) -> Vec<Outcome> {
        let Some(session) = self.store.get(user_id) else {
            return vec![Outcome::Error(ErrorKind::SessionNotFound)];
        };
        let Some(next) = session.lock().await.skip() else {
            return vec![Outcome::Error(ErrorKind::SessionNotFound)];
        };

        let mut outcomes = Vec::new();
        match next {
            Advance::Question {
                question,
                index,
                total,
                skipped,
            } => {
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuestionView {
                    question,
                    index,
                    total,
                });
            }
            Advance::Complete { summary, skipped } => {
                self.store.end_if(user_id, &session);
                push_skip_diagnostic(&mut outcomes, skipped);
                outcomes.push(Outcome::QuizSummary(summary));
                outcomes.push(Outcome::MainMenu);
            }
        }
        outcomes
    }
}
