pub mod catalog;
pub mod dispatch;
pub mod loader;
pub mod session;
pub mod store;

/// Stable per-user key, as delivered by the messaging transport.
pub type UserId = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

impl Question {
    pub fn new(question: String, options: Vec<String>, answer: String) -> Self {
        Self {
            question,
            options,
            answer,
        }
    }

    /// A question is only worth presenting when it has text, at least one
    /// option, and the recorded answer is one of the options. Anything else
    /// gets skipped by the session, never served.
    pub fn is_valid(&self) -> bool {
        !self.question.is_empty()
            && !self.options.is_empty()
            && self.options.iter().any(|o| o == &self.answer)
    }
}

/// Final tally shown when a quiz ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub score: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub attempted: u32,
    pub elapsed_secs: u64,
}
