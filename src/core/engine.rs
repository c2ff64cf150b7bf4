//! Scripted conversation engine
//!
//! The engine is a pure transition function over [`ConversationState`]:
//! given a state and one user utterance it returns the system messages to
//! show and the next state. It performs no I/O and never fails; anything
//! it cannot use degrades to a re-prompt or a best-effort recommendation.
//!
//! ```text
//! AwaitingCategory --valid category--> AwaitingQuestion(0)
//! AwaitingQuestion(i) --answer--> AwaitingQuestion(i + 1)   (i + 1 < n)
//! AwaitingQuestion(n - 1) --answer--> Terminal
//! ```

use serde::{Deserialize, Serialize};

use crate::conversation::Transcript;

use super::knowledge::{Answers, Category, Recommendation, CATEGORY_REPROMPT, GREETING};

/// Where a conversation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    AwaitingCategory,
    AwaitingQuestion { index: usize },
    Terminal,
}

/// Complete record of one chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    category: Option<Category>,
    current_question: usize,
    answers: Answers,
    recommendation: Option<Recommendation>,
    transcript: Transcript,
}

impl ConversationState {
    /// Fresh conversation with the greeting already shown
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        transcript.add_system(GREETING);
        Self {
            category: None,
            current_question: 0,
            answers: Answers::new(),
            recommendation: None,
            transcript,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.category, self.recommendation) {
            (None, _) => Phase::AwaitingCategory,
            (Some(_), Some(_)) => Phase::Terminal,
            (Some(_), None) => Phase::AwaitingQuestion {
                index: self.current_question,
            },
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.recommendation
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn say(&mut self, text: &str, out: &mut Vec<String>) {
        self.transcript.add_system(text);
        out.push(text.to_string());
    }

    fn conclude(&mut self, category: Category, out: &mut Vec<String>) {
        let recommendation = category.profile().recommend(&self.answers);
        self.recommendation = Some(recommendation);
        self.say(recommendation.message(), out);
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of one engine step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub messages: Vec<String>,
    pub state: ConversationState,
}

/// Interpret one utterance against the current state
pub fn advance(state: &ConversationState, utterance: &str) -> Turn {
    let unchanged = || Turn {
        messages: Vec::new(),
        state: state.clone(),
    };

    if utterance.trim().is_empty() {
        return unchanged();
    }

    let phase = state.phase();
    if phase == Phase::Terminal {
        tracing::debug!("Ignoring input after recommendation");
        return unchanged();
    }

    let mut next = state.clone();
    let mut messages = Vec::new();
    next.transcript.add_user(utterance);

    match next.category {
        None => match Category::recognize(utterance) {
            Some(category) => {
                next.category = Some(category);
                next.current_question = 0;
                match category.profile().questions.first() {
                    Some(question) => next.say(question, &mut messages),
                    None => next.conclude(category, &mut messages),
                }
            }
            None => next.say(CATEGORY_REPROMPT, &mut messages),
        },
        Some(category) => {
            let questions = category.profile().questions;
            let index = next.current_question;
            next.answers.insert(index, utterance.to_string());

            match questions.get(index + 1) {
                Some(question) => {
                    next.current_question = index + 1;
                    next.say(question, &mut messages);
                }
                None => next.conclude(category, &mut messages),
            }
        }
    }

    tracing::debug!(
        category = next.category().map(Category::name),
        answered = next.answers().len(),
        recommendation = ?next.recommendation(),
        from = ?phase,
        to = ?next.phase(),
        "Conversation advanced"
    );

    Turn {
        messages,
        state: next,
    }
}
