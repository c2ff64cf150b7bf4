//! Conversation engine components
//!
//! The knowledge table holds what the advisor asks and recommends; the
//! engine walks a conversation through it one utterance at a time.

mod engine;
pub mod knowledge;

pub use engine::{advance, ConversationState, Phase};
