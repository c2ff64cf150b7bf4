//! Built-in insurance knowledge table
//!
//! Each [`Category`] maps to a static [`CategoryProfile`]: the ordered
//! questions asked for that product and the rule that turns the collected
//! answers into a [`Recommendation`]. The table is compiled in and never
//! changes at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Answers keyed by the index of the question they respond to
pub type Answers = BTreeMap<usize, String>;

/// Opening message of every conversation
pub const GREETING: &str =
    "Hello! I'm your AI Insurance Advisor. What type of insurance are you interested in? (health/life)";

/// Sent when the first reply does not name a known category
pub const CATEGORY_REPROMPT: &str = "Please specify either 'health' or 'life' insurance.";

/// Insurance product a conversation is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Life,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Health, Category::Life];

    pub fn name(self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Life => "life",
        }
    }

    /// Match a raw reply against the category names, ignoring case only
    pub fn recognize(utterance: &str) -> Option<Self> {
        let folded = utterance.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == folded)
    }

    pub fn profile(self) -> &'static CategoryProfile {
        match self {
            Category::Health => &HEALTH,
            Category::Life => &LIFE,
        }
    }
}

/// Questions and decision rule for one category
pub struct CategoryProfile {
    pub questions: &'static [&'static str],
    pub rule: fn(&Answers) -> Recommendation,
}

impl CategoryProfile {
    pub fn recommend(&self, answers: &Answers) -> Recommendation {
        (self.rule)(answers)
    }
}

static HEALTH: CategoryProfile = CategoryProfile {
    questions: &[
        "What's your age?",
        "Do you have any pre-existing conditions?",
        "What's your preferred deductible range?",
    ],
    rule: health_rule,
};

static LIFE: CategoryProfile = CategoryProfile {
    questions: &[
        "Are you married?",
        "Do you have dependents?",
        "What's your annual income?",
    ],
    rule: life_rule,
};

const HEALTH_AGE_QUESTION: usize = 0;
const LIFE_DEPENDENTS_QUESTION: usize = 1;

/// Canned outcome of a finished conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    HealthYoung,
    HealthMiddle,
    HealthSenior,
    /// The age answer held no leading integer
    HealthAgeUnreadable,
    LifeSingle,
    LifeFamily,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::HealthYoung => {
                "Based on your profile, we recommend a high-deductible health plan (HDHP) with an HSA."
            }
            Recommendation::HealthMiddle => {
                "A PPO plan might be best suited for your needs, offering flexibility and comprehensive coverage."
            }
            Recommendation::HealthSenior => {
                "Consider a Medicare Advantage plan with prescription drug coverage."
            }
            Recommendation::HealthAgeUnreadable => {
                "We couldn't read your age as a number, so we can't recommend a health plan yet. Please start a new chat and enter your age in years."
            }
            Recommendation::LifeSingle => {
                "A term life insurance policy with 10x your annual income is recommended."
            }
            Recommendation::LifeFamily => {
                "Consider a whole life insurance policy with additional riders for family protection."
            }
        }
    }
}

fn health_rule(answers: &Answers) -> Recommendation {
    let age = answers
        .get(&HEALTH_AGE_QUESTION)
        .and_then(|a| parse_leading_int(a));

    match age {
        None => Recommendation::HealthAgeUnreadable,
        Some(age) if age < 30 => Recommendation::HealthYoung,
        Some(age) if age < 60 => Recommendation::HealthMiddle,
        Some(_) => Recommendation::HealthSenior,
    }
}

fn life_rule(answers: &Answers) -> Recommendation {
    let has_dependents = answers
        .get(&LIFE_DEPENDENTS_QUESTION)
        .is_some_and(|a| a.to_lowercase() == "yes");

    if has_dependents {
        Recommendation::LifeFamily
    } else {
        Recommendation::LifeSingle
    }
}

/// Lenient integer parse: leading whitespace, an optional sign, then as
/// many decimal digits as follow. Trailing text is ignored, so "42 years"
/// reads as 42.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    // Saturate rather than fail on absurdly long digit runs.
    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
