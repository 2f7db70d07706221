//! Message and steering types shared by providers and the chat loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions).
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single `{role, content}` entry of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Emotional concept the steering coefficient pushes toward or away from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concept {
    /// Sad (negative) to happy (positive).
    #[default]
    Happiness,
    /// Calm (negative) to angry (positive).
    Anger,
    /// Neutral (negative) to surprised (positive).
    Surprise,
}

impl Concept {
    /// Every selectable concept, in display order.
    pub const ALL: [Concept; 3] = [Concept::Happiness, Concept::Anger, Concept::Surprise];

    /// Lowercase name used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Concept::Happiness => "happiness",
            Concept::Anger => "anger",
            Concept::Surprise => "surprise",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Concept {
    type Err = SteeringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Concept::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SteeringError::UnknownConcept(s.to_string()))
    }
}

/// Errors building a [`SteeringDirective`].
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SteeringError {
    /// Coefficient outside `[MIN_COEFFICIENT, MAX_COEFFICIENT]` or NaN.
    #[error("coefficient {0} outside [-5.0, 5.0]")]
    OutOfRange(f64),

    /// Concept name not recognised.
    #[error("unknown concept: {0}")]
    UnknownConcept(String),
}

/// Lowest accepted steering coefficient.
pub const MIN_COEFFICIENT: f64 = -5.0;

/// Highest accepted steering coefficient.
pub const MAX_COEFFICIENT: f64 = 5.0;

/// Per-turn steering input: a coefficient and the concept it applies to.
///
/// Built once per turn and never mutated while a response streams. The
/// fields are private so every directive in circulation is in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringDirective {
    coefficient: f64,
    concept: Concept,
}

impl SteeringDirective {
    /// Validate and build a directive.
    pub fn new(coefficient: f64, concept: Concept) -> Result<Self, SteeringError> {
        if !(MIN_COEFFICIENT..=MAX_COEFFICIENT).contains(&coefficient) {
            return Err(SteeringError::OutOfRange(coefficient));
        }
        Ok(Self {
            coefficient,
            concept,
        })
    }

    /// A zero-coefficient directive (no steering).
    pub fn neutral(concept: Concept) -> Self {
        Self {
            coefficient: 0.0,
            concept,
        }
    }

    /// The steering coefficient, in `[-5.0, 5.0]`.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// The concept being steered.
    pub fn concept(&self) -> Concept {
        self.concept
    }

    /// Same concept, new coefficient.
    pub fn with_coefficient(self, coefficient: f64) -> Result<Self, SteeringError> {
        Self::new(coefficient, self.concept)
    }

    /// Same coefficient, new concept.
    pub fn with_concept(self, concept: Concept) -> Self {
        Self { concept, ..self }
    }
}

impl Default for SteeringDirective {
    fn default() -> Self {
        Self::neutral(Concept::default())
    }
}

impl fmt::Display for SteeringDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+.1}", self.concept, self.coefficient)
    }
}

/// Request sent to a provider for one turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model to use (None = provider default).
    pub model: Option<String>,
    /// Conversation so far, ending with the pending user message.
    pub messages: Vec<ChatMessage>,
    /// Steering for this turn. Backends without steering ignore it.
    pub steering: SteeringDirective,
}
