//! REPL input parsing.
//!
//! Lines starting with `/` are commands; anything else is a prompt and is
//! sent as typed. A doubled `//` sends the rest of the line, starting with
//! a single `/`, as a prompt.

use repe_turn::{Concept, SteeringDirective, SteeringError};
use thiserror::Error;

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send this text as the next user message.
    Prompt(String),
    /// `/coef <value>`: change the steering coefficient.
    SetCoefficient(f64),
    /// `/concept <name>`: change the steering concept.
    SetConcept(Concept),
    /// `/reset`: forget the conversation.
    Reset,
    /// `/history`: print the conversation so far.
    History,
    /// `/help`: list commands.
    Help,
    /// `/quit` or `/exit`: leave.
    Quit,
    /// Blank line.
    Empty,
}

/// A `/` line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The command name is not known.
    #[error("unknown command /{0}, try /help")]
    Unknown(String),
    /// The command needs an argument.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// The argument is not a number.
    #[error("not a number: {0}")]
    NotANumber(String),
    /// The argument is outside the accepted steering range or vocabulary.
    #[error(transparent)]
    Steering(#[from] SteeringError),
}

/// Usage lines shown by `/help`.
pub const HELP: &[(&str, &str)] = &[
    ("/coef <value>", "set the steering coefficient, -5.0 to 5.0"),
    ("/concept <name>", "happiness, anger or surprise"),
    ("/reset", "start a new conversation"),
    ("/history", "show the conversation so far"),
    ("/help", "show this list"),
    ("/quit", "exit"),
    ("//text", "send \"/text\" as a prompt"),
];

impl Command {
    /// Parse one input line. The coefficient is range-checked here.
    ///
    /// Only the line terminator is stripped from prompts.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        let trimmed = line.trim_start();
        if trimmed.trim_end().is_empty() {
            return Ok(Command::Empty);
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Command::Prompt(line.to_string()));
        };
        if rest.starts_with('/') {
            return Ok(Command::Prompt(rest.to_string()));
        }

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();

        match name.as_str() {
            "coef" | "coefficient" => {
                let raw = arg.ok_or(CommandError::Usage("/coef <value>"))?;
                let value: f64 = raw
                    .parse()
                    .map_err(|_| CommandError::NotANumber(raw.to_string()))?;
                SteeringDirective::default().with_coefficient(value)?;
                Ok(Command::SetCoefficient(value))
            }
            "concept" | "emotion" => {
                let raw = arg.ok_or(CommandError::Usage("/concept <name>"))?;
                Ok(Command::SetConcept(raw.parse()?))
            }
            "reset" | "clear" => Ok(Command::Reset),
            "history" => Ok(Command::History),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
