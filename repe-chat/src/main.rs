//! `repe-chat`: chat with a steering-enabled model from the terminal.
//!
//! Run with a `secrets.toml` next to the binary, or pass `--config`:
//!
//! ```text
//! MODEL_ENDPOINT = "http://localhost:8000/v1/chat/completions"
//! OPENAI_API_KEY = "sk-..."
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=repe_chat=debug` to see requests.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use repe_chat::command::HELP;
use repe_chat::config::DEFAULT_CONFIG_PATH;
use repe_chat::{ChatBackend, ChatConfig, Command, ConfigError, TurnError, run_turn};
use repe_turn::{Backend, Concept, ConversationState, SteeringDirective};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "repe-chat",
    version,
    about = "Chat with a representation-steered language model"
)]
struct Cli {
    /// Secrets file with MODEL_ENDPOINT and OPENAI_API_KEY
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend to chat with (steering, completions)
    #[arg(long)]
    backend: Option<Backend>,

    /// Concept the coefficient steers (happiness, anger, surprise)
    #[arg(long, default_value_t = Concept::Happiness)]
    concept: Concept,

    /// Steering coefficient, -5.0 to 5.0
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, value_parser = parse_coefficient)]
    coefficient: f64,

    /// Steering endpoint URL; overrides MODEL_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name; each backend has its own default
    #[arg(long)]
    model: Option<String>,

    /// System prompt kept across /reset
    #[arg(long)]
    system_prompt: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

impl Cli {
    /// File, then environment, then flags.
    fn resolve_config(&self) -> Result<ChatConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => ChatConfig::load(path)?,
            None => ChatConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
        };
        let mut config = file.with_env()?;

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(endpoint) = &self.endpoint {
            config.model_endpoint = Some(endpoint.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(prompt) = &self.system_prompt {
            config.system_prompt = Some(prompt.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn parse_coefficient(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {raw}"))?;
    SteeringDirective::default()
        .with_coefficient(value)
        .map(|directive| directive.coefficient())
        .map_err(|e| e.to_string())
}

fn print_history(state: &ConversationState) {
    if state.is_empty() {
        println!("(no messages)");
        return;
    }
    for message in state.messages() {
        println!("{}: {}", message.role.as_str(), message.content);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let backend = ChatBackend::from_config(&config)?;
    let mut steering = SteeringDirective::new(cli.coefficient, cli.concept)?;
    let mut state = match &config.system_prompt {
        Some(prompt) => ConversationState::with_system_prompt(prompt.clone()),
        None => ConversationState::new(),
    };

    if !backend.supports_steering() {
        eprintln!("note: the {} backend ignores steering", backend.kind());
    }
    eprintln!("type /help for commands, Ctrl-C to stop a response");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("[{steering}] > ");
        stdout.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => {
                for (usage, description) in HELP {
                    println!("  {usage:<18} {description}");
                }
            }
            Command::Reset => {
                state.clear();
                println!("conversation cleared");
            }
            Command::History => print_history(&state),
            Command::SetCoefficient(value) => match steering.with_coefficient(value) {
                Ok(updated) => steering = updated,
                Err(err) => eprintln!("{err}"),
            },
            Command::SetConcept(concept) => steering = steering.with_concept(concept),
            Command::Prompt(prompt) => {
                tokio::select! {
                    result = run_turn(&backend, &mut state, &prompt, steering, &mut stdout) => {
                        println!();
                        match result {
                            Ok(_) => {}
                            Err(TurnError::Provider(err)) if err.is_retryable() => {
                                eprintln!("error: {err} (temporary, send the prompt again)");
                            }
                            Err(err) => eprintln!("error: {err}"),
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        println!();
                        eprintln!("(cancelled)");
                    }
                }
            }
        }
    }

    Ok(())
}
