//! Backend selection and credentials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Which backend serves the conversation.
///
/// Resolved once at startup and handed to whatever builds requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Custom endpoint that accepts a steering coefficient.
    #[default]
    Steering,
    /// Generic chat-completions API; steering is ignored.
    Completions,
}

impl Backend {
    /// Lowercase name used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Steering => "steering",
            Backend::Completions => "completions",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steering" => Ok(Backend::Steering),
            "completions" | "openai" => Ok(Backend::Completions),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// An API key. Cannot be logged, serialized, or displayed.
/// Memory is zeroed on drop via [`Zeroizing`].
#[derive(Clone)]
pub struct ApiKey {
    inner: Zeroizing<String>,
}

impl ApiKey {
    /// Wrap a key. The string is moved, not copied.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(key.into()),
        }
    }

    /// Scoped exposure, e.g. to build an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Returns true if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// Intentionally: no Display, no Serialize.
