//! Task identities: `Name` or `Name(Nr)` tokens.

use serde::{Deserialize, Serialize};

/// Instance number assumed when a token carries no `(Nr)` suffix.
pub const DEFAULT_NR: &str = "1";

/// Name and instance number of a task.
///
/// The identity key is the plain concatenation `name + nr`, so `Read` and
/// `Read(1)` are the same task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskIdentity {
    pub name: String,
    pub nr: String,
}

impl TaskIdentity {
    pub fn new(name: &str, nr: &str) -> Self {
        Self {
            name: name.to_string(),
            nr: nr.to_string(),
        }
    }

    /// Split a raw token such as `TOPSAR-Split(2)` into name and number.
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split('(');
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            Some(nr) => Self::new(name, &nr.replace(')', "")),
            None => Self::new(name, DEFAULT_NR),
        }
    }

    /// Parse the first quoted substring of a markup line.
    ///
    /// Only an opening quote is required; an unterminated token runs to the
    /// end of the line.
    pub fn from_quoted(line: &str) -> Option<Self> {
        line.split('"').nth(1).map(Self::parse)
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.nr)
    }
}

impl std::fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.nr)
    }
}
