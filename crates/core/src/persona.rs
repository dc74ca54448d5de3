//! Assistant persona selector.
//!
//! The persona is a closed set injected into the system prompt as
//! `ROLE: <name>`. Anything that does not match falls back to
//! [`Persona::Support`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Sales,
    #[default]
    Support,
    Manager,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Sales, Persona::Support, Persona::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Sales => "sales",
            Persona::Support => "support",
            Persona::Manager => "manager",
        }
    }

    /// Parse free-form operator input, trimming and ignoring case.
    /// Unrecognized input yields the default persona.
    pub fn parse_or_default(input: &str) -> Self {
        input.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" => Ok(Persona::Sales),
            "support" => Ok(Persona::Support),
            "manager" => Ok(Persona::Manager),
            _ => Err(UnknownPersona(s.to_string())),
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persona '{0}' (expected sales, support or manager)")]
pub struct UnknownPersona(pub String);
