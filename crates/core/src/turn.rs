//! The persisted conversation log.
//!
//! A [`History`] is an ordered list of [`Turn`]s. Insertion order is
//! chronological order. On disk it is a JSON array of
//! `{"type": "human" | "ai", "content": "..."}` objects.
//!
//! Turn kinds this version does not understand are kept as
//! [`TurnKind::Other`] so that a load/save cycle never rewrites them; the
//! prompt assembler simply skips them.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TurnKind {
    /// Typed by the user
    Human,
    /// Generated by the model (or the rendered error of a failed call)
    Ai,
    /// Any other tag found in a stored history
    Other(String),
}

impl TurnKind {
    pub fn as_str(&self) -> &str {
        match self {
            TurnKind::Human => "human",
            TurnKind::Ai => "ai",
            TurnKind::Other(tag) => tag,
        }
    }
}

impl From<String> for TurnKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "human" => TurnKind::Human,
            "ai" => TurnKind::Ai,
            _ => TurnKind::Other(tag),
        }
    }
}

impl From<TurnKind> for String {
    fn from(kind: TurnKind) -> Self {
        match kind {
            TurnKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "type")]
    pub kind: TurnKind,

    pub content: String,

    /// Fields written by other tools; carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Turn {
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(TurnKind::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(TurnKind::Ai, content)
    }

    pub fn new(kind: TurnKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The full ordered log of turns for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Turn>);

impl History {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    /// Record one completed exchange. Both turns are appended together;
    /// there is no way to append half an exchange.
    pub fn push_exchange(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.0.reserve(2);
        self.0.push(Turn::human(human));
        self.0.push(Turn::ai(ai));
    }

    /// Turns from `start` onward; an out-of-range start yields an empty slice.
    pub fn since(&self, start: usize) -> &[Turn] {
        self.0.get(start..).unwrap_or(&[])
    }

    pub fn into_inner(self) -> Vec<Turn> {
        self.0
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
