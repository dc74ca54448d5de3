//! Prompt assembly — turns the session's inputs into the ordered message
//! list for one model call.
//!
//! Layout of the output, always in this order:
//!
//! 1. **System**: template, then a `BUSINESS_CONTEXT:` section, then `ROLE:`
//! 2. **History**: trimmed turns mapped `human` → user, `ai` → assistant
//! 3. **User**: the new message
//!
//! Nothing is reordered, deduplicated, summarized or truncated here. Token
//! limits are left to the model-call parameters.
//!
//! # Determinism
//!
//! Identical inputs always produce identical messages. No random or
//! time-dependent logic is used during assembly.

use crate::context::token;
use deskmate_core::message::Message;
use deskmate_core::persona::Persona;
use deskmate_core::turn::{Turn, TurnKind};
use serde::{Deserialize, Serialize};

/// All inputs required by the assembler for a single model call.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    /// Base system prompt, already trimmed.
    pub template: &'a str,
    /// Operator-supplied description of the business, injected verbatim.
    pub business_context: &'a str,
    pub persona: Persona,
    /// History as the model should see it (already trimmed).
    pub history: &'a [Turn],
    /// The current user message to process.
    pub user_message: &'a str,
}

/// The assembled prompt, ready for a provider call.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub messages: Vec<Message>,
    pub metadata: AssemblyMetadata,
}

/// What happened during assembly, for logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// History turns emitted as messages.
    pub history_messages: usize,
    /// History turns with a kind other than `human`/`ai`.
    pub skipped_turns: usize,
    /// Rough size of the whole prompt.
    pub estimated_tokens: usize,
}

/// Builds the message list for a model call.
pub struct ContextAssembler;

impl ContextAssembler {
    /// The system block: template, business context, persona.
    pub fn system_block(template: &str, business_context: &str, persona: Persona) -> String {
        format!("{template}\n\nBUSINESS_CONTEXT:\n{business_context}\n\nROLE: {persona}\n")
    }

    pub fn assemble(input: &AssemblyInput<'_>) -> AssembledPrompt {
        let mut messages = Vec::with_capacity(input.history.len() + 2);
        let mut metadata = AssemblyMetadata::default();

        messages.push(Message::system(Self::system_block(
            input.template,
            input.business_context,
            input.persona,
        )));

        for turn in input.history {
            match turn.kind {
                TurnKind::Human => messages.push(Message::user(turn.content.as_str())),
                TurnKind::Ai => messages.push(Message::assistant(turn.content.as_str())),
                TurnKind::Other(_) => {
                    metadata.skipped_turns += 1;
                    continue;
                }
            }
            metadata.history_messages += 1;
        }

        messages.push(Message::user(input.user_message));
        metadata.estimated_tokens = token::estimate_messages_tokens(&messages);

        AssembledPrompt { messages, metadata }
    }
}
