//! The conversation engine behind every Deskmate front-end.
//!
//! One cycle per user message:
//!
//! 1. **Trim** the history to the retention window (a read-view only)
//! 2. **Assemble** system block + trimmed turns + the new message
//! 3. **Invoke** the model once, no retries
//! 4. **Display** the reply (or the rendered error)
//! 5. **Persist** the full history with the new exchange appended

pub mod context;
pub mod invoker;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{trim, AssembledPrompt, AssemblyInput, AssemblyMetadata, ContextAssembler};
pub use invoker::{CompletionError, CompletionInvoker, ERROR_PREFIX};
pub use session::{
    load_or_empty, Session, SessionConfig, SessionPhase, SessionState, TurnOutcome, UserInput,
};
