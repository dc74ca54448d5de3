//! Prompt context: which turns reach the model and how the message list
//! is laid out.
//!
//! | Step | Module | Effect |
//! |------|--------|--------|
//! | 1. Trim | [`trimmer`] | Keep the most recent N turns (read-only view) |
//! | 2. Assemble | [`assembler`] | `[system, ...history, user]` |
//! | 3. Estimate | [`token`] | Rough token count for operator logs |

pub mod assembler;
pub mod token;
pub mod trimmer;

pub use assembler::{AssembledPrompt, AssemblyInput, AssemblyMetadata, ContextAssembler};
pub use trimmer::trim;
