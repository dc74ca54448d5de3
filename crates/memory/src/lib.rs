//! Storage implementations for Deskmate: the conversation history and the
//! system prompt template.

pub mod file_backend;
pub mod in_memory;
pub mod template;

pub use file_backend::FileHistoryStore;
pub use in_memory::InMemoryHistoryStore;
pub use template::{FALLBACK_TEMPLATE, FileTemplateStore, StaticTemplate};
