//! # Deskmate Core
//!
//! Domain types, traits, and error definitions for the Deskmate business
//! assistant. This crate has **no framework dependencies**: it defines the
//! conversation model that every other crate builds on.
//!
//! ## Layout
//!
//! - [`turn`]: the persisted conversation log (`Turn`, `History`)
//! - [`message`]: the ephemeral messages sent to a model
//! - [`persona`]: the assistant role selector
//! - [`provider`]: the LLM backend abstraction
//! - [`channel`]: the front-end input abstraction
//! - [`store`]: where the history and the template are kept

pub mod error;
pub mod message;
pub mod persona;
pub mod provider;
pub mod channel;
pub mod store;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use persona::Persona;
pub use provider::{ModelParams, Provider, ProviderRequest, ProviderResponse, Usage};
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use store::{HistoryStore, TemplateStore};
pub use turn::{History, Turn, TurnKind};
