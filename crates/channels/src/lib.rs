//! Chat channel implementations for Deskmate.
//!
//! A channel relays raw user input to the session loop and shows replies.
//! The HTTP widget lives in `deskmate-gateway`; this crate holds the
//! line-oriented terminal channel.

pub mod cli;

pub use cli::CliChannel;
