//! History trimming.
//!
//! Bounds what the model sees, never what is stored: the returned slice
//! borrows from the full history, which is persisted untouched.

use deskmate_core::turn::Turn;

/// The most recent `max_turns` turns, in original order.
///
/// `max_turns` counts turns, not exchanges, so an odd bound may start the
/// view on an `ai` turn. Zero or negative disables conversational memory.
pub fn trim(turns: &[Turn], max_turns: i64) -> &[Turn] {
    if max_turns <= 0 {
        return &[];
    }
    let keep = usize::try_from(max_turns).unwrap_or(usize::MAX);
    &turns[turns.len().saturating_sub(keep)..]
}
