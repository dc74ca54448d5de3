//! `deskmate history` — Inspect or reset the stored conversation.

use deskmate_config::AppConfig;
use deskmate_core::store::HistoryStore;
use deskmate_core::turn::Turn;
use deskmate_memory::FileHistoryStore;

fn store() -> Result<FileHistoryStore, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(FileHistoryStore::new(config.paths.history))
}

pub async fn show(last: Option<usize>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = store()?;
    let history = store.load().await?;

    let turns = history.turns();
    let start = last.map_or(0, |n| turns.len().saturating_sub(n));
    let turns = &turns[start..];

    if json {
        println!("{}", serde_json::to_string_pretty(turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!("No conversation stored at {}", store.path().display());
        return Ok(());
    }

    println!(
        "{} of {} turns from {}\n",
        turns.len(),
        history.len(),
        store.path().display()
    );
    for turn in turns {
        println!("{}", format_turn(turn));
    }

    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let store = store()?;
    store.clear().await?;
    println!("Cleared {}", store.path().display());
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", store()?.path().display());
    Ok(())
}

/// `YOU> ...` / `ASSISTANT> ...`, other kinds by their tag.
fn format_turn(turn: &Turn) -> String {
    use deskmate_core::turn::TurnKind;
    let label = match &turn.kind {
        TurnKind::Human => "YOU".to_string(),
        TurnKind::Ai => "ASSISTANT".to_string(),
        TurnKind::Other(tag) => format!("[{tag}]"),
    };
    format!("{label}> {}", turn.content)
}
