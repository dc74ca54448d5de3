//! `deskmate init` — Write a default config file and prompt template.

use deskmate_config::AppConfig;
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE: &str = include_str!("../../../../prompts/system_prompt.txt");

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Deskmate setup");
    println!("==============\n");

    scaffold(&AppConfig::config_path(), |key| std::env::var(key).ok())?;

    if !Path::new(".env").exists() {
        println!("\nNext: create a .env file with OPENAI_API_KEY=...");
    }

    Ok(())
}

/// Write the config file, then the template it resolves to.
///
/// The template path goes through the same file and environment layers the
/// other commands use, so `init` never writes where `chat` will not read.
fn scaffold<F>(config_path: &Path, lookup: F) -> Result<PathBuf, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    write_if_absent(config_path, &AppConfig::default_toml())?;

    let mut config = AppConfig::load_from(config_path)?;
    config.apply_env(lookup)?;
    write_if_absent(&config.paths.template, DEFAULT_TEMPLATE)?;
    Ok(config.paths.template)
}

fn write_if_absent(path: &Path, content: &str) -> std::io::Result<()> {
    if path.exists() {
        println!("  exists   {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("  created  {}", path.display());
    Ok(())
}
