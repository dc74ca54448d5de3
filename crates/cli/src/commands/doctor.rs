//! `deskmate doctor` — Diagnose configuration and connectivity.

use deskmate_config::AppConfig;
use deskmate_core::store::{HistoryStore, TemplateStore};
use deskmate_memory::{FileHistoryStore, FileTemplateStore};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Deskmate Doctor");
    println!("===============\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ok    Configuration valid (model {})", config.model);
            config
        }
        Err(e) => {
            println!("  FAIL  Configuration invalid: {e}");
            println!("\n  1 issue found. Fix the configuration and re-run.");
            return Ok(());
        }
    };

    let templates = FileTemplateStore::new(&config.paths.template);
    match templates.load_template().await {
        Ok(text) => println!(
            "  ok    Template {} ({} chars)",
            config.paths.template.display(),
            text.chars().count()
        ),
        Err(e) => {
            println!("  FAIL  {e}");
            issues += 1;
        }
    }

    let store = FileHistoryStore::new(&config.paths.history);
    match store.load().await {
        Ok(history) => println!(
            "  ok    History {} ({} turns)",
            store.path().display(),
            history.len()
        ),
        Err(e) => {
            println!("  WARN  {e} (chat will start with an empty history)");
            issues += 1;
        }
    }

    match deskmate_providers::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ok    Model endpoint reachable ({})", config.api_url),
            Ok(false) => {
                println!("  WARN  Model endpoint answered but is not healthy ({})", config.api_url);
                issues += 1;
            }
            Err(e) => {
                println!("  FAIL  Model endpoint: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  FAIL  {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
