//! `deskmate serve` — Start the HTTP chat widget.

use deskmate_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(message) = super::missing_credential(&config) {
        eprintln!("{message}");
        return Ok(());
    }

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Deskmate widget");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model);
    println!("   History:   {}", config.paths.history.display());

    deskmate_gateway::start(config).await?;

    Ok(())
}
