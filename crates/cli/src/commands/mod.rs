pub mod chat;
pub mod doctor;
pub mod history;
pub mod init;
pub mod serve;

use deskmate_config::AppConfig;

/// The one-line report for a configuration with no API credential.
pub fn missing_credential(config: &AppConfig) -> Option<String> {
    config.require_api_key().err().map(|e| format!("ERROR: {e}"))
}
