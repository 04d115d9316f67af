//! Configuration loader for the bridge.
//!
//! Reads `config.toml` from the given path and deserializes it into
//! [`BridgeConfig`]. Falls back to defaults when the file is missing or
//! malformed. The API token is resolved from the `CRIBOPS_API_TOKEN`
//! environment variable first, then the config file, and is wrapped in
//! [`secrecy::SecretString`] so it never appears in logs.

use std::path::Path;

use secrecy::SecretString;

use bridge_types::config::BridgeConfig;

/// Environment variable consulted for the API token.
pub const TOKEN_ENV_VAR: &str = "CRIBOPS_API_TOKEN";

/// Load bridge configuration from a TOML file.
///
/// - If the file does not exist, returns [`BridgeConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(config_path: &Path) -> BridgeConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config file at {}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
    };

    match toml::from_str::<BridgeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BridgeConfig::default()
        }
    }
}

/// Resolve the API token: environment first, then the config file.
pub fn resolve_api_token(config: &BridgeConfig) -> Option<SecretString> {
    pick_token(std::env::var(TOKEN_ENV_VAR).ok(), config.platform.api_token.clone())
}

fn pick_token(env_value: Option<String>, config_value: Option<String>) -> Option<SecretString> {
    env_value
        .filter(|t| !t.is_empty())
        .or(config_value)
        .map(SecretString::from)
}
