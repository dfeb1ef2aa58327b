//! Engine configuration from environment variables.
//!
//! Supported variables:
//! - SERVER_HOST: bind address (default `0.0.0.0`)
//! - SERVER_PORT / PORT: listen port (default `3000`)
//! - STATE_DB: SQLite file for campaign state (default `starbridge.db`)
//! - STATIC_DIR: directory served as the browser client (default `public`)
//! - CORS_ALLOWED_ORIGINS: `*` or a comma-separated origin list (unset = no CORS layer)
//! - SEED_LIBRARY: load the built-in library entries into an empty store (default `true`)

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATE_DB: &str = "starbridge.db";
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub state_db: String,
    pub static_dir: PathBuf,
    pub cors_allowed_origins: Option<String>,
    pub seed_library: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            state_db: DEFAULT_STATE_DB.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cors_allowed_origins: None,
            seed_library: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Invalid values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(val) => val.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!(val = %val, "SERVER_PORT is not a valid port, using default");
                defaults.port
            }),
            None => defaults.port,
        };

        let seed_library = match lookup("SEED_LIBRARY") {
            Some(val) => parse_flag(&val).unwrap_or_else(|| {
                tracing::warn!(val = %val, "SEED_LIBRARY is not a boolean, using default");
                defaults.seed_library
            }),
            None => defaults.seed_library,
        };

        Self {
            host: non_empty(lookup("SERVER_HOST")).unwrap_or(defaults.host),
            port,
            state_db: non_empty(lookup("STATE_DB")).unwrap_or(defaults.state_db),
            static_dir: non_empty(lookup("STATIC_DIR"))
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cors_allowed_origins: non_empty(lookup("CORS_ALLOWED_ORIGINS")),
            seed_library,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(config_from(&[]), EngineConfig::default());
        assert_eq!(config_from(&[]).bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn port_falls_back_to_port_variable_then_default() {
        assert_eq!(config_from(&[("PORT", "8080")]).port, 8080);
        assert_eq!(
            config_from(&[("SERVER_PORT", "9000"), ("PORT", "8080")]).port,
            9000
        );
        assert_eq!(config_from(&[("SERVER_PORT", "not-a-port")]).port, 3000);
    }

    #[test]
    fn seed_flag_and_blank_values() {
        let config = config_from(&[
            ("SEED_LIBRARY", "off"),
            ("STATE_DB", "  "),
            ("CORS_ALLOWED_ORIGINS", "*"),
        ]);
        assert!(!config.seed_library);
        assert_eq!(config.state_db, DEFAULT_STATE_DB);
        assert_eq!(config.cors_allowed_origins.as_deref(), Some("*"));
        assert!(config_from(&[("SEED_LIBRARY", "maybe")]).seed_library);
    }
}
