use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::games::paperio::PaperioConfig;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "PAPERIO_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/paperio.toml";

/// Top-level server configuration, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Seconds without any datagram before a session is dropped
    pub session_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
    pub game: PaperioConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9000".to_string(),
            session_timeout_secs: 30,
            cleanup_interval_secs: 5,
            game: PaperioConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(content).map(Self::validated)
    }

    pub fn validated(mut self) -> Self {
        self.game = self.game.validated();
        self
    }

    /// Loads from `path`, else `$PAPERIO_CONFIG`, else `config/paperio.toml`.
    /// Missing or broken files fall back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(p) if !p.is_empty() => PathBuf::from(p),
                _ => PathBuf::from(DEFAULT_CONFIG_PATH),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {}", path.display());
                    cfg
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.game.cols(), 60);
        assert_eq!(config.game.rows(), 60);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            listen_addr = "0.0.0.0:7777"

            [game]
            max_players = 2
            rng_seed = 17
            "#,
        )
        .unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:7777");
        assert_eq!(config.session_timeout_secs, 30);
        assert_eq!(config.game.max_players, 2);
        assert_eq!(config.game.rng_seed, Some(17));
        assert_eq!(config.game.move_interval_ms, 120);
    }

    #[test]
    fn test_loaded_game_settings_are_validated() {
        let config = ServerConfig::from_toml_str(
            r#"
            [game]
            tick_rate_hz = 5000
            cell_size = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.game.tick_rate_hz, 1000);
        assert_eq!(config.game.cell_size, 20.0);
        assert!(!config.game.tick_duration().is_zero());
        assert_eq!(config.game.cols(), 60);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ServerConfig::from_toml_str("listen_addr = 12").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = ServerConfig::load(Some(Path::new("does/not/exist.toml")));
        assert_eq!(config.cleanup_interval_secs, 5);
    }
}
