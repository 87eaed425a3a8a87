//! Runtime configuration for ollama-job-adapter.
//!
//! Values are layered: JSON config file, then environment (`.env` is loaded
//! first), then command-line flags. Everything is resolved once at startup
//! and treated as immutable afterwards.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the backend base address.
pub const BACKEND_URL_ENV: &str = "OLLAMA_BASE_URL";

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "ollama-job-adapter", about = "Forward inference jobs to a local Ollama server")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    pub listen: Option<String>,

    /// Backend base address, e.g. http://localhost:11434.
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Run a single job read from this file ("-" for stdin) and exit.
    #[arg(long)]
    pub job: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Backend configuration.
    pub backend: BackendConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where the model server lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base address of the Ollama server.
    pub base_url: String,

    /// Whole-request timeout in seconds. `None` leaves it to the transport.
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Apply an environment override for the backend address.
    pub fn with_env_override(mut self, backend_url: Option<String>) -> Self {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url;
        }
        self
    }

    /// Apply command-line overrides.
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(listen) = &cli.listen {
            self.server.listen = listen.clone();
        }
        if let Some(url) = &cli.backend_url {
            self.backend.base_url = url.clone();
        }
        self.backend.base_url = self.backend.base_url.trim_end_matches('/').to_string();
        self
    }

    /// Full startup resolution: file, then `OLLAMA_BASE_URL`, then flags.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config = Self::load(&cli.config)?
            .with_env_override(std::env::var(BACKEND_URL_ENV).ok())
            .with_cli_overrides(cli);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["ollama-job-adapter"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.backend.base_url, "http://localhost:11434");
        assert_eq!(cfg.backend.request_timeout_secs, None);
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"backend": {"request_timeout_secs": 30}}"#).unwrap();
        assert_eq!(cfg.backend.base_url, "http://localhost:11434");
        assert_eq!(cfg.backend.request_timeout_secs, Some(30));
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_override_precedence() {
        let cfg = Config::default()
            .with_env_override(Some("http://env:11434".to_string()))
            .with_cli_overrides(&cli(&[]));
        assert_eq!(cfg.backend.base_url, "http://env:11434");

        let cfg = Config::default()
            .with_env_override(Some("http://env:11434".to_string()))
            .with_cli_overrides(&cli(&["--backend-url", "http://flag:1/", "--listen", "127.0.0.1:9"]));
        assert_eq!(cfg.backend.base_url, "http://flag:1");
        assert_eq!(cfg.server.listen, "127.0.0.1:9");
    }

    #[test]
    fn test_blank_env_ignored() {
        let cfg = Config::default().with_env_override(Some("  ".to_string()));
        assert_eq!(cfg.backend.base_url, "http://localhost:11434");
    }
}
