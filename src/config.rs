use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub clipboard: ClipboardConfig,
    pub pointer: PointerConfig,
    pub replacement: ReplacementConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipboardConfig {
    /// Interval between clipboard inspections, in milliseconds.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointerConfig {
    /// Displacement on either axis beyond which pointer movement counts as
    /// significant.
    pub movement_threshold: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplacementConfig {
    /// Literal typed before the pasted expansion.
    #[serde(default)]
    pub before: String,
    /// Literal typed after the pasted expansion.
    #[serde(default = "default_after")]
    pub after: String,
    /// Path to the TOML file holding the `[replacements]` table.
    pub source: String,
}

fn default_after() -> String {
    " ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "retext=info".to_string(),
            },
            clipboard: ClipboardConfig {
                poll_interval_ms: 800,
            },
            pointer: PointerConfig {
                movement_threshold: 10,
            },
            replacement: ReplacementConfig {
                before: String::new(),
                after: default_after(),
                source: "replacements.toml".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("RETEXT_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        if self.clipboard.poll_interval_ms < 50 {
            anyhow::bail!("poll_interval_ms must be at least 50");
        }

        if self.pointer.movement_threshold <= 0 {
            anyhow::bail!("movement_threshold must be greater than 0");
        }

        if self.replacement.source.is_empty() {
            anyhow::bail!("replacement.source must not be empty");
        }

        Ok(())
    }
}
