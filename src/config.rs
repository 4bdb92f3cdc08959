//! Application-level configuration loading, including protocol defaults and
//! the sponsorship API endpoint.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_LIVE_BACK_CONFIG_PATH";
/// Environment variable carrying the sponsorship API bearer key.
const SPONSOR_API_KEY_ENV: &str = "SPONSOR_API_KEY";

/// Question count announced by `quiz_started` when a quiz carries none.
const DEFAULT_TOTAL_QUESTIONS: u32 = 5;
/// Buffered frames per room channel before slow subscribers start lagging.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;
/// Sponsorship service reached when the config file supplies no base URL.
const DEFAULT_SPONSOR_BASE_URL: &str = "https://api.enoki.mystenlabs.com";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    allowed_origin: Option<String>,
    default_total_questions: u32,
    channel_capacity: usize,
    sponsor_base_url: String,
    sponsor_api_key: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    ///
    /// The sponsorship API key is only ever read from the environment so it
    /// never lands in a config file checked into version control.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.sponsor_api_key = env::var(SPONSOR_API_KEY_ENV).ok();
        if config.sponsor_api_key.is_none() {
            warn!(
                env = SPONSOR_API_KEY_ENV,
                "no sponsorship API key configured; sponsorship proxying will be rejected"
            );
        }

        config
    }

    /// Frontend origin allowed by CORS, when restricted.
    pub fn allowed_origin(&self) -> Option<&str> {
        self.allowed_origin.as_deref()
    }

    /// Question count used for quizzes that carry no `total_questions` metadata.
    pub fn default_total_questions(&self) -> u32 {
        self.default_total_questions
    }

    /// Capacity of each room's broadcast channel.
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Base URL of the external sponsorship/signing service.
    pub fn sponsor_base_url(&self) -> &str {
        &self.sponsor_base_url
    }

    /// Bearer key for the sponsorship service, when configured.
    pub fn sponsor_api_key(&self) -> Option<&str> {
        self.sponsor_api_key.as_deref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            allowed_origin: None,
            default_total_questions: DEFAULT_TOTAL_QUESTIONS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            sponsor_base_url: DEFAULT_SPONSOR_BASE_URL.to_string(),
            sponsor_api_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    allowed_origin: Option<String>,
    default_total_questions: Option<u32>,
    channel_capacity: Option<usize>,
    sponsor_base_url: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            allowed_origin: value.allowed_origin,
            default_total_questions: value
                .default_total_questions
                .unwrap_or(defaults.default_total_questions),
            channel_capacity: value.channel_capacity.unwrap_or(defaults.channel_capacity),
            sponsor_base_url: value
                .sponsor_base_url
                .unwrap_or(defaults.sponsor_base_url)
                .trim_end_matches('/')
                .to_string(),
            sponsor_api_key: None,
        }
    }
}

/// Resolve the configuration path from the environment or the default location.
fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
