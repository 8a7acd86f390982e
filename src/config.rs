//! Environment configuration for the server binary.
//!
//! Everything is read and validated once at start-up; a missing credential
//! for the selected provider is a start-up error, not a first-request error.

use crate::definition::provider::{ProviderConfig, RetryPolicy, gemini, openrouter};
use crate::definition::store::StoreLocation;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATA_PATH: &str = "data/bible.json";
pub const DEFAULT_STORE_URL: &str = "file:data/definitions";
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required when AI_PROVIDER={provider}")]
    MissingCredential {
        name: &'static str,
        provider: &'static str,
    },
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct DefinitionConfig {
    pub provider: ProviderConfig,
    pub store: StoreLocation,
    pub memory_capacity: usize,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub definitions: DefinitionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parse_or(&var, "PORT", DEFAULT_PORT)?;
        let host = var("BIND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let data_path =
            PathBuf::from(var("BIBLE_DATA").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()));

        let provider_name = var("AI_PROVIDER").unwrap_or_else(|| "openrouter".to_string());
        let provider = match provider_name.to_ascii_lowercase().as_str() {
            "openrouter" => ProviderConfig::OpenRouter {
                api_key: var("AI_API_KEY").ok_or(ConfigError::MissingCredential {
                    name: "AI_API_KEY",
                    provider: "openrouter",
                })?,
                api_url: var("AI_API_URL")
                    .unwrap_or_else(|| openrouter::DEFAULT_API_URL.to_string()),
                model: var("AI_MODEL").unwrap_or_else(|| openrouter::DEFAULT_MODEL.to_string()),
            },
            "gemini" => ProviderConfig::Gemini {
                api_key: var("GEMINI_API_KEY").ok_or(ConfigError::MissingCredential {
                    name: "GEMINI_API_KEY",
                    provider: "gemini",
                })?,
                api_url: var("GEMINI_API_URL")
                    .unwrap_or_else(|| gemini::DEFAULT_API_URL.to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "AI_PROVIDER",
                    reason: format!(
                        "unknown provider {:?} (expected openrouter or gemini)",
                        other
                    ),
                });
            }
        };

        let store = var("DEFINITION_STORE_URL")
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string())
            .parse::<StoreLocation>()
            .map_err(|reason| ConfigError::Invalid {
                name: "DEFINITION_STORE_URL",
                reason,
            })?;

        let memory_capacity = parse_or(&var, "MEMORY_CACHE_CAPACITY", DEFAULT_MEMORY_CAPACITY)?;
        if memory_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "MEMORY_CACHE_CAPACITY",
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs = parse_or(&var, "PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "PROVIDER_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            data_path,
            definitions: DefinitionConfig {
                provider,
                store,
                memory_capacity,
                retry: RetryPolicy {
                    timeout: Duration::from_secs(timeout_secs),
                    ..RetryPolicy::default()
                },
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}
