//! SDK configuration.
//!
//! Layered with figment: built-in defaults, then `todo-sdk.toml` in the
//! working directory, then `TODO_SDK_*` environment variables.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const CONFIG_FILE: &str = "todo-sdk.toml";
pub const ENV_PREFIX: &str = "TODO_SDK_";

/// Settings for constructing a `TodoApi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and optional path prefix the API is served under.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The provider stack `load` extracts from.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(ApiConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, ApiError> {
        Ok(Self::figment().extract()?)
    }
}
