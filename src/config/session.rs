use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the access token is persisted between runs.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct SessionConfig {
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub storage: StorageBackendConfig,
}

/// Attributes of the token cookie.
///
/// `secure` defaults to `true` when the environment is `production`.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub same_site: SameSite,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            same_site: SameSite::default(),
            secure: None,
            max_age_secs: default_max_age_secs(),
        }
    }
}

fn default_cookie_name() -> String {
    "insignia_token".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_max_age_secs() -> u64 {
    60 * 60 * 24 * 7
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

/// The token storage backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackendConfig {
    /// Kept for the lifetime of the process only.
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File {
        #[serde(default = "default_token_path")]
        path: PathBuf,
    },
}

/// A session survives restarts unless `memory` is asked for explicitly.
impl Default for StorageBackendConfig {
    fn default() -> Self {
        StorageBackendConfig::File {
            path: default_token_path(),
        }
    }
}

/// `<local data dir>/insignia/session.json`, or the working directory when
/// the platform has no data dir.
pub fn default_token_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("insignia")
        .join("session.json")
}
