use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Paths consulted by the route guard.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RoutesConfig {
    /// Prefixes that need a token.
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
    /// Prefixes of the login/signup flow, skipped once a token exists.
    #[serde(default = "default_auth_prefixes")]
    pub auth_prefixes: Vec<String>,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: default_protected_prefixes(),
            auth_prefixes: default_auth_prefixes(),
            login_path: default_login_path(),
            landing_path: default_landing_path(),
        }
    }
}

fn default_protected_prefixes() -> Vec<String> {
    ["/dashboard", "/app/dashboard", "/app/cards", "/admin"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_auth_prefixes() -> Vec<String> {
    vec!["/auth".to_string()]
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_landing_path() -> String {
    "/app/dashboard".to_string()
}
