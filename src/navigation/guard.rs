use serde::Serialize;

use crate::config::RoutesConfig;
use crate::session::SessionHandle;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "decision", content = "target", rename_all = "lowercase")]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Decides whether a navigation proceeds, based only on local token state.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
    auth_prefixes: Vec<String>,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    pub fn new(config: &RoutesConfig) -> Self {
        RouteGuard {
            protected_prefixes: config.protected_prefixes.clone(),
            auth_prefixes: config.auth_prefixes.clone(),
            login_path: config.login_path.clone(),
            landing_path: config.landing_path.clone(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    pub fn decide(&self, path: &str, has_token: bool) -> GuardDecision {
        let path = strip_query(path);

        let target = if !has_token && matches_any(path, &self.protected_prefixes) {
            Some(&self.login_path)
        } else if has_token && matches_any(path, &self.auth_prefixes) {
            Some(&self.landing_path)
        } else {
            None
        };

        match target {
            // never bounce a path onto itself
            Some(target) if target.as_str() != path => GuardDecision::Redirect(target.clone()),
            _ => GuardDecision::Allow,
        }
    }

    pub fn check(&self, path: &str, session: &SessionHandle) -> GuardDecision {
        self.decide(path, session.is_authenticated())
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        RouteGuard::new(&RoutesConfig::default())
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| matches_prefix(path, prefix))
}

/// `/admin` matches `/admin` and `/admin/users`, not `/administrator`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
