use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::warn;

use crate::paths;
use crate::secret::SecretMap;

/// Mutating routes and the suffix of their per-path secret override,
/// e.g. `DASHBOARD_SECRET_TASKS_ASSIGN`.
pub const SECRET_ROUTES: &[(&str, &str)] = &[
    (paths::CLEAR, "CLEAR"),
    (paths::RATING, "RATING"),
    (paths::NOTIFICATIONS, "NOTIFICATIONS"),
    (paths::TASKS_ASSIGN, "TASKS_ASSIGN"),
    (paths::TASKS_UNASSIGN, "TASKS_UNASSIGN"),
    (paths::TASKS_CHANGE_STATUS, "TASKS_CHANGE_STATUS"),
];

/// Everything read from the environment, once, at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    /// The managed user. Requests for anyone else are acknowledged and dropped.
    pub user_id: u32,
    pub page_size: u32,
    pub secrets: SecretMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            db_path: "dashboard.db".into(),
            static_dir: "public".into(),
            user_id: 12,
            page_size: 50,
            secrets: SecretMap::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("DASHBOARD_PORT") {
            Some(_) => parse_var(&var, "DASHBOARD_PORT", defaults.port)?,
            None => parse_var(&var, "PORT", defaults.port)?,
        };

        let shared_secret = var("DASHBOARD_SECRET");
        let secrets = SECRET_ROUTES
            .iter()
            .filter_map(|(path, suffix)| {
                var(&format!("DASHBOARD_SECRET_{}", suffix))
                    .or_else(|| shared_secret.clone())
                    .map(|secret| (*path, secret))
            })
            .collect();

        Ok(Self {
            host: var("DASHBOARD_HOST").unwrap_or(defaults.host),
            port,
            db_path: var("DASHBOARD_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            static_dir: var("DASHBOARD_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            user_id: parse_var(&var, "DASHBOARD_USER_ID", defaults.user_id)?,
            page_size: parse_var(&var, "DASHBOARD_PAGE_SIZE", defaults.page_size)?,
            secrets,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Mutating paths nobody can call because no secret is set for them.
    pub fn unprotected_routes(&self) -> Vec<&'static str> {
        SECRET_ROUTES
            .iter()
            .map(|(path, _)| *path)
            .filter(|path| !self.secrets.is_configured(path))
            .collect()
    }

    pub fn warn_on_missing_secrets(&self) {
        let missing = self.unprotected_routes();
        if !missing.is_empty() {
            warn!(
                "No secret configured for {}; these endpoints reject every request. Set DASHBOARD_SECRET.",
                missing.join(", ")
            );
        }
    }
}

fn parse_var<T, V>(var: &V, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid {} value '{}'", key, raw)),
        None => Ok(default),
    }
}
