//! Backend configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crewdrill_core::traits::Backend;

use crate::memory::MemoryBackend;
use crate::rest::HostedBackend;
use crate::session::SessionStore;

/// Configuration for the persistence backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// The hosted object-store/auth service.
    Hosted {
        url: String,
        anon_key: String,
        /// Needed only for admin-API operations (password reset).
        #[serde(default)]
        service_key: Option<String>,
    },
    /// In-memory store: offline demo and tests. Nothing persists.
    Memory,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::Hosted {
                url,
                anon_key: _,
                service_key,
            } => f
                .debug_struct("Hosted")
                .field("url", url)
                .field("anon_key", &"***")
                .field("service_key", &service_key.as_ref().map(|_| "***"))
                .finish(),
            BackendConfig::Memory => f.debug_struct("Memory").finish(),
        }
    }
}

/// Top-level crewdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewdrillConfig {
    /// Which backend to talk to.
    pub backend: BackendConfig,
    /// Where the signed-in session token is cached between invocations.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Default leaderboard length.
    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,
}

fn default_session_file() -> PathBuf {
    dirs_path()
        .map(|d| d.join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".crewdrill-session.json"))
}

fn default_timeout() -> u64 {
    30
}

fn default_ranking_limit() -> usize {
    10
}

impl Default for CrewdrillConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Memory,
            session_file: default_session_file(),
            timeout_secs: default_timeout(),
            ranking_limit: default_ranking_limit(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_backend_config(config: &BackendConfig) -> BackendConfig {
    match config {
        BackendConfig::Hosted {
            url,
            anon_key,
            service_key,
        } => BackendConfig::Hosted {
            url: resolve_env_vars(url),
            anon_key: resolve_env_vars(anon_key),
            service_key: service_key.as_ref().map(|k| resolve_env_vars(k)),
        },
        BackendConfig::Memory => BackendConfig::Memory,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `crewdrill.toml` in the current directory
/// 2. `~/.config/crewdrill/config.toml`
///
/// Environment variable overrides: `CREWDRILL_URL`, `CREWDRILL_ANON_KEY`,
/// `CREWDRILL_SERVICE_KEY`.
pub fn load_config() -> Result<CrewdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CrewdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("crewdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CrewdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CrewdrillConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url_override) = std::env::var("CREWDRILL_URL") {
        let (anon_key, service_key) = match &config.backend {
            BackendConfig::Hosted {
                anon_key,
                service_key,
                ..
            } => (anon_key.clone(), service_key.clone()),
            BackendConfig::Memory => (String::new(), None),
        };
        config.backend = BackendConfig::Hosted {
            url: url_override,
            anon_key,
            service_key,
        };
    }
    if let Ok(key) = std::env::var("CREWDRILL_ANON_KEY") {
        if let BackendConfig::Hosted { anon_key, .. } = &mut config.backend {
            *anon_key = key;
        }
    }
    if let Ok(key) = std::env::var("CREWDRILL_SERVICE_KEY") {
        if let BackendConfig::Hosted { service_key, .. } = &mut config.backend {
            *service_key = Some(key);
        }
    }

    config.backend = resolve_backend_config(&config.backend);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("crewdrill"))
}

/// Create a backend instance from the configuration.
pub fn create_backend(config: &CrewdrillConfig) -> Result<Arc<dyn Backend>> {
    match &config.backend {
        BackendConfig::Hosted {
            url,
            anon_key,
            service_key,
        } => {
            anyhow::ensure!(!url.is_empty(), "backend url is empty");
            anyhow::ensure!(!anon_key.is_empty(), "backend anon_key is empty");
            let store = SessionStore::new(config.session_file.clone());
            Ok(Arc::new(HostedBackend::new(
                url,
                anon_key,
                service_key.clone(),
                config.timeout_secs,
                store,
            )))
        }
        BackendConfig::Memory => Ok(Arc::new(MemoryBackend::seeded())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_CREWDRILL_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_CREWDRILL_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_CREWDRILL_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_CREWDRILL_TEST_VAR");
    }

    #[test]
    fn default_config_is_memory() {
        let config = CrewdrillConfig::default();
        assert!(matches!(config.backend, BackendConfig::Memory));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.ranking_limit, 10);
    }

    #[test]
    fn parse_hosted_config() {
        let toml_str = r#"
[backend]
type = "hosted"
url = "https://academy.example.com"
anon_key = "${CREWDRILL_ANON_KEY}"

timeout_secs = 10
"#;
        let config: CrewdrillConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.backend, BackendConfig::Hosted { .. }));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn debug_masks_keys() {
        let config = BackendConfig::Hosted {
            url: "https://academy.example.com".into(),
            anon_key: "super-secret".into(),
            service_key: Some("even-more-secret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("even-more-secret"));
        assert!(debug.contains("academy.example.com"));
    }
}
