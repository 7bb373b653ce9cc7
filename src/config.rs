// src/config.rs
//! Layered configuration: defaults, optional config.yaml, environment

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::renderer::RenderOptions;
use crate::session::SessionLimits;

pub const ENDPOINT_VAR: &str = "PROMPTFLOW_ENDPOINT";
pub const API_KEY_VAR: &str = "PROMPTFLOW_API_KEY";
pub const TEMPLATES_DIR_VAR: &str = "RESUME_FORMATTER_TEMPLATES_DIR";
pub const OUTPUT_DIR_VAR: &str = "RESUME_FORMATTER_OUTPUT_DIR";
pub const TIMEOUT_VAR: &str = "RESUME_FORMATTER_TIMEOUT_SECS";
pub const AUTOESCAPE_VAR: &str = "RESUME_FORMATTER_AUTOESCAPE";
pub const SESSION_TTL_VAR: &str = "RESUME_FORMATTER_SESSION_TTL_MINS";
pub const MAX_SESSIONS_VAR: &str = "RESUME_FORMATTER_MAX_SESSIONS";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub paths: PathsConfig,
    pub service: ServiceConfig,
    pub render: RenderOptions,
    pub sessions: SessionLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub templates_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Processing is disabled while this is `None`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: Option<PathsConfig>,
    production: Option<PathsConfig>,
}

impl AppConfig {
    /// Load from `config.yaml` (if present) and the process environment
    pub fn load() -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_from(&base_dir, |key| std::env::var(key).ok())
    }

    /// Same as `load`, with an injectable base directory and variable lookup
    pub fn load_from<F>(base_dir: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = var("RESUME_FORMATTER_ENV")
            .or_else(|| var("ENVIRONMENT"))
            .unwrap_or_else(|| "local".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut paths = Self::load_paths(base_dir, &environment)?;
        if let Some(dir) = var(TEMPLATES_DIR_VAR) {
            paths.templates_path = PathBuf::from(dir);
        }
        if let Some(dir) = var(OUTPUT_DIR_VAR) {
            paths.output_path = PathBuf::from(dir);
        }
        paths.templates_path = resolve_path(base_dir, &paths.templates_path);
        paths.output_path = resolve_path(base_dir, &paths.output_path);

        let timeout_seconds =
            positive_var(var(TIMEOUT_VAR), TIMEOUT_VAR)?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let autoescape = var(AUTOESCAPE_VAR)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let defaults = SessionLimits::default();
        let sessions = SessionLimits {
            idle_ttl_minutes: positive_var(var(SESSION_TTL_VAR), SESSION_TTL_VAR)?
                .unwrap_or(defaults.idle_ttl_minutes),
            max_sessions: positive_var(var(MAX_SESSIONS_VAR), MAX_SESSIONS_VAR)?
                .unwrap_or(defaults.max_sessions),
        };

        Ok(Self {
            environment,
            paths,
            service: ServiceConfig {
                endpoint: var(ENDPOINT_VAR),
                api_key: var(API_KEY_VAR),
                timeout_seconds,
            },
            render: RenderOptions { autoescape },
            sessions,
        })
    }

    fn load_paths(base_dir: &Path, environment: &str) -> Result<PathsConfig> {
        let defaults = PathsConfig {
            templates_path: PathBuf::from("templates"),
            output_path: PathBuf::from("out"),
        };

        let config_path = base_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };
        Ok(section.unwrap_or(defaults))
    }

    pub fn with_templates_dir(mut self, dir: PathBuf) -> Self {
        self.paths.templates_path = dir;
        self
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.service.endpoint = Some(endpoint).filter(|e| !e.trim().is_empty());
        self
    }

    pub fn endpoint_configured(&self) -> bool {
        self.service.endpoint.is_some()
    }
}

fn positive_var<T>(raw: Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<T>() {
            Ok(value) if value > T::default() => Ok(Some(value)),
            _ => bail!("{} must be a positive number, got {:?}", name, raw),
        },
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), lookup(&[])).unwrap();

        assert_eq!(config.environment, "local");
        assert_eq!(config.paths.templates_path, dir.path().join("templates"));
        assert_eq!(config.paths.output_path, dir.path().join("out"));
        assert_eq!(config.service.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.service.endpoint.is_none());
        assert!(config.service.api_key.is_none());
        assert!(!config.render.autoescape);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(
            dir.path(),
            lookup(&[(ENDPOINT_VAR, "  "), (API_KEY_VAR, "")]),
        )
        .unwrap();
        assert!(!config.endpoint_configured());
        assert!(config.service.api_key.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(
            dir.path(),
            lookup(&[
                (ENDPOINT_VAR, "https://example.test/score"),
                (API_KEY_VAR, "k"),
                (TEMPLATES_DIR_VAR, "/srv/templates"),
                (TIMEOUT_VAR, "15"),
                (AUTOESCAPE_VAR, "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.service.endpoint.as_deref(), Some("https://example.test/score"));
        assert_eq!(config.service.api_key.as_deref(), Some("k"));
        assert_eq!(config.paths.templates_path, PathBuf::from("/srv/templates"));
        assert_eq!(config.service.timeout_seconds, 15);
        assert!(config.render.autoescape);
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for raw in ["soon", "0", "-5"] {
            assert!(AppConfig::load_from(dir.path(), lookup(&[(TIMEOUT_VAR, raw)])).is_err());
        }
    }

    #[test]
    fn test_session_limits() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), lookup(&[])).unwrap();
        assert_eq!(config.sessions, SessionLimits::default());

        let config = AppConfig::load_from(
            dir.path(),
            lookup(&[(SESSION_TTL_VAR, "5"), (MAX_SESSIONS_VAR, "3")]),
        )
        .unwrap();
        assert_eq!(config.sessions.idle_ttl_minutes, 5);
        assert_eq!(config.sessions.max_sessions, 3);

        for (name, raw) in [(SESSION_TTL_VAR, "-1"), (MAX_SESSIONS_VAR, "0")] {
            assert!(AppConfig::load_from(dir.path(), lookup(&[(name, raw)])).is_err());
        }
    }

    #[test]
    fn test_config_file_section_by_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "local:\n  templates_path: tpl\n  output_path: build\n\
             production:\n  templates_path: /app/templates\n  output_path: /app/out\n",
        )
        .unwrap();

        let local = AppConfig::load_from(dir.path(), lookup(&[])).unwrap();
        assert_eq!(local.paths.templates_path, dir.path().join("tpl"));
        assert_eq!(local.paths.output_path, dir.path().join("build"));

        let prod =
            AppConfig::load_from(dir.path(), lookup(&[("ENVIRONMENT", "production")])).unwrap();
        assert_eq!(prod.paths.templates_path, PathBuf::from("/app/templates"));
    }

    #[test]
    fn test_builder_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), lookup(&[]))
            .unwrap()
            .with_templates_dir(PathBuf::from("/tmp/t"))
            .with_endpoint("http://localhost:9/score".to_string());
        assert_eq!(config.paths.templates_path, PathBuf::from("/tmp/t"));
        assert!(config.endpoint_configured());
    }
}
