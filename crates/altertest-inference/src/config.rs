//! Configuration loading and inference backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use altertest_core::engine::EngineConfig;
use altertest_core::inference::InferenceClient;
use altertest_core::traits::{InferenceService, TEXT_PLACEHOLDER};

use crate::http::HttpInferenceService;

/// Settings for the external inference service.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Endpoint accepting `{ "input": ... }` and returning `{ "output": ... }`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Instruction template; must contain `{text}`.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("prompt_template", &self.prompt_template)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            api_key: None,
            prompt_template: None,
        }
    }
}

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Trials per session.
    #[serde(default = "default_trial_count")]
    pub trial_count: usize,
    /// Upper bound of the confidence scale.
    #[serde(default = "default_confidence_max")]
    pub confidence_max: u8,
    /// Idle lifetime of a session in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Ask the inference service about every trial.
    #[serde(default = "default_true")]
    pub compare_model: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: default_trial_count(),
            confidence_max: default_confidence_max(),
            ttl_secs: default_ttl(),
            compare_model: true,
        }
    }
}

/// Top-level altertest configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AltertestConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Default corpus file or directory.
    #[serde(default)]
    pub corpus: Option<PathBuf>,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_endpoint() -> String {
    "http://localhost:8080/infer".to_string()
}
fn default_timeout() -> u64 {
    45
}
fn default_trial_count() -> usize {
    3
}
fn default_confidence_max() -> u8 {
    100
}
fn default_ttl() -> u64 {
    60 * 60
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./altertest-results")
}

impl AltertestConfig {
    /// Engine settings derived from the session section.
    pub fn engine_config(&self, seed: Option<u64>) -> EngineConfig {
        EngineConfig {
            confidence_max: self.session.confidence_max,
            session_ttl: Duration::from_secs(self.session.ttl_secs),
            seed,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned. An unclosed
/// `${` is kept as is; unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `altertest.toml` in the current directory
/// 2. `~/.config/altertest/config.toml`
///
/// Environment variable overrides: `ALTERTEST_ENDPOINT`, `ALTERTEST_API_KEY`.
pub fn load_config() -> Result<AltertestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AltertestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("altertest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AltertestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AltertestConfig::default(),
    };

    // Apply env var overrides
    if let Ok(endpoint) = std::env::var("ALTERTEST_ENDPOINT") {
        config.inference.endpoint = endpoint;
    }
    if let Ok(key) = std::env::var("ALTERTEST_API_KEY") {
        config.inference.api_key = Some(key);
    }

    config.inference.endpoint = resolve_env_vars(&config.inference.endpoint);
    config.inference.api_key = config
        .inference
        .api_key
        .as_deref()
        .map(resolve_env_vars)
        .filter(|k| !k.is_empty());

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AltertestConfig) -> Result<()> {
    anyhow::ensure!(
        config.inference.timeout_secs >= 1,
        "inference.timeout_secs must be at least 1"
    );
    anyhow::ensure!(
        config.session.ttl_secs >= 1,
        "session.ttl_secs must be at least 1"
    );
    anyhow::ensure!(
        config.session.confidence_max >= 1,
        "session.confidence_max must be at least 1"
    );
    if let Some(template) = &config.inference.prompt_template {
        anyhow::ensure!(
            template.contains(TEXT_PLACEHOLDER),
            "inference.prompt_template must contain {TEXT_PLACEHOLDER}"
        );
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("altertest"))
}

/// Create the HTTP inference service described by the config.
pub fn create_service(config: &InferenceConfig) -> Result<Arc<dyn InferenceService>> {
    let service = HttpInferenceService::new(
        &config.endpoint,
        config.api_key.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Arc::new(service))
}

/// Create an inference client over `service` honoring the template and timeout.
pub fn create_client(
    config: &InferenceConfig,
    service: Arc<dyn InferenceService>,
) -> InferenceClient {
    let client =
        InferenceClient::new(service).with_timeout(Duration::from_secs(config.timeout_secs));
    match &config.prompt_template {
        Some(template) => client.with_template(template.clone()),
        None => client,
    }
}
