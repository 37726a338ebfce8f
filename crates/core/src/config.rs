use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_COMPOSER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "composer-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

// ─── Wizard Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// How many recent campaigns are fetched to back name autocomplete.
    #[serde(default = "default_suggestion_fetch_size")]
    pub suggestion_fetch_size: usize,
    /// Maximum suggestions returned for a single query.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// SMS bodies longer than this many segments raise a content warning.
    #[serde(default = "default_sms_max_segments")]
    pub sms_max_segments: u32,
    /// Sessions untouched for longer than this are evicted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Interval between idle-session sweeps.
    #[serde(default = "default_session_sweep_secs")]
    pub session_sweep_secs: u64,
}

fn default_suggestion_fetch_size() -> usize { 20 }
fn default_max_suggestions() -> usize { 5 }
fn default_sms_max_segments() -> u32 { 3 }
fn default_session_ttl_secs() -> u64 { 3600 }
fn default_session_sweep_secs() -> u64 { 60 }

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            suggestion_fetch_size: default_suggestion_fetch_size(),
            max_suggestions: default_max_suggestions(),
            sms_max_segments: default_sms_max_segments(),
            session_ttl_secs: default_session_ttl_secs(),
            session_sweep_secs: default_session_sweep_secs(),
        }
    }
}

// ─── Validation Config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    /// Percentage-of-total placeholder counts.
    Mock,
    /// Rules evaluated against the entered recipient records.
    Rules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_evaluator")]
    pub evaluator: EvaluatorKind,
    /// Relative jitter (0.0..=1.0) applied to mock counts. Zero keeps them exact.
    #[serde(default)]
    pub jitter_pct: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Identifiers (email or phone) treated as blacklisted by the rules evaluator.
    #[serde(default)]
    pub blocklist: Vec<String>,
    /// Identifiers treated as do-not-disturb by the rules evaluator.
    #[serde(default)]
    pub do_not_disturb: Vec<String>,
}

fn default_evaluator() -> EvaluatorKind { EvaluatorKind::Mock }
fn default_seed() -> u64 { 42 }

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            evaluator: default_evaluator(),
            jitter_pct: 0.0,
            seed: default_seed(),
            blocklist: Vec::new(),
            do_not_disturb: Vec::new(),
        }
    }
}

// ─── Storage Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base URL under which uploaded files are served. Must end with `/`.
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_storage_base_url() -> String { "http://localhost:8080/files/".to_string() }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            wizard: WizardConfig::default(),
            validation: ValidationConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment
    /// variables (which take precedence).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_COMPOSER")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("validation.blocklist")
                .with_list_parse_key("validation.do_not_disturb"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
