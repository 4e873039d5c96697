use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Wayback-Capture
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the archive lives and how we talk to it
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Base URL of the archive, without a trailing slash
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Network timeout for a single request (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// S3-style API keys for the Save Page Now endpoints
#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    #[serde(rename = "access-key")]
    pub access_key: String,

    #[serde(rename = "secret-key")]
    pub secret_key: String,
}

/// Capture policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Reuse an existing capture if it is at most this many days old
    #[serde(rename = "max-capture-age", default = "default_max_capture_age")]
    pub max_capture_age: u32,

    /// Minimum time between two outbound requests (seconds)
    #[serde(rename = "period-secs", default = "default_period_secs")]
    pub period_secs: u64,

    /// Maximum number of job ids per status request
    #[serde(rename = "status-batch-size", default = "default_status_batch_size")]
    pub status_batch_size: usize,

    /// Extra form parameters sent with every capture request
    #[serde(default = "default_capture_options")]
    pub options: BTreeMap<String, toml::Value>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the progress snapshot written when a run is interrupted
    #[serde(rename = "progress-path", default = "default_progress_path")]
    pub progress_path: String,
}

impl CaptureConfig {
    /// Renders the capture options as form fields
    ///
    /// Booleans are sent as `1`/`0`, which is what the save endpoint expects
    /// for its flag parameters. Values that are not scalars are rejected by
    /// validation, so they never reach this point.
    pub fn form_options(&self) -> Vec<(String, String)> {
        self.options
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => u8::from(*b).to_string(),
                    _ => return None,
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

// Keep the keys out of debug output.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_capture_age: default_max_capture_age(),
            period_secs: default_period_secs(),
            status_batch_size: default_status_batch_size(),
            options: default_capture_options(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress_path: default_progress_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://web.archive.org".to_string()
}

fn default_user_agent() -> String {
    format!("wayback-capture/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_capture_age() -> u32 {
    30
}

fn default_period_secs() -> u64 {
    600
}

fn default_status_batch_size() -> usize {
    5
}

fn default_capture_options() -> BTreeMap<String, toml::Value> {
    let mut options = BTreeMap::new();
    options.insert("skip_first_archive".to_string(), toml::Value::Integer(1));
    options.insert("js_behavior_timeout".to_string(), toml::Value::Integer(0));
    options
}

fn default_progress_path() -> String {
    "progress.json".to_string()
}
