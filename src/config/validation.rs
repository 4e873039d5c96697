use crate::config::types::{ArchiveConfig, CaptureConfig, Config, CredentialsConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on job ids per status request
const MAX_STATUS_BATCH_SIZE: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_archive_config(&config.archive)?;
    validate_credentials(&config.credentials)?;
    validate_capture_config(&config.capture)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates archive connection settings
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot carry a query or fragment",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates API credentials
fn validate_credentials(config: &CredentialsConfig) -> Result<(), ConfigError> {
    if config.access_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "access-key cannot be empty".to_string(),
        ));
    }

    if config.secret_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "secret-key cannot be empty".to_string(),
        ));
    }

    // The authorization header is "LOW access:secret"
    if config.access_key.contains(':') || config.access_key.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(
            "access-key cannot contain ':' or whitespace".to_string(),
        ));
    }

    Ok(())
}

/// Validates capture policy
fn validate_capture_config(config: &CaptureConfig) -> Result<(), ConfigError> {
    if config.status_batch_size < 1 || config.status_batch_size > MAX_STATUS_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "status-batch-size must be between 1 and {}, got {}",
            MAX_STATUS_BATCH_SIZE, config.status_batch_size
        )));
    }

    for (key, value) in &config.options {
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "capture option names cannot be empty".to_string(),
            ));
        }

        if key == "url" {
            return Err(ConfigError::Validation(
                "'url' is set per request and cannot be a capture option".to_string(),
            ));
        }

        if matches!(
            value,
            toml::Value::Array(_) | toml::Value::Table(_) | toml::Value::Datetime(_)
        ) {
            return Err(ConfigError::Validation(format!(
                "capture option '{}' must be a string, number or boolean",
                key
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.progress_path.is_empty() {
        return Err(ConfigError::Validation(
            "progress-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
