//! Save Page Now HTTP client
//!
//! This module implements [`ArchiveTransport`] over reqwest:
//! - Building the HTTP client with the configured user agent and timeout
//! - POSTing capture and status requests with the account credentials
//! - Resolving the latest capture through the archive's redirect
//! - Gating every request on the shared [`RateLimiter`]

use crate::capture::rate_limiter::RateLimiter;
use crate::capture::timestamp::CaptureTimestamp;
use crate::capture::transport::ArchiveTransport;
use crate::config::{ArchiveConfig, Config};
use crate::state::CaptureRequest;
use crate::CaptureError;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A failed call to the archive
///
/// Never leaves this module; callers see `None` or an empty result instead.
#[derive(Debug, Error)]
enum TransportError {
    #[error("{method} to {url} failed: {source}")]
    Http {
        method: &'static str,
        url: String,
        source: reqwest::Error,
    },

    #[error("{method} to {url} returned {status}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("response from {url} has an unexpected shape: expected {expected}, got {found}")]
    Shape {
        url: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Builds an HTTP client for the archive
///
/// Redirects are not followed: the latest-capture lookup needs to see the
/// 302 itself.
pub fn build_http_client(config: &ArchiveConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the Save Page Now API
#[derive(Debug)]
pub struct SpnClient {
    client: Client,
    base_url: String,
    authorization: String,
    options: Vec<(String, String)>,
    batch_size: usize,
    limiter: RateLimiter,
    location_pattern: Regex,
}

impl SpnClient {
    /// Creates a client from the configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wayback_capture::capture::SpnClient;
    /// use wayback_capture::config::load_config;
    /// use std::path::Path;
    ///
    /// let config = load_config(Path::new("capture.toml")).unwrap();
    /// let client = SpnClient::new(&config).unwrap();
    /// ```
    pub fn new(config: &Config) -> Result<Self, CaptureError> {
        let client = build_http_client(&config.archive)?;
        let base_url = config.archive.base_url.trim_end_matches('/').to_string();
        let location_pattern = Regex::new(&format!(
            r"^{}/web/(\d+)/http.*$",
            regex::escape(&base_url)
        ))?;

        Ok(Self {
            client,
            authorization: format!(
                "LOW {}:{}",
                config.credentials.access_key, config.credentials.secret_key
            ),
            options: config.capture.form_options(),
            batch_size: config.capture.status_batch_size.max(1),
            limiter: RateLimiter::new(Duration::from_secs(config.capture.period_secs)),
            location_pattern,
            base_url,
        })
    }

    /// Extracts the capture timestamp from a lookup redirect
    ///
    /// The location looks like `https://web.archive.org/web/20240101000000/https://example.com/`.
    fn parse_location(&self, location: &str) -> Option<CaptureTimestamp> {
        let captures = self.location_pattern.captures(location)?;
        CaptureTimestamp::parse(&captures[1])
    }

    /// POSTs a form to an API endpoint and decodes the JSON response
    async fn post_json(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);

        self.limiter.acquire().await;

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, &self.authorization)
            .form(form)
            .send()
            .await
            .map_err(|source| TransportError::Http {
                method: "POST",
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status {
                method: "POST",
                url,
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Http {
                method: "POST",
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| TransportError::Decode { url, source })
    }
}

impl ArchiveTransport for SpnClient {
    async fn submit_capture(&self, url: &str) -> Option<CaptureRequest> {
        let mut form: Vec<(String, String)> = self
            .options
            .iter()
            .filter(|(key, _)| key != "url")
            .cloned()
            .collect();
        form.push(("url".to_string(), url.to_string()));

        match self.post_json("/save", &form).await {
            Ok(response) => {
                let found = json_kind(&response);
                let request = CaptureRequest::from_response(response);
                if request.is_none() {
                    let e = TransportError::Shape {
                        url: format!("{}/save", self.base_url),
                        expected: "an object with string job_id and url",
                        found,
                    };
                    warn!("capture request for {} failed: {}", url, e);
                }
                request
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    async fn check_status_batch(&self, job_ids: &[String]) -> Vec<Value> {
        let mut results = Vec::new();

        for batch in job_ids.chunks(self.batch_size) {
            info!("checking capture request status for jobs:");
            for job_id in batch {
                info!("  {}", job_id);
            }

            let form = [("job_ids".to_string(), batch.join(","))];
            match self.post_json("/save/status", &form).await {
                Ok(Value::Array(batch_results)) => results.extend(batch_results),
                Ok(other) => {
                    let e = TransportError::Shape {
                        url: format!("{}/save/status", self.base_url),
                        expected: "a list",
                        found: json_kind(&other),
                    };
                    warn!("status check failed: {}", e);
                }
                Err(e) => {
                    warn!("status check failed: {}", e);
                }
            }
        }

        results
    }

    async fn resolve_last_capture(&self, url: &str) -> Option<CaptureTimestamp> {
        // "/web/2/" redirects to the newest capture of the URL
        let lookup_url = format!("{}/web/2/{}", self.base_url, url);

        self.limiter.acquire().await;

        let response = match self.client.get(&lookup_url).send().await {
            Ok(response) => response,
            Err(source) => {
                let e = TransportError::Http {
                    method: "GET",
                    url: lookup_url,
                    source,
                };
                warn!("{}", e);
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::FOUND {
            debug!("GET to {} returned {}", lookup_url, status);
            return None;
        }

        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            warn!("GET to {} redirected without a location", lookup_url);
            return None;
        };

        let timestamp = self.parse_location(location);
        if timestamp.is_none() {
            debug!("no capture timestamp in location {}", location);
        }
        timestamp
    }
}

/// Names the JSON type of a value for log messages
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
