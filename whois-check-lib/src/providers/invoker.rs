//! Provider invocation.
//!
//! Executes one provider attempt: builds the request for its format, runs it
//! under a time budget and hands the parsed body to the normalizer. Every
//! failure comes back as [`WhoisCheckError::LookupFailed`] with a
//! [`FailureReason`].

use crate::error::{FailureReason, WhoisCheckError};
use crate::providers::normalize::normalize;
use crate::providers::offline::OfflineProvider;
use crate::providers::registry::ProviderSpec;
use crate::providers::request::{build_request, RequestPlan};
use crate::types::{CanonicalRecord, LookupConfig};
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Runs single provider attempts.
#[derive(Clone)]
pub struct ProviderInvoker {
    /// HTTP client shared by all attempts
    http_client: reqwest::Client,
    /// Budget for each HTTP attempt
    timeout: Duration,
    /// Answers offline-format providers
    offline: OfflineProvider,
}

impl ProviderInvoker {
    /// Create an invoker with default settings.
    pub fn new() -> Result<Self, WhoisCheckError> {
        Self::with_config(&LookupConfig::default())
    }

    /// Create an invoker from a lookup configuration.
    pub fn with_config(config: &LookupConfig) -> Result<Self, WhoisCheckError> {
        let http_client = reqwest::Client::builder()
            // Add buffer for HTTP timeout
            .timeout(config.timeout.saturating_add(Duration::from_secs(2)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                WhoisCheckError::internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            timeout: config.timeout,
            offline: OfflineProvider::new(config.offline_delay, config.offline_placeholder),
        })
    }

    /// The per-attempt time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look `domain` up with one provider.
    ///
    /// # Errors
    ///
    /// Returns `LookupFailed` on network errors, non-2xx statuses, timeouts,
    /// bodies that are not JSON and payloads the normalizer does not
    /// recognize.
    pub async fn invoke(
        &self,
        spec: &ProviderSpec,
        domain: &str,
    ) -> Result<CanonicalRecord, WhoisCheckError> {
        let plan = build_request(spec, domain).map_err(|e| {
            WhoisCheckError::lookup_failed(
                &spec.name,
                FailureReason::UnrecognizedFormat,
                e.to_string(),
            )
        })?;

        let url = match plan {
            RequestPlan::Offline => return self.offline.lookup(&spec.name, domain).await,
            RequestPlan::Http { url } => url,
        };

        tracing::debug!(provider = %spec.name, %url, "sending lookup request");

        // Dropping the future on expiry aborts the in-flight request
        let payload = match tokio::time::timeout(self.timeout, self.fetch_json(spec, &url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(WhoisCheckError::lookup_failed(
                    &spec.name,
                    FailureReason::Timeout,
                    format!("no response within {:?}", self.timeout),
                ))
            }
        };

        let upstream = spec.upstream.as_ref().map(|u| &u.format);
        normalize(&payload, &spec.format, upstream).map_err(|e| {
            tracing::warn!(
                provider = %spec.name,
                format = %spec.format,
                error = %e,
                "provider response did not match its format; contract may have changed"
            );
            WhoisCheckError::lookup_failed(
                &spec.name,
                FailureReason::UnrecognizedFormat,
                e.to_string(),
            )
        })
    }

    /// Send the request and parse the body as JSON.
    async fn fetch_json(
        &self,
        spec: &ProviderSpec,
        url: &str,
    ) -> Result<serde_json::Value, WhoisCheckError> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(&spec.name, e))?;

        let status = response.status();
        tracing::debug!(provider = %spec.name, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            return Err(WhoisCheckError::http_status(
                &spec.name,
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(&spec.name, e))?;

        serde_json::from_str(&body).map_err(|e| {
            WhoisCheckError::lookup_failed(
                &spec.name,
                FailureReason::MalformedBody,
                format!("response is not JSON: {}", e),
            )
        })
    }
}

fn request_error(provider: &str, err: reqwest::Error) -> WhoisCheckError {
    let reason = if err.is_timeout() {
        FailureReason::Timeout
    } else {
        FailureReason::Network
    };
    WhoisCheckError::lookup_failed(provider, reason, err.to_string())
}
