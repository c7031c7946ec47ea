//! Fallback orchestration.
//!
//! This module provides [`WhoisChecker`], which tries each provider of the
//! registry in order until one returns a record.

use crate::error::{ProviderFailure, WhoisCheckError};
use crate::providers::{ProviderInvoker, ProviderRegistry};
use crate::types::{CanonicalRecord, LookupConfig, LookupOutcome};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Instant;

/// Looks domains up across an ordered list of providers.
///
/// Providers are tried one at a time, in registry order. The first provider
/// that returns a record wins; later providers are never contacted. Failed
/// attempts are logged and recorded, and only surface to the caller when
/// every provider has failed.
///
/// # Example
///
/// ```rust,no_run
/// use whois_check_lib::WhoisChecker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = WhoisChecker::new()?;
///     let record = checker.lookup("example.com").await?;
///     println!("Registrar: {:?}", record.registrar_name);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WhoisChecker {
    /// Configuration settings for this checker instance
    config: LookupConfig,
    /// Providers in trial order
    registry: ProviderRegistry,
    /// Runs individual attempts
    invoker: ProviderInvoker,
}

impl WhoisChecker {
    /// Create a checker with the built-in registry and default configuration.
    ///
    /// Defaults: 10 second budget per provider, 1 second offline delay,
    /// placeholder records enabled.
    pub fn new() -> Result<Self, WhoisCheckError> {
        Self::with_config(LookupConfig::default(), ProviderRegistry::builtin())
    }

    /// Create a checker with a custom configuration and registry.
    ///
    /// # Example
    ///
    /// ```rust
    /// use whois_check_lib::{LookupConfig, ProviderRegistry, WhoisChecker};
    /// use std::time::Duration;
    ///
    /// let config = LookupConfig::default().with_timeout(Duration::from_secs(5));
    /// let checker = WhoisChecker::with_config(config, ProviderRegistry::builtin()).unwrap();
    /// assert_eq!(checker.registry().len(), 4);
    /// ```
    pub fn with_config(
        config: LookupConfig,
        registry: ProviderRegistry,
    ) -> Result<Self, WhoisCheckError> {
        let invoker = ProviderInvoker::with_config(&config)?;
        Ok(Self {
            config,
            registry,
            invoker,
        })
    }

    /// Look up a domain and return its canonical record.
    ///
    /// The domain is expected to be validated by the caller.
    ///
    /// # Errors
    ///
    /// Returns `AllProvidersFailed` with every per-provider cause when no
    /// provider produced a record.
    pub async fn lookup(&self, domain: &str) -> Result<CanonicalRecord, WhoisCheckError> {
        self.lookup_with_source(domain)
            .await
            .map(|outcome| outcome.record)
    }

    /// Look up a domain and report which provider answered.
    pub async fn lookup_with_source(&self, domain: &str) -> Result<LookupOutcome, WhoisCheckError> {
        if domain.trim().is_empty() {
            return Err(WhoisCheckError::invalid_domain(
                domain,
                "Domain name cannot be empty",
            ));
        }

        let start_time = Instant::now();
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for spec in &self.registry {
            tracing::debug!(provider = %spec.name, domain, "trying provider");

            match self.invoker.invoke(spec, domain).await {
                Ok(record) => {
                    tracing::info!(provider = %spec.name, domain, "lookup succeeded");
                    return Ok(LookupOutcome {
                        record,
                        provider: spec.name.clone(),
                        offline: spec.is_offline(),
                        duration: start_time.elapsed(),
                        failures,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %spec.name,
                        domain,
                        reason = %e.reason(),
                        "provider failed: {}",
                        e
                    );
                    failures.push(e.to_provider_failure().unwrap_or_else(|| ProviderFailure {
                        provider: spec.name.clone(),
                        reason: e.reason(),
                        message: e.to_string(),
                        status_code: None,
                    }));
                }
            }
        }

        tracing::error!(domain, attempts = failures.len(), "all providers failed");
        Err(WhoisCheckError::AllProvidersFailed {
            domain: domain.to_string(),
            causes: failures,
        })
    }

    /// Look up several domains, yielding results as each one completes.
    ///
    /// Lookups run one after another; a new one starts only when the
    /// previous one has finished.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use whois_check_lib::WhoisChecker;
    /// use futures::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let checker = WhoisChecker::new()?;
    ///     let domains = vec!["example.com".to_string(), "github.com".to_string()];
    ///
    ///     let mut stream = checker.lookup_stream(&domains);
    ///     while let Some((domain, result)) = stream.next().await {
    ///         match result {
    ///             Ok(outcome) => println!("{} via {}", domain, outcome.provider),
    ///             Err(e) => println!("{}: {}", domain, e),
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn lookup_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = (String, Result<LookupOutcome, WhoisCheckError>)> + Send + '_>>
    {
        let domains = domains.to_vec();
        let stream = futures::stream::iter(domains).then(move |domain| async move {
            let result = self.lookup_with_source(&domain).await;
            (domain, result)
        });

        Box::pin(stream)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// The providers this checker tries, in order.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::providers::{ProviderSpec, ResponseFormat};
    use std::time::Duration;

    fn offline_config() -> LookupConfig {
        LookupConfig::default().with_offline_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_offline_only_lookup() {
        let checker =
            WhoisChecker::with_config(offline_config(), ProviderRegistry::offline_only()).unwrap();
        let outcome = checker.lookup_with_source("github.com").await.unwrap();

        assert!(outcome.offline);
        assert_eq!(outcome.provider, "Demo Mode");
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.record.name_servers.len(), 8);
    }

    #[tokio::test]
    async fn test_unsupported_format_falls_through() {
        let registry = ProviderRegistry::new(vec![
            ProviderSpec::new(
                "Odd",
                "http://127.0.0.1:9",
                ResponseFormat::Unsupported("xml".into()),
            ),
            ProviderSpec::offline(),
        ])
        .unwrap();
        let checker = WhoisChecker::with_config(offline_config(), registry).unwrap();

        let outcome = checker.lookup_with_source("google.com").await.unwrap();
        assert_eq!(outcome.provider, "Demo Mode");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].reason, FailureReason::UnrecognizedFormat);
    }

    #[tokio::test]
    async fn test_exhausted_registry_aggregates_causes() {
        let registry = ProviderRegistry::new(vec![
            ProviderSpec::new(
                "Odd",
                "http://127.0.0.1:9",
                ResponseFormat::Unsupported("xml".into()),
            ),
            ProviderSpec::offline(),
        ])
        .unwrap();
        let config = offline_config().with_offline_placeholder(false);
        let checker = WhoisChecker::with_config(config, registry).unwrap();

        let err = checker.lookup("not-canned.example").await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::AllFailed);
        match &err {
            WhoisCheckError::AllProvidersFailed { causes, .. } => {
                assert_eq!(causes.len(), 2);
                assert_eq!(causes[0].provider, "Odd");
                assert_eq!(causes[1].reason, FailureReason::NoRecord);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_domain_is_rejected() {
        let checker =
            WhoisChecker::with_config(offline_config(), ProviderRegistry::offline_only()).unwrap();

        let err = checker.lookup("").await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidInput);
        assert!(checker.lookup("   ").await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_stream_preserves_order() {
        let checker =
            WhoisChecker::with_config(offline_config(), ProviderRegistry::offline_only()).unwrap();
        let domains = vec!["google.com".to_string(), "github.com".to_string()];

        let results: Vec<_> = checker.lookup_stream(&domains).collect().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "google.com");
        assert_eq!(results[1].0, "github.com");
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
