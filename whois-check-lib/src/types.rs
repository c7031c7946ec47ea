//! Core data types for WHOIS lookups.
//!
//! This module defines the canonical record every provider response is
//! normalized into, the configuration of a checker and the small value
//! objects callers use to track a lookup.

use crate::error::{FailureReason, ProviderFailure};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Provider-agnostic registration details for one domain.
///
/// Field names follow the camelCase shape most providers already use, so a
/// payload in that shape deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// The registered domain name (never empty)
    pub domain_name: String,

    /// Registry status codes (e.g., "clientTransferProhibited"), source order
    #[serde(default, deserialize_with = "string_or_list")]
    pub status: Vec<String>,

    /// When the domain was first registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    /// When the domain registration expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Last update date of the domain record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    /// The registrar that manages this domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar_name: Option<String>,

    /// IANA registrar id
    #[serde(
        default,
        alias = "registrarIANAID",
        skip_serializing_if = "Option::is_none"
    )]
    pub registrar_id: Option<String>,

    /// Name servers, exactly as the provider listed them
    #[serde(default, deserialize_with = "string_or_list")]
    pub name_servers: Vec<String>,
}

impl CanonicalRecord {
    /// Create a record with only the domain name set.
    pub fn new<D: Into<String>>(domain_name: D) -> Self {
        Self {
            domain_name: domain_name.into(),
            status: Vec::new(),
            creation_date: None,
            expiration_date: None,
            updated_date: None,
            registrar_name: None,
            registrar_id: None,
            name_servers: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accept `"ok"`, `["ok", "active"]` or `null` for list fields.
pub(crate) fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// A successful lookup together with where the data came from.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    /// The normalized record
    pub record: CanonicalRecord,

    /// Name of the provider that answered
    pub provider: String,

    /// Whether the answer came from the built-in offline provider
    pub offline: bool,

    /// Total time spent across all attempts
    #[serde(skip)]
    pub duration: Duration,

    /// Providers that failed before this one answered, in trial order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ProviderFailure>,
}

/// Configuration options for lookups.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Time budget for each provider attempt
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Artificial latency of the offline provider
    /// Default: 1 second
    pub offline_delay: Duration,

    /// Whether the offline provider synthesizes a placeholder for unknown domains
    /// Default: true
    pub offline_placeholder: bool,

    /// User-Agent sent to HTTP providers
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            offline_delay: Duration::from_secs(1),
            offline_placeholder: true,
            user_agent: format!("whois-check/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LookupConfig {
    /// Set the per-provider time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the offline provider's artificial delay.
    pub fn with_offline_delay(mut self, delay: Duration) -> Self {
        self.offline_delay = delay;
        self
    }

    /// Enable or disable placeholder records from the offline provider.
    pub fn with_offline_placeholder(mut self, enabled: bool) -> Self {
        self.offline_placeholder = enabled;
        self
    }
}

/// Caller-owned state of a single lookup.
///
/// The library never touches presentation state; front-ends drive their
/// rendering from this value instead.
#[derive(Debug, Clone, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading { domain: String },
    Success(Box<LookupOutcome>),
    Error { domain: String, reason: FailureReason, message: String },
}

impl LookupState {
    /// Whether a lookup is in flight; callers refuse re-entry while it is.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Move to `Loading`. Returns `false` (and stays put) if already loading.
    pub fn begin<D: Into<String>>(&mut self, domain: D) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = Self::Loading {
            domain: domain.into(),
        };
        true
    }

    /// Settle the state from a lookup result.
    pub fn finish(&mut self, result: crate::Result<LookupOutcome>) {
        let domain = match self {
            Self::Loading { domain } => std::mem::take(domain),
            _ => String::new(),
        };
        *self = match result {
            Ok(outcome) => Self::Success(Box::new(outcome)),
            Err(e) => Self::Error {
                domain,
                reason: e.reason(),
                message: e.to_string(),
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WhoisCheckError;

    #[test]
    fn test_record_accepts_single_status_string() {
        let record: CanonicalRecord = serde_json::from_value(serde_json::json!({
            "domainName": "example.com",
            "status": "ok",
            "nameServers": null
        }))
        .unwrap();

        assert_eq!(record.status, vec!["ok".to_string()]);
        assert!(record.name_servers.is_empty());
    }

    #[test]
    fn test_record_keeps_name_server_order_and_duplicates() {
        let record: CanonicalRecord = serde_json::from_value(serde_json::json!({
            "domainName": "example.com",
            "nameServers": ["b.ns.net", "a.ns.net", "b.ns.net"]
        }))
        .unwrap();

        assert_eq!(record.name_servers, vec!["b.ns.net", "a.ns.net", "b.ns.net"]);
    }

    #[test]
    fn test_registrar_iana_id_alias() {
        let record: CanonicalRecord = serde_json::from_value(serde_json::json!({
            "domainName": "example.com",
            "registrarIANAID": "292"
        }))
        .unwrap();
        assert_eq!(record.registrar_id.as_deref(), Some("292"));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["registrarId"], "292");
        assert!(out.get("creationDate").is_none());
    }

    #[test]
    fn test_lookup_state_refuses_reentry() {
        let mut state = LookupState::default();
        assert!(state.begin("example.com"));
        assert!(!state.begin("other.com"));

        state.finish(Err(WhoisCheckError::AllProvidersFailed {
            domain: "example.com".to_string(),
            causes: Vec::new(),
        }));

        match &state {
            LookupState::Error { domain, reason, .. } => {
                assert_eq!(domain, "example.com");
                assert_eq!(*reason, FailureReason::AllFailed);
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(state.begin("other.com"));
    }

    #[test]
    fn test_config_builders() {
        let config = LookupConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_offline_delay(Duration::ZERO)
            .with_offline_placeholder(false);

        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.offline_delay, Duration::ZERO);
        assert!(!config.offline_placeholder);
    }
}
