//! Provider registry: the ordered, read-only list of lookup providers.
//!
//! Order defines trial priority. The built-in registry always ends with the
//! offline demo provider so a lookup never runs out of providers.

use crate::error::WhoisCheckError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Endpoint sentinel for the offline provider.
pub const OFFLINE_ENDPOINT: &str = "demo";

const FREEAPI_ENDPOINT: &str = "https://whois.freeapi.app/api/whois";

/// How to build a provider's request and read its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    /// `{status: "success", data: {...}}`, queried with `?domainName=`
    Wrapped,
    /// Flat object with provider-specific keys, queried with `?domain=&format=json`
    KeyRenaming,
    /// Proxy returning `{contents: "<upstream body as string>"}`
    ProxyEnvelope,
    /// Proxy forwarding the upstream body untouched
    ProxyPassthrough,
    /// Built-in canned data, no network
    Offline,
    /// A tag outside the closed set (from configuration)
    Unsupported(String),
}

impl ResponseFormat {
    /// The configuration tag for this format.
    pub fn tag(&self) -> &str {
        match self {
            Self::Wrapped => "freeapi",
            Self::KeyRenaming => "whoisapi",
            Self::ProxyEnvelope => "proxy",
            Self::ProxyPassthrough => "corsproxy",
            Self::Offline => "demo",
            Self::Unsupported(tag) => tag,
        }
    }

    /// Whether this format wraps another provider.
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::ProxyEnvelope | Self::ProxyPassthrough)
    }
}

impl FromStr for ResponseFormat {
    type Err = std::convert::Infallible;

    /// Parse a configuration tag. Unknown tags become `Unsupported` rather
    /// than an error so they fail per provider at lookup time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "freeapi" | "wrapped" => Self::Wrapped,
            "whoisapi" | "key-renaming" => Self::KeyRenaming,
            "proxy" | "allorigins" => Self::ProxyEnvelope,
            "corsproxy" | "passthrough" => Self::ProxyPassthrough,
            "demo" | "offline" => Self::Offline,
            _ => Self::Unsupported(s.trim().to_string()),
        })
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ResponseFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ResponseFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(tag.parse().unwrap_or(Self::Unsupported(tag)))
    }
}

/// The provider a proxy forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    pub endpoint: String,
    pub format: ResponseFormat,
}

/// Static description of one lookup provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Human-readable identifier for logging and attribution
    pub name: String,
    /// Base URL, or [`OFFLINE_ENDPOINT`]
    pub endpoint: String,
    /// Request/response format
    pub format: ResponseFormat,
    /// Wrapped provider, for proxy formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<Upstream>,
}

impl ProviderSpec {
    pub fn new<N: Into<String>, E: Into<String>>(
        name: N,
        endpoint: E,
        format: ResponseFormat,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            format,
            upstream: None,
        }
    }

    /// Attach the provider this proxy wraps.
    pub fn via<E: Into<String>>(mut self, endpoint: E, format: ResponseFormat) -> Self {
        self.upstream = Some(Upstream {
            endpoint: endpoint.into(),
            format,
        });
        self
    }

    /// The built-in offline demo provider.
    pub fn offline() -> Self {
        Self::new("Demo Mode", OFFLINE_ENDPOINT, ResponseFormat::Offline)
    }

    pub fn is_offline(&self) -> bool {
        self.format == ResponseFormat::Offline
    }
}

/// Ordered, immutable list of providers.
///
/// Cloning is cheap: the list is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Arc<[ProviderSpec]>,
}

impl ProviderRegistry {
    /// Build a registry from an ordered list of providers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the list is empty, if the offline
    /// provider appears anywhere but last, or if a proxy has no upstream.
    pub fn new(providers: Vec<ProviderSpec>) -> Result<Self, WhoisCheckError> {
        if providers.is_empty() {
            return Err(WhoisCheckError::config(
                "Provider registry must contain at least one provider",
            ));
        }

        let last = providers.len() - 1;
        for (index, spec) in providers.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(WhoisCheckError::config(format!(
                    "Provider #{} has an empty name",
                    index + 1
                )));
            }
            if spec.is_offline() && index != last {
                return Err(WhoisCheckError::config(format!(
                    "Offline provider '{}' must be the last entry",
                    spec.name
                )));
            }
            if spec.format.is_proxy() && spec.upstream.is_none() {
                return Err(WhoisCheckError::config(format!(
                    "Proxy provider '{}' needs an upstream endpoint and format",
                    spec.name
                )));
            }
            if let ResponseFormat::Unsupported(tag) = &spec.format {
                tracing::warn!(
                    provider = %spec.name,
                    tag = %tag,
                    "unsupported response format; provider will always fail"
                );
            }
        }

        if !providers[last].is_offline() {
            tracing::warn!("registry has no trailing offline provider; lookups can fail outright");
        }

        Ok(Self {
            providers: providers.into(),
        })
    }

    /// The default registry: direct API, two proxies, then offline demo data.
    pub fn builtin() -> Self {
        Self {
            providers: builtin_providers().into(),
        }
    }

    /// A registry holding only the offline provider.
    pub fn offline_only() -> Self {
        Self {
            providers: vec![ProviderSpec::offline()].into(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderSpec> {
        self.providers.iter()
    }

    pub fn providers(&self) -> &[ProviderSpec] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Whether the last entry is the offline provider.
    pub fn ends_with_offline(&self) -> bool {
        self.providers.last().is_some_and(ProviderSpec::is_offline)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a ProviderRegistry {
    type Item = &'a ProviderSpec;
    type IntoIter = std::slice::Iter<'a, ProviderSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn builtin_providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec::new("FreeAPI Direct", FREEAPI_ENDPOINT, ResponseFormat::Wrapped),
        ProviderSpec::new(
            "AllOrigins Proxy",
            "https://api.allorigins.win/get?url=",
            ResponseFormat::ProxyEnvelope,
        )
        .via(FREEAPI_ENDPOINT, ResponseFormat::Wrapped),
        ProviderSpec::new(
            "CorsProxy.io",
            "https://corsproxy.io/?",
            ResponseFormat::ProxyPassthrough,
        )
        .via(FREEAPI_ENDPOINT, ResponseFormat::Wrapped),
        ProviderSpec::offline(),
    ]
}
