//! Error handling for WHOIS lookup operations.
//!
//! Every failure carries a [`FailureReason`] so callers can pick a
//! user-facing message without inspecting error text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of machine-distinguishable failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The attempt exceeded its time budget
    Timeout,
    /// DNS, connect or read failure
    Network,
    /// The provider answered with a non-2xx status
    HttpStatus,
    /// The response body was not valid JSON
    MalformedBody,
    /// Valid JSON that the normalizer could not map, or an unsupported format tag
    UnrecognizedFormat,
    /// The offline provider has no record and placeholder synthesis is off
    NoRecord,
    /// Every provider in the registry failed
    AllFailed,
    /// The domain string was rejected before any lookup
    InvalidInput,
    /// Invalid configuration (empty registry, bad timeout, ...)
    Config,
    /// Anything else (I/O, serialization of output)
    Internal,
}

impl FailureReason {
    /// Whether a failure with this reason is recovered by trying the next provider.
    pub fn is_per_provider(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Network
                | Self::HttpStatus
                | Self::MalformedBody
                | Self::UnrecognizedFormat
                | Self::NoRecord
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::HttpStatus => "http-status",
            Self::MalformedBody => "malformed-body",
            Self::UnrecognizedFormat => "unrecognized-format",
            Self::NoRecord => "no-record",
            Self::AllFailed => "all-failed",
            Self::InvalidInput => "invalid-input",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

/// One swallowed per-provider failure, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Name of the provider that failed
    pub provider: String,
    /// Why it failed
    pub reason: FailureReason,
    /// Human-readable detail
    pub message: String,
    /// HTTP status, when the provider answered with one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.provider, self.reason, self.message)
    }
}

/// Main error type for WHOIS lookups.
#[derive(Debug, Clone)]
pub enum WhoisCheckError {
    /// Invalid domain name format
    InvalidDomain { domain: String, reason: String },

    /// A single provider attempt failed
    LookupFailed {
        provider: String,
        reason: FailureReason,
        message: String,
        status_code: Option<u16>,
    },

    /// Every provider failed; causes are in trial order
    AllProvidersFailed {
        domain: String,
        causes: Vec<ProviderFailure>,
    },

    /// Configuration errors (invalid settings, empty registry, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl WhoisCheckError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new per-provider lookup failure.
    pub fn lookup_failed<P: Into<String>, M: Into<String>>(
        provider: P,
        reason: FailureReason,
        message: M,
    ) -> Self {
        Self::LookupFailed {
            provider: provider.into(),
            reason,
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a per-provider failure for a non-2xx HTTP answer.
    pub fn http_status<P: Into<String>>(provider: P, status_code: u16, message: &str) -> Self {
        Self::LookupFailed {
            provider: provider.into(),
            reason: FailureReason::HttpStatus,
            message: format!("HTTP {}: {}", status_code, message),
            status_code: Some(status_code),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The structured cause of this error.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::InvalidDomain { .. } => FailureReason::InvalidInput,
            Self::LookupFailed { reason, .. } => *reason,
            Self::AllProvidersFailed { .. } => FailureReason::AllFailed,
            Self::ConfigError { .. } | Self::FileError { .. } => FailureReason::Config,
            Self::Internal { .. } => FailureReason::Internal,
        }
    }

    /// The last recorded per-provider cause, if this is an aggregate failure.
    pub fn last_cause(&self) -> Option<&ProviderFailure> {
        match self {
            Self::AllProvidersFailed { causes, .. } => causes.last(),
            _ => None,
        }
    }

    /// Convert a per-provider failure into its diagnostic record.
    ///
    /// Returns `None` for errors that are not attributable to a provider.
    pub fn to_provider_failure(&self) -> Option<ProviderFailure> {
        match self {
            Self::LookupFailed {
                provider,
                reason,
                message,
                status_code,
            } => Some(ProviderFailure {
                provider: provider.clone(),
                reason: *reason,
                message: message.clone(),
                status_code: *status_code,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for WhoisCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::LookupFailed {
                provider,
                reason,
                message,
                ..
            } => {
                write!(f, "{} failed ({}): {}", provider, reason, message)
            }
            Self::AllProvidersFailed { domain, causes } => {
                write!(
                    f,
                    "All {} providers failed for '{}'",
                    causes.len(),
                    domain
                )?;
                if let Some(last) = causes.last() {
                    write!(f, " (last: {})", last)?;
                }
                Ok(())
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for WhoisCheckError {}

impl From<serde_json::Error> for WhoisCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON processing failed: {}", err),
        }
    }
}

impl From<std::io::Error> for WhoisCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for WhoisCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
