//! # WHOIS Check Library
//!
//! Looks up domain registration data across several public WHOIS HTTP APIs,
//! falling back from one provider to the next until one answers.
//!
//! Every provider speaks its own response shape. The library normalizes each
//! of them into a single [`CanonicalRecord`], so callers never see which
//! provider was used unless they ask for it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_check_lib::{prepare_domain, WhoisChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let domain = prepare_domain(" Example.COM ")?;
//!     let checker = WhoisChecker::new()?;
//!     let outcome = checker.lookup_with_source(&domain).await?;
//!
//!     println!("{} via {}", outcome.record.domain_name, outcome.provider);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered fallback**: providers are tried one at a time, first success wins
//! - **Format normalizers**: wrapped, key-renaming and proxied responses
//! - **Offline mode**: canned demo records as the last resort
//! - **Configurable**: TOML files and `WC_*` environment variables

pub use checker::WhoisChecker;
pub use config::{
    load_env_config, parse_duration_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    OutputConfig, ProviderEntry,
};
pub use error::{FailureReason, ProviderFailure, WhoisCheckError};
pub use providers::{
    build_request, canned_domains, normalize, NormalizeError, OfflineProvider, ProviderInvoker,
    ProviderRegistry, ProviderSpec, RequestPlan, ResponseFormat, Upstream,
};
pub use types::{CanonicalRecord, LookupConfig, LookupOutcome, LookupState};
pub use utils::{normalize_domain_input, prepare_domain, validate_domain, MAX_DOMAIN_LENGTH};

mod checker;
mod config;
mod error;
mod providers;
mod types;
mod utils;

pub type Result<T> = std::result::Result<T, WhoisCheckError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        providers: ProviderRegistry::builtin()
            .iter()
            .map(|spec| spec.name.clone())
            .collect(),
    }
}

/// Information about the library build and its built-in providers
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    /// Built-in provider names, in trial order
    pub providers: Vec<String>,
}
