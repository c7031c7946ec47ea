//! Lookup providers.
//!
//! This module contains the provider registry, the per-format request
//! builders and response normalizers, the HTTP invoker and the offline demo
//! provider.

/// Ordered provider list and format tags
pub mod registry;

/// Raw payload → canonical record
pub mod normalize;

/// Format → request URL
pub mod request;

/// Single provider attempt with timeout
pub mod invoker;

/// Built-in demo data
pub mod offline;

// Re-export commonly used functions and types
pub use invoker::ProviderInvoker;
pub use normalize::{normalize, NormalizeError};
pub use offline::{canned_domains, OfflineProvider};
pub use registry::{ProviderRegistry, ProviderSpec, ResponseFormat, Upstream};
pub use request::{build_request, RequestPlan};
