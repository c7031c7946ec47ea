//! Offline demo provider.
//!
//! Answers from a small built-in table of well-known domains and, for
//! anything else, a clearly labeled placeholder record. It never touches the
//! network, but still waits a fixed delay so callers see the same timing
//! behavior as with a real provider.

use crate::error::{FailureReason, WhoisCheckError};
use crate::types::CanonicalRecord;
use std::collections::HashMap;
use std::time::Duration;

/// Status entry marking a synthesized record.
pub const PLACEHOLDER_STATUS: &str = "Demo Mode - live data requires a reachable provider";

/// Registrar name used on synthesized records.
pub const PLACEHOLDER_REGISTRAR: &str = "Demo Registrar";

fn record(
    domain: &str,
    status: &[&str],
    dates: [&str; 3],
    registrar: (&str, &str),
    name_servers: &[&str],
) -> CanonicalRecord {
    CanonicalRecord {
        domain_name: domain.to_string(),
        status: status.iter().map(|s| s.to_string()).collect(),
        creation_date: Some(dates[0].to_string()),
        expiration_date: Some(dates[1].to_string()),
        updated_date: Some(dates[2].to_string()),
        registrar_name: Some(registrar.0.to_string()),
        registrar_id: Some(registrar.1.to_string()),
        name_servers: name_servers.iter().map(|s| s.to_string()).collect(),
    }
}

lazy_static::lazy_static! {
    static ref CANNED_RECORDS: HashMap<&'static str, CanonicalRecord> = HashMap::from([
        (
            "google.com",
            record(
                "google.com",
                &[
                    "clientTransferProhibited",
                    "clientUpdateProhibited",
                    "clientDeleteProhibited",
                    "serverTransferProhibited",
                    "serverUpdateProhibited",
                    "serverDeleteProhibited",
                ],
                ["1997-09-15T00:00:00Z", "2028-09-13T00:00:00Z", "2023-09-07T08:58:19Z"],
                ("MarkMonitor Inc.", "292"),
                &["ns1.google.com", "ns2.google.com", "ns3.google.com", "ns4.google.com"],
            ),
        ),
        (
            "github.com",
            record(
                "github.com",
                &["clientDeleteProhibited", "clientTransferProhibited", "clientUpdateProhibited"],
                ["2007-10-09T18:20:50Z", "2025-10-09T18:20:50Z", "2023-09-07T09:10:44Z"],
                ("MarkMonitor Inc.", "292"),
                &[
                    "dns1.p08.nsone.net",
                    "dns2.p08.nsone.net",
                    "dns3.p08.nsone.net",
                    "dns4.p08.nsone.net",
                    "ns-1283.awsdns-32.org",
                    "ns-1707.awsdns-21.co.uk",
                    "ns-421.awsdns-52.com",
                    "ns-520.awsdns-01.net",
                ],
            ),
        ),
    ]);
}

/// Domains present in the built-in table, sorted.
pub fn canned_domains() -> Vec<&'static str> {
    let mut domains: Vec<&'static str> = CANNED_RECORDS.keys().copied().collect();
    domains.sort_unstable();
    domains
}

/// The canned record for `domain`, if the table has one.
pub fn canned_record(domain: &str) -> Option<CanonicalRecord> {
    CANNED_RECORDS.get(domain.to_lowercase().as_str()).cloned()
}

/// A labeled stand-in record for domains the table does not know.
pub fn placeholder_record(domain: &str) -> CanonicalRecord {
    record(
        domain,
        &[PLACEHOLDER_STATUS],
        ["2020-01-01T00:00:00Z", "2025-01-01T00:00:00Z", "2024-01-01T00:00:00Z"],
        (PLACEHOLDER_REGISTRAR, "000"),
        &["ns1.demo.com", "ns2.demo.com"],
    )
}

/// The offline provider.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    delay: Duration,
    placeholder: bool,
}

impl OfflineProvider {
    pub fn new(delay: Duration, placeholder: bool) -> Self {
        Self { delay, placeholder }
    }

    /// Answer a lookup from the built-in table.
    ///
    /// # Errors
    ///
    /// Fails with [`FailureReason::NoRecord`] only when placeholders are
    /// disabled and the domain is not in the table.
    pub async fn lookup(
        &self,
        provider: &str,
        domain: &str,
    ) -> Result<CanonicalRecord, WhoisCheckError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if domain.trim().is_empty() {
            return Err(WhoisCheckError::lookup_failed(
                provider,
                FailureReason::NoRecord,
                "no demo data for an empty domain name",
            ));
        }

        if let Some(record) = canned_record(domain) {
            return Ok(record);
        }

        if self.placeholder {
            tracing::debug!(domain, "no canned record, synthesizing placeholder");
            Ok(placeholder_record(domain))
        } else {
            Err(WhoisCheckError::lookup_failed(
                provider,
                FailureReason::NoRecord,
                format!("no demo data for '{}'", domain),
            ))
        }
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), true)
    }
}
