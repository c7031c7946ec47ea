//! Request construction per response format.
//!
//! Kept apart from normalization so each map can be tested on its own.

use crate::providers::registry::{ProviderSpec, ResponseFormat};
use std::fmt;

/// What the invoker has to do for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    /// Issue `GET url`
    Http { url: String },
    /// Answer from the built-in table, no network
    Offline,
}

/// A provider whose request cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedRequest(pub String);

impl fmt::Display for UnsupportedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot build a request for format '{}'", self.0)
    }
}

impl std::error::Error for UnsupportedRequest {}

/// Build the request for `spec` looking up `domain`.
pub fn build_request(spec: &ProviderSpec, domain: &str) -> Result<RequestPlan, UnsupportedRequest> {
    let url = match &spec.format {
        ResponseFormat::Offline => return Ok(RequestPlan::Offline),
        ResponseFormat::ProxyEnvelope | ResponseFormat::ProxyPassthrough => {
            let upstream = spec
                .upstream
                .as_ref()
                .ok_or_else(|| UnsupportedRequest(format!("{} without upstream", spec.format)))?;
            let target = direct_url(&upstream.endpoint, &upstream.format, domain)?;
            if spec.format == ResponseFormat::ProxyEnvelope {
                format!("{}{}", spec.endpoint, urlencoding::encode(&target))
            } else {
                format!("{}{}", spec.endpoint, target)
            }
        }
        format => direct_url(&spec.endpoint, format, domain)?,
    };

    Ok(RequestPlan::Http { url })
}

/// URL for a provider queried directly (not through a proxy).
fn direct_url(
    endpoint: &str,
    format: &ResponseFormat,
    domain: &str,
) -> Result<String, UnsupportedRequest> {
    let domain = urlencoding::encode(domain);
    match format {
        ResponseFormat::Wrapped => Ok(format!(
            "{}{}domainName={}",
            endpoint,
            query_separator(endpoint),
            domain
        )),
        ResponseFormat::KeyRenaming => Ok(format!(
            "{}{}domain={}&format=json",
            endpoint,
            query_separator(endpoint),
            domain
        )),
        other => Err(UnsupportedRequest(other.tag().to_string())),
    }
}

fn query_separator(endpoint: &str) -> char {
    if endpoint.contains('?') {
        '&'
    } else {
        '?'
    }
}
