//! Response normalization.
//!
//! Maps each provider's raw JSON into a [`CanonicalRecord`]. This is the only
//! place that knows what provider responses look like; supporting a new
//! shape means adding an arm here and one in `request`.

use crate::providers::registry::ResponseFormat;
use crate::types::{string_or_list, CanonicalRecord};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Why a payload could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The payload does not have the shape the format promises
    NotRecognized(String),
    /// The format tag is outside the supported set
    UnsupportedFormat(String),
    /// A proxy format was used without knowing the wrapped provider's format
    MissingUpstream,
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecognized(detail) => write!(f, "unrecognized response shape: {}", detail),
            Self::UnsupportedFormat(tag) => write!(f, "unsupported response format '{}'", tag),
            Self::MissingUpstream => write!(f, "proxy response without an upstream format"),
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Normalize a raw provider payload.
///
/// # Arguments
///
/// * `payload` - The parsed JSON body
/// * `format` - The provider's response format
/// * `upstream` - For proxy formats, the format of the wrapped provider
pub fn normalize(
    payload: &Value,
    format: &ResponseFormat,
    upstream: Option<&ResponseFormat>,
) -> Result<CanonicalRecord, NormalizeError> {
    let record = match format {
        ResponseFormat::Wrapped => normalize_wrapped(payload)?,
        ResponseFormat::KeyRenaming => normalize_key_renaming(payload)?,
        ResponseFormat::ProxyEnvelope => {
            let inner = upstream.ok_or(NormalizeError::MissingUpstream)?;
            // Without a `contents` string the proxy forwarded the body as-is
            let contents = match payload.get("contents") {
                Some(Value::String(contents)) if !contents.is_empty() => contents,
                None | Some(Value::Null) | Some(Value::String(_)) => {
                    return normalize(payload, inner, None)
                }
                Some(_) => {
                    return Err(NormalizeError::NotRecognized(
                        "proxy 'contents' is not a string".into(),
                    ))
                }
            };
            let unwrapped: Value = serde_json::from_str(contents).map_err(|e| {
                NormalizeError::NotRecognized(format!("proxy 'contents' is not JSON: {}", e))
            })?;
            return normalize(&unwrapped, inner, None);
        }
        ResponseFormat::ProxyPassthrough => {
            let inner = upstream.ok_or(NormalizeError::MissingUpstream)?;
            return normalize(payload, inner, None);
        }
        ResponseFormat::Offline => CanonicalRecord::deserialize(payload)
            .map_err(|e| NormalizeError::NotRecognized(e.to_string()))?,
        ResponseFormat::Unsupported(tag) => {
            return Err(NormalizeError::UnsupportedFormat(tag.clone()))
        }
    };

    if record.domain_name.trim().is_empty() {
        return Err(NormalizeError::NotRecognized("empty domainName".into()));
    }
    Ok(record)
}

fn normalize_wrapped(payload: &Value) -> Result<CanonicalRecord, NormalizeError> {
    let succeeded = payload.get("status").and_then(Value::as_str) == Some("success")
        || payload.get("success").and_then(Value::as_bool) == Some(true);
    if !succeeded {
        return Err(NormalizeError::NotRecognized(
            "success flag missing or false".into(),
        ));
    }

    match payload.get("data") {
        Some(data) if data.is_object() => CanonicalRecord::deserialize(data)
            .map_err(|e| NormalizeError::NotRecognized(e.to_string())),
        _ => Err(NormalizeError::NotRecognized("no nested 'data' object".into())),
    }
}

/// Flat provider shape that names its date fields differently.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenamedFields {
    domain_name: String,
    #[serde(default, deserialize_with = "string_or_list")]
    status: Vec<String>,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    expires_date: Option<String>,
    #[serde(default)]
    updated_date: Option<String>,
    #[serde(default)]
    registrar_name: Option<String>,
    #[serde(default, rename = "registrarIANAID")]
    registrar_iana_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    name_servers: Vec<String>,
}

fn normalize_key_renaming(payload: &Value) -> Result<CanonicalRecord, NormalizeError> {
    if payload.get("domainName").and_then(Value::as_str).is_none() {
        return Err(NormalizeError::NotRecognized("missing 'domainName'".into()));
    }

    let fields = RenamedFields::deserialize(payload)
        .map_err(|e| NormalizeError::NotRecognized(e.to_string()))?;

    Ok(CanonicalRecord {
        domain_name: fields.domain_name,
        status: fields.status,
        creation_date: fields.created_date,
        expiration_date: fields.expires_date,
        updated_date: fields.updated_date,
        registrar_name: fields.registrar_name,
        registrar_id: fields.registrar_iana_id,
        name_servers: fields.name_servers,
    })
}
