//! JSON wire format for envelopes.
//!
//! ```text
//! {
//!   "payload": "<base64>",
//!   "signature": "<base64>",
//!   "certificates": ["<PEM or base64-DER>", ...],   // leaf first
//!   "algorithm": "SHA256" | "SHA384" | "SHA512" | null
//! }
//! ```
//!
//! Field names are matched case-insensitively on read; output always uses
//! the canonical lowercase names and is indented for readability.

use crate::certificate::{Certificate, CertificateError};
use crate::envelope::{Envelope, EnvelopeError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Structural failures while reading or writing envelope JSON. Kept apart
/// from trust decisions: these mean "this input is garbage", not "this
/// envelope is untrusted".
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("envelope JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope JSON must be an object")]
    NotAnObject,

    #[error("envelope is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("envelope field '{field}' is not valid base64: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("failed to read envelope file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Wire model mirroring the JSON shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct EnvelopeModel {
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    certificates: Vec<String>,
    #[serde(default)]
    algorithm: Option<String>,
}

/// Deserialize a JSON envelope into the validated in-memory form.
pub fn deserialize(json: &str) -> Result<Envelope, CodecError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;

    // Case-insensitive field matching: lowercase the top-level keys before
    // the typed decode.
    let mut normalized = serde_json::Map::with_capacity(object.len());
    for (key, value) in object {
        normalized.insert(key.to_ascii_lowercase(), value.clone());
    }
    let model: EnvelopeModel = serde_json::from_value(serde_json::Value::Object(normalized))?;

    let payload_b64 = non_blank(model.payload.as_deref()).ok_or(CodecError::MissingField("payload"))?;
    let signature_b64 =
        non_blank(model.signature.as_deref()).ok_or(CodecError::MissingField("signature"))?;
    if model.certificates.is_empty() {
        return Err(CodecError::MissingField("certificates"));
    }

    let payload = BASE64
        .decode(payload_b64)
        .map_err(|source| CodecError::InvalidBase64 {
            field: "payload",
            source,
        })?;
    let signature = BASE64
        .decode(signature_b64)
        .map_err(|source| CodecError::InvalidBase64 {
            field: "signature",
            source,
        })?;
    let certificates = model
        .certificates
        .iter()
        .map(|entry| Certificate::decode(entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Envelope::new(payload, signature, certificates, model.algorithm)?)
}

/// Serialize an envelope into indented JSON, emitting certificates as PEM.
pub fn serialize(envelope: &Envelope) -> Result<String, CodecError> {
    let model = EnvelopeModel {
        payload: Some(BASE64.encode(envelope.payload())),
        signature: Some(BASE64.encode(envelope.signature())),
        certificates: envelope
            .certificates()
            .iter()
            .map(Certificate::encode_pem)
            .collect(),
        algorithm: envelope.algorithm().map(str::to_string),
    };
    Ok(serde_json::to_string_pretty(&model)?)
}

/// Read an envelope from a file. I/O failures surface as [`CodecError::Read`]
/// so callers can tell "file missing" from "file malformed".
pub fn read_from_path(path: impl AsRef<Path>) -> Result<Envelope, CodecError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize(&json)
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}
