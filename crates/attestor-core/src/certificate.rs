//! Certificate encodings and the parsed certificate value.
//!
//! Accepts PEM-framed or bare base64 DER on the way in, emits PEM on the way
//! out. Equality is by raw DER bytes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use x509_cert::der::{Decode, Encode};
use x509_cert::name::Name;
use x509_cert::spki::ObjectIdentifier;

const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";
const PEM_FOOTER: &str = "-----END CERTIFICATE-----";
const PEM_LINE_WIDTH: usize = 64;

/// Failures while decoding or loading a certificate.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("certificate is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("certificate is not a valid X.509 structure: {0}")]
    InvalidDer(#[from] x509_cert::der::Error),

    #[error("failed to read certificate file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed X.509 certificate together with its raw DER bytes.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    parsed: x509_cert::Certificate,
}

impl Certificate {
    /// Parse a certificate from raw DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let parsed = x509_cert::Certificate::from_der(der)?;
        Ok(Self {
            der: der.to_vec(),
            parsed,
        })
    }

    /// Decode a textual certificate: PEM-framed if the header marker is
    /// present, otherwise the whole string is treated as base64 DER.
    pub fn decode(text: &str) -> Result<Self, CertificateError> {
        let base64_body = if text.contains(PEM_HEADER) {
            strip_pem(text)
        } else {
            text.chars().filter(|c| !c.is_whitespace()).collect()
        };
        let der = BASE64.decode(base64_body)?;
        Self::from_der(&der)
    }

    /// Load a certificate from a PEM or base64-DER file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CertificateError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CertificateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&content)
    }

    /// Emit the certificate as PEM: base64 DER wrapped at a fixed line
    /// width, framed by the standard header and footer.
    pub fn encode_pem(&self) -> String {
        let encoded = BASE64.encode(&self.der);
        let mut pem = String::with_capacity(encoded.len() + PEM_HEADER.len() + PEM_FOOTER.len() + 8);
        pem.push_str(PEM_HEADER);
        pem.push('\n');
        let mut remaining = encoded.as_str();
        while !remaining.is_empty() {
            let (line, rest) = remaining.split_at(remaining.len().min(PEM_LINE_WIDTH));
            pem.push_str(line);
            pem.push('\n');
            remaining = rest;
        }
        pem.push_str(PEM_FOOTER);
        pem.push('\n');
        pem
    }

    /// Raw DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name, RFC 4514 rendering.
    pub fn subject(&self) -> String {
        self.parsed.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name, RFC 4514 rendering.
    pub fn issuer(&self) -> String {
        self.parsed.tbs_certificate.issuer.to_string()
    }

    /// Whether the certificate's validity window contains `at`.
    pub fn valid_at(&self, at: SystemTime) -> bool {
        let validity = &self.parsed.tbs_certificate.validity;
        at >= validity.not_before.to_system_time() && at <= validity.not_after.to_system_time()
    }

    pub(crate) fn subject_name(&self) -> &Name {
        &self.parsed.tbs_certificate.subject
    }

    pub(crate) fn issuer_name(&self) -> &Name {
        &self.parsed.tbs_certificate.issuer
    }

    pub(crate) fn spki(&self) -> &x509_cert::spki::SubjectPublicKeyInfoOwned {
        &self.parsed.tbs_certificate.subject_public_key_info
    }

    pub(crate) fn signature_algorithm_oid(&self) -> ObjectIdentifier {
        self.parsed.signature_algorithm.oid
    }

    pub(crate) fn signature_bytes(&self) -> Option<&[u8]> {
        self.parsed.signature.as_bytes()
    }

    /// DER of the to-be-signed portion, the message an issuer signed.
    pub(crate) fn tbs_der(&self) -> Result<Vec<u8>, x509_cert::der::Error> {
        self.parsed.tbs_certificate.to_der()
    }
}

fn strip_pem(pem: &str) -> String {
    let mut body = String::with_capacity(pem.len());
    for line in pem.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') {
            continue;
        }
        body.push_str(trimmed);
    }
    body
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject())
            .field("issuer", &self.issuer())
            .finish()
    }
}
