//! The validated in-memory envelope.

use crate::certificate::Certificate;

/// Constructor-time invariant violations, naming the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("envelope payload cannot be empty")]
    EmptyPayload,

    #[error("envelope signature cannot be empty")]
    EmptySignature,

    #[error("envelope must contain at least one certificate")]
    NoCertificates,
}

/// A signed attestation envelope: payload, detached signature, and the
/// certificate chain (leaf first) of whoever produced it.
///
/// Construction is the validation point — a constructed envelope always
/// satisfies its invariants and is immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    payload: Vec<u8>,
    signature: Vec<u8>,
    certificates: Vec<Certificate>,
    algorithm: Option<String>,
}

impl Envelope {
    pub fn new(
        payload: Vec<u8>,
        signature: Vec<u8>,
        certificates: Vec<Certificate>,
        algorithm: Option<String>,
    ) -> Result<Self, EnvelopeError> {
        if payload.is_empty() {
            return Err(EnvelopeError::EmptyPayload);
        }
        if signature.is_empty() {
            return Err(EnvelopeError::EmptySignature);
        }
        if certificates.is_empty() {
            return Err(EnvelopeError::NoCertificates);
        }
        Ok(Self {
            payload,
            signature,
            certificates,
            algorithm,
        })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Certificates in wire order: index 0 is the leaf, the rest are
    /// candidate issuers.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Hash-algorithm hint declared by the envelope, if any.
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// The certificate whose private key produced the signature.
    pub fn leaf_certificate(&self) -> &Certificate {
        &self.certificates[0]
    }
}
