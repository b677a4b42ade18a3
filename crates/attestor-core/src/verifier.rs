//! The verifier orchestrator: runs chain and signature validation, probes
//! the payload as JSON, and assembles the structured result.

use crate::certificate::Certificate;
use crate::chain;
use crate::envelope::Envelope;
use crate::signature::{self, HashAlgorithm};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Options controlling how envelopes are validated.
///
/// Constructed once, immutable while held by a [`Verifier`]. The trusted
/// root set is always caller-supplied — there is no platform trust store
/// fallback — and the evaluation time defaults to the wall clock at
/// construction.
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    pub trusted_roots: Vec<Certificate>,
    /// Instant at which certificate validity windows are evaluated.
    pub evaluation_time: DateTime<Utc>,
    /// Hash used to validate signatures when the envelope declares none.
    pub default_hash_algorithm: HashAlgorithm,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            trusted_roots: Vec::new(),
            evaluation_time: Utc::now(),
            default_hash_algorithm: HashAlgorithm::default(),
        }
    }
}

/// Validates envelopes by inspecting signatures and certificate chains.
///
/// A single instance holds one [`VerifierOptions`] and may be reused across
/// calls and threads; each `verify` builds its own working state.
#[derive(Debug)]
pub struct Verifier {
    options: VerifierOptions,
}

impl Verifier {
    pub fn new(options: VerifierOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Verify an envelope. Chain and signature validation both always run —
    /// the result reports both signals — and nothing input-driven is a
    /// fault: forged or misconfigured envelopes come back as a result with
    /// `errors` populated.
    pub fn verify(&self, envelope: &Envelope) -> VerificationResult {
        let mut errors = Vec::new();

        let (chain_valid, chain_messages) = chain::validate_chain(envelope, &self.options);
        errors.extend(chain_messages);

        let (signature_valid, hash, signature_diagnostics) =
            signature::validate_signature(envelope, &self.options);
        errors.extend(signature_diagnostics);

        let payload_json = match serde_json::from_slice::<serde_json::Value>(envelope.payload()) {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push("Payload is not valid JSON; returning raw bytes.".to_string());
                None
            }
        };

        if !chain_valid {
            errors.push("Certificate chain validation failed.".to_string());
        }
        if !signature_valid {
            errors.push(format!("Payload signature validation failed (hash: {hash})."));
        }

        debug!(
            chain_valid,
            signature_valid,
            hash = %hash,
            error_count = errors.len(),
            "envelope verification finished"
        );

        VerificationResult {
            chain_valid,
            signature_valid,
            errors,
            payload: envelope.payload().to_vec(),
            payload_json,
            leaf_certificate: envelope.leaf_certificate().clone(),
        }
    }
}

/// Output of a verification attempt. Produced fresh per call; chain and
/// signature validity are independent axes, and `errors` carries both hard
/// diagnostics and soft warnings.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub chain_valid: bool,
    pub signature_valid: bool,
    pub errors: Vec<String>,
    pub payload: Vec<u8>,
    /// Parsed payload, present only when the payload is valid JSON.
    pub payload_json: Option<serde_json::Value>,
    pub leaf_certificate: Certificate,
}

impl VerificationResult {
    /// Fully valid: chain and signature verified and no diagnostics at all,
    /// soft warnings included.
    pub fn is_valid(&self) -> bool {
        self.chain_valid && self.signature_valid && self.errors.is_empty()
    }
}
