//! Certification-path construction against a caller-supplied root set.
//!
//! The envelope's trailing certificates are an unordered pool of candidate
//! issuers; the path from the leaf is built by depth-bounded search, linking
//! certificates by issuer name and TBS signature. Authorities outside the
//! configured root set are accepted as intermediate links. Revocation is
//! never consulted: trust here is chain structure, signatures, and validity
//! windows only.

use crate::certificate::Certificate;
use crate::envelope::Envelope;
use crate::signature::{self, HashAlgorithm};
use crate::verifier::VerifierOptions;
use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ECDSA_WITH_SHA_512, SHA_256_WITH_RSA_ENCRYPTION,
    SHA_384_WITH_RSA_ENCRYPTION, SHA_512_WITH_RSA_ENCRYPTION,
};
use const_oid::ObjectIdentifier;
use std::collections::HashSet;
use std::time::SystemTime;

/// Termination bound against pathological or cyclic issuer pools.
const MAX_PATH_DEPTH: usize = 10;

/// Build and validate a trust path from the envelope's leaf to a trusted
/// root as of the configured evaluation time.
///
/// On success the message list is empty; on failure it carries the
/// accumulated diagnostics, deduplicated in first-seen order.
pub(crate) fn validate_chain(
    envelope: &Envelope,
    options: &VerifierOptions,
) -> (bool, Vec<String>) {
    if options.trusted_roots.is_empty() {
        return (
            false,
            vec!["No trusted root certificates were provided.".to_string()],
        );
    }

    let at: SystemTime = options.evaluation_time.into();
    let leaf = envelope.leaf_certificate();
    let pool = &envelope.certificates()[1..];

    let mut diagnostics = Vec::new();
    let mut in_path: Vec<Vec<u8>> = Vec::new();
    if build_path(
        leaf,
        pool,
        &options.trusted_roots,
        at,
        0,
        &mut in_path,
        &mut diagnostics,
    ) {
        return (true, Vec::new());
    }

    let mut messages = dedup(diagnostics);
    messages.push(format!(
        "No certification path from '{}' to a trusted root could be built.",
        leaf.subject()
    ));
    (false, messages)
}

fn build_path(
    subject: &Certificate,
    pool: &[Certificate],
    roots: &[Certificate],
    at: SystemTime,
    depth: usize,
    in_path: &mut Vec<Vec<u8>>,
    diagnostics: &mut Vec<String>,
) -> bool {
    if depth >= MAX_PATH_DEPTH {
        diagnostics.push(format!(
            "Certification path exceeds the maximum depth of {MAX_PATH_DEPTH}."
        ));
        return false;
    }

    if !subject.valid_at(at) {
        diagnostics.push(format!(
            "Certificate '{}' is outside its validity window.",
            subject.subject()
        ));
        return false;
    }

    // The subject itself being a configured root ends the path.
    if roots.iter().any(|root| root == subject) {
        return true;
    }

    for root in roots {
        if root.subject_name() != subject.issuer_name() {
            continue;
        }
        if let Err(diagnostic) = verify_signed_by(subject, root) {
            diagnostics.push(diagnostic);
            continue;
        }
        if root.valid_at(at) {
            return true;
        }
        diagnostics.push(format!(
            "Trusted root '{}' is outside its validity window.",
            root.subject()
        ));
    }

    for candidate in pool {
        if in_path.iter().any(|der| der == candidate.der()) {
            continue;
        }
        if candidate.subject_name() != subject.issuer_name() {
            continue;
        }
        if let Err(diagnostic) = verify_signed_by(subject, candidate) {
            diagnostics.push(diagnostic);
            continue;
        }
        in_path.push(candidate.der().to_vec());
        if build_path(candidate, pool, roots, at, depth + 1, in_path, diagnostics) {
            return true;
        }
        in_path.pop();
    }

    false
}

/// Check that `issuer`'s key verifies `subject`'s certificate signature.
fn verify_signed_by(subject: &Certificate, issuer: &Certificate) -> Result<(), String> {
    let oid = subject.signature_algorithm_oid();
    let hash = signature_hash(oid).ok_or_else(|| {
        format!(
            "Certificate '{}' uses an unsupported signature algorithm: {oid}",
            subject.subject()
        )
    })?;

    let issuer_key = signature::public_key(issuer)
        .map_err(|diagnostic| format!("Issuer '{}': {diagnostic}", issuer.subject()))?;
    let tbs = subject.tbs_der().map_err(|e| {
        format!(
            "Certificate '{}' could not be re-encoded for verification: {e}",
            subject.subject()
        )
    })?;
    let signature_bytes = subject.signature_bytes().ok_or_else(|| {
        format!(
            "Certificate '{}' has a malformed signature field.",
            subject.subject()
        )
    })?;

    signature::verify_with_key(&issuer_key, &tbs, signature_bytes, hash).map_err(|_| {
        format!(
            "Signature of '{}' does not verify against claimed issuer '{}'.",
            subject.subject(),
            issuer.subject()
        )
    })
}

fn signature_hash(oid: ObjectIdentifier) -> Option<HashAlgorithm> {
    if oid == SHA_256_WITH_RSA_ENCRYPTION || oid == ECDSA_WITH_SHA_256 {
        Some(HashAlgorithm::Sha256)
    } else if oid == SHA_384_WITH_RSA_ENCRYPTION || oid == ECDSA_WITH_SHA_384 {
        Some(HashAlgorithm::Sha384)
    } else if oid == SHA_512_WITH_RSA_ENCRYPTION || oid == ECDSA_WITH_SHA_512 {
        Some(HashAlgorithm::Sha512)
    } else {
        None
    }
}

fn dedup(messages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|message| seen.insert(message.clone()))
        .collect()
}
