//! Signature validation: hash resolution, key-family dispatch, and the
//! low-level verify primitive shared with chain building.
//!
//! Every cryptographic failure here becomes a diagnostic string — a
//! signature that does not verify is an expected, testable outcome, never a
//! fault propagated to the caller.

use crate::certificate::Certificate;
use crate::envelope::Envelope;
use crate::verifier::VerifierOptions;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1};
use const_oid::ObjectIdentifier;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;

/// Hash algorithms an envelope may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Case-insensitive parse of the wire names. Unknown names are `None`;
    /// the caller decides how leniently to handle them.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA384" => Some(Self::Sha384),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key family of a certificate's subject public key.
pub(crate) enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
}

/// Extract the public key from a certificate's SPKI. Unsupported or
/// malformed keys come back as a diagnostic string, not a fault.
pub(crate) fn public_key(certificate: &Certificate) -> Result<PublicKey, String> {
    let spki = certificate.spki();
    let key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| "certificate public key has trailing unused bits".to_string())?;

    let algorithm = spki.algorithm.oid;
    if algorithm == RSA_ENCRYPTION {
        RsaPublicKey::from_pkcs1_der(key_bytes)
            .map(PublicKey::Rsa)
            .map_err(|e| format!("malformed RSA public key: {e}"))
    } else if algorithm == ID_EC_PUBLIC_KEY {
        let curve: ObjectIdentifier = spki
            .algorithm
            .parameters
            .as_ref()
            .and_then(|parameters| parameters.decode_as().ok())
            .ok_or_else(|| "EC public key does not name its curve".to_string())?;
        if curve == SECP_256_R_1 {
            p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                .map(PublicKey::EcdsaP256)
                .map_err(|e| format!("malformed P-256 public key: {e}"))
        } else if curve == SECP_384_R_1 {
            p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                .map(PublicKey::EcdsaP384)
                .map_err(|e| format!("malformed P-384 public key: {e}"))
        } else {
            Err(format!("Unsupported elliptic curve: {curve}"))
        }
    } else {
        Err(format!("Unsupported public key algorithm: {algorithm}"))
    }
}

/// Verify `signature` over `message` with the given key and hash.
///
/// RSA uses PKCS#1 v1.5 padding. ECDSA accepts both ASN.1 DER and
/// fixed-width signature encodings, and verifies the prehash so any of the
/// supported digests works on either curve.
pub(crate) fn verify_with_key(
    key: &PublicKey,
    message: &[u8],
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<(), String> {
    match key {
        PublicKey::Rsa(rsa_key) => {
            let scheme = match hash {
                HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
                HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
                HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
            };
            rsa_key
                .verify(scheme, &hash.digest(message), signature)
                .map_err(|e| format!("RSA signature verification failed: {e}"))
        }
        PublicKey::EcdsaP256(verifying_key) => {
            use p256::ecdsa::signature::hazmat::PrehashVerifier;
            let parsed = p256::ecdsa::Signature::from_der(signature)
                .or_else(|_| p256::ecdsa::Signature::from_slice(signature))
                .map_err(|e| format!("malformed ECDSA signature: {e}"))?;
            verifying_key
                .verify_prehash(&hash.digest(message), &parsed)
                .map_err(|e| format!("ECDSA signature verification failed: {e}"))
        }
        PublicKey::EcdsaP384(verifying_key) => {
            use p384::ecdsa::signature::hazmat::PrehashVerifier;
            let parsed = p384::ecdsa::Signature::from_der(signature)
                .or_else(|_| p384::ecdsa::Signature::from_slice(signature))
                .map_err(|e| format!("malformed ECDSA signature: {e}"))?;
            verifying_key
                .verify_prehash(&hash.digest(message), &parsed)
                .map_err(|e| format!("ECDSA signature verification failed: {e}"))
        }
    }
}

/// Validate the envelope's payload signature against its leaf certificate.
///
/// Returns the verdict, the hash algorithm actually used, and any
/// diagnostics gathered on the way (including the soft unknown-hash
/// warning, which does not abort verification).
pub(crate) fn validate_signature(
    envelope: &Envelope,
    options: &VerifierOptions,
) -> (bool, HashAlgorithm, Vec<String>) {
    let mut diagnostics = Vec::new();
    let hash = resolve_hash_algorithm(
        envelope.algorithm(),
        options.default_hash_algorithm,
        &mut diagnostics,
    );

    let valid = match public_key(envelope.leaf_certificate()) {
        Ok(key) => match verify_with_key(&key, envelope.payload(), envelope.signature(), hash) {
            Ok(()) => true,
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                false
            }
        },
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            false
        }
    };

    (valid, hash, diagnostics)
}

/// Absent or blank declarations use the default; an unrecognized name is a
/// soft warning and falls back to the default rather than hard-failing.
fn resolve_hash_algorithm(
    declared: Option<&str>,
    default: HashAlgorithm,
    diagnostics: &mut Vec<String>,
) -> HashAlgorithm {
    let Some(name) = declared.map(str::trim).filter(|name| !name.is_empty()) else {
        return default;
    };
    match HashAlgorithm::parse(name) {
        Some(hash) => hash,
        None => {
            diagnostics.push(format!(
                "Unknown hash algorithm '{name}', falling back to {default}."
            ));
            default
        }
    }
}
