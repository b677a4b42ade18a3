//! Verification of signed attestation envelopes.
//!
//! An envelope carries a payload, a detached signature, and an ordered
//! certificate chain (leaf first) asserting who produced the payload. The
//! verifier answers: is this payload authentic, and who signed it, as of a
//! given time, against a caller-supplied set of trusted roots?
//!
//! Trust anchors are always explicit — nothing here reads a platform trust
//! store — and revocation is never consulted: chain trust is evaluated on
//! chain structure and validity windows only.

pub mod certificate;
pub mod codec;
pub mod envelope;
pub mod verifier;

mod chain;
mod signature;

// Convenience re-exports
pub use certificate::{Certificate, CertificateError};
pub use codec::{deserialize, read_from_path, serialize, CodecError};
pub use envelope::{Envelope, EnvelopeError};
pub use signature::HashAlgorithm;
pub use verifier::{VerificationResult, Verifier, VerifierOptions};
