//! Deterministic verification of Sigstore build attestations
//!
//! Verifies a Sigstore bundle (v0.3+) carrying SLSA provenance in a DSSE
//! envelope: the Fulcio certificate chain, the envelope signature, exactly
//! one timestamp proof (RFC 3161 countersignature or Rekor inclusion), and
//! the OIDC identity bound into the certificate. The result serializes to a
//! canonical journal that on-chain code can decode directly.
//!
//! The whole pipeline is a pure function of its inputs: no clock, no
//! network, no global state. It runs unmodified inside a zkVM guest, where
//! any non-determinism would break proof reproducibility.
//!
//! ```no_run
//! use zkattest_trust_root::TrustedRoot;
//! use zkattest_verify::{verify, VerificationOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bundle_json = std::fs::read("attestation.sigstore.json")?;
//! let trusted_root = TrustedRoot::from_jsonl(&std::fs::read_to_string("trusted_root.jsonl")?)?;
//!
//! let result = verify(&bundle_json, &trusted_root, &VerificationOptions::default())?;
//! let journal = result.to_journal();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod journal;
pub mod result;
pub mod verify;
pub(crate) mod verify_impl;

pub use error::{Error, Result};
pub use result::{DigestAlgorithm, OidcIdentity, TimestampProofType, VerificationResult};
pub use verify::{verify, VerificationOptions};
pub use zkattest_trust_root::FulcioInstance;
