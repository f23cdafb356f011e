// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Artifact signing for Bunting config distribution.
//!
//! # Overview
//!
//! - RSA-2048 key pairs with random 128-bit ids, managed per app in a
//!   [`KeyRing`] that keeps at most one key active
//! - RS256 JWS envelopes over canonical config JSON, in embedded
//!   (`header.payload.signature`) and detached (`header..signature`) forms
//! - Fail-closed verification against exported public keys, active keys only
//!
//! # Example
//!
//! ```
//! use bunting_signing::{sign_detached, verify_detached, KeyRing};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ring = KeyRing::with_initial_key()?;
//! let config = r#"{"schema_version":2}"#;
//!
//! let envelope = sign_detached(config, ring.active()?)?;
//! let verified = verify_detached(config, &envelope, &ring.export_public_keys())?;
//! assert_eq!(verified.config_json, config);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod jws;
pub mod keys;

pub use error::{Result, SigningError, VerificationFailure};
pub use jws::{
	sign_artifact, sign_detached, verify_artifact, verify_detached, ArtifactClaims,
	VerificationResult, VerifiedArtifact, DEFAULT_MAX_AGE,
};
pub use keys::{KeyAlgorithm, KeyPair, KeyRing, PublicKeyExport, SigningKey, RSA_KEY_BITS};
