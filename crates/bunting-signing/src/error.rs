// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for key management and artifact signing.

use thiserror::Error;

/// Errors raised while generating keys or producing signatures.
#[derive(Debug, Error)]
pub enum SigningError {
	#[error("key generation failed: {0}")]
	KeyGeneration(String),

	#[error("key '{kid}' holds unusable key material: {message}")]
	InvalidKeyMaterial { kid: String, message: String },

	#[error("a key with id '{0}' is already installed")]
	DuplicateKeyId(String),

	#[error("no key with id '{0}' is installed")]
	UnknownKeyId(String),

	#[error("no active signing key")]
	NoActiveKey,

	#[error("{0} keys are active, expected exactly one")]
	MultipleActiveKeys(usize),

	#[error("signing failed: {0}")]
	Signing(String),
}

/// Reasons an envelope failed verification.
///
/// Verification is fail-closed, so every variant means the artifact must not
/// be applied. `Expired` is terminal: the signature was genuine but the
/// envelope is past its validity window, and retrying other keys would be
/// pointless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
	#[error("envelope is malformed: {0}")]
	MalformedEnvelope(String),

	#[error("envelope uses unsupported algorithm {0}")]
	UnsupportedAlgorithm(String),

	#[error("envelope is past its validity window")]
	Expired,

	#[error("signature did not verify against any active key")]
	NoMatchingKey,
}

/// Convenience alias for signing-side results.
pub type Result<T> = std::result::Result<T, SigningError>;
