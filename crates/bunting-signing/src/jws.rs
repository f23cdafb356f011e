// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compact JWS envelopes over canonical config JSON.
//!
//! Two envelope forms are produced:
//!
//! - The embedded form is a standard `header.payload.signature` token whose
//!   claims carry the config string plus `iat`/`exp`.
//! - The detached form (`header..signature`) signs the config string
//!   directly. The SDK fetches config and signature side by side and never
//!   re-serializes the payload, so verification is byte-exact.
//!
//! Verification is fail-closed: only active keys are tried, a `kid` match
//! from the header is preferred, and no match means the artifact must not be
//! applied.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
	crypto, decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SigningError, VerificationFailure};
use crate::keys::{PublicKeyExport, SigningKey};

/// Default validity window for embedded envelopes.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Seconds of backdating applied to `iat` to absorb clock skew between the
/// signer and verifiers.
const IAT_SKEW_SECS: u64 = 60;

/// Claims carried by the embedded envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactClaims {
	/// Canonical config JSON, embedded as a string so the signed bytes are
	/// exactly the bytes the verifier hands back.
	pub config: String,
	pub iat: u64,
	pub exp: u64,
}

/// A successfully verified envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtifact {
	/// Kid of the key that verified the signature.
	pub kid: String,
	/// The canonical config JSON string the signature covers.
	pub config_json: String,
}

/// Result of a verification attempt.
pub type VerificationResult = Result<VerifiedArtifact, VerificationFailure>;

/// Signs canonical config JSON into an embedded JWS.
pub fn sign_artifact(
	config_json: &str,
	key: &SigningKey,
	max_age: Duration,
) -> Result<String, SigningError> {
	let now = unix_now()?;
	let claims = ArtifactClaims {
		config: config_json.to_string(),
		iat: now.saturating_sub(IAT_SKEW_SECS),
		exp: now + max_age.as_secs(),
	};

	let token = encode(&rs256_header(key), &claims, &encoding_key(key)?)
		.map_err(|e| SigningError::Signing(e.to_string()))?;

	debug!(kid = %key.kid, exp = claims.exp, "signed config artifact");
	Ok(token)
}

/// Signs canonical config JSON into a detached JWS (`header..signature`).
///
/// The signature covers `b64url(header).b64url(config)` with the payload
/// segment left empty, so the config travels next to the envelope instead of
/// inside it. Detached envelopes carry no expiry; staleness is bounded by
/// config version monotonicity and the app's fetch policy.
pub fn sign_detached(config_json: &str, key: &SigningKey) -> Result<String, SigningError> {
	let header_json =
		serde_json::to_vec(&rs256_header(key)).map_err(|e| SigningError::Signing(e.to_string()))?;
	let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
	let payload_b64 = URL_SAFE_NO_PAD.encode(config_json.as_bytes());

	let signing_input = format!("{}.{}", header_b64, payload_b64);
	let signature = crypto::sign(signing_input.as_bytes(), &encoding_key(key)?, Algorithm::RS256)
		.map_err(|e| SigningError::Signing(e.to_string()))?;

	debug!(kid = %key.kid, "signed detached config artifact");
	Ok(format!("{}..{}", header_b64, signature))
}

/// Verifies an embedded JWS against the candidate keys.
///
/// An expired envelope whose signature is otherwise valid is terminal and is
/// not retried against other keys.
pub fn verify_artifact(jws: &str, candidate_keys: &[PublicKeyExport]) -> VerificationResult {
	let header =
		decode_header(jws).map_err(|e| VerificationFailure::MalformedEnvelope(e.to_string()))?;
	if header.alg != Algorithm::RS256 {
		return Err(VerificationFailure::UnsupportedAlgorithm(format!("{:?}", header.alg)));
	}

	let validation = Validation::new(Algorithm::RS256);

	for key in candidates(candidate_keys, header.kid.as_deref()) {
		let decoding_key = match DecodingKey::from_rsa_pem(key.pem.as_bytes()) {
			Ok(decoding_key) => decoding_key,
			Err(_) => continue,
		};
		match decode::<ArtifactClaims>(jws, &decoding_key, &validation) {
			Ok(data) => {
				return Ok(VerifiedArtifact {
					kid: key.kid.clone(),
					config_json: data.claims.config,
				});
			}
			Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
				return Err(VerificationFailure::Expired);
			}
			Err(_) => continue,
		}
	}

	warn!("config artifact signature did not match any active key");
	Err(VerificationFailure::NoMatchingKey)
}

/// Verifies a detached JWS over the given config JSON.
pub fn verify_detached(
	config_json: &str,
	jws: &str,
	candidate_keys: &[PublicKeyExport],
) -> VerificationResult {
	let (header_b64, signature) = split_detached(jws)?;

	let header_bytes = URL_SAFE_NO_PAD
		.decode(header_b64)
		.map_err(|e| VerificationFailure::MalformedEnvelope(e.to_string()))?;
	let header: Header = serde_json::from_slice(&header_bytes)
		.map_err(|e| VerificationFailure::MalformedEnvelope(e.to_string()))?;
	if header.alg != Algorithm::RS256 {
		return Err(VerificationFailure::UnsupportedAlgorithm(format!("{:?}", header.alg)));
	}

	let payload_b64 = URL_SAFE_NO_PAD.encode(config_json.as_bytes());
	let signing_input = format!("{}.{}", header_b64, payload_b64);

	for key in candidates(candidate_keys, header.kid.as_deref()) {
		let decoding_key = match DecodingKey::from_rsa_pem(key.pem.as_bytes()) {
			Ok(decoding_key) => decoding_key,
			Err(_) => continue,
		};
		match crypto::verify(signature, signing_input.as_bytes(), &decoding_key, Algorithm::RS256) {
			Ok(true) => {
				return Ok(VerifiedArtifact {
					kid: key.kid.clone(),
					config_json: config_json.to_string(),
				});
			}
			Ok(false) | Err(_) => continue,
		}
	}

	warn!("detached config signature did not match any active key");
	Err(VerificationFailure::NoMatchingKey)
}

/// Splits `header..signature`, rejecting envelopes that still carry an
/// embedded payload.
fn split_detached(jws: &str) -> Result<(&str, &str), VerificationFailure> {
	let parts: Vec<&str> = jws.split('.').collect();
	if parts.len() != 3 {
		return Err(VerificationFailure::MalformedEnvelope(
			"expected three dot-separated segments".to_string(),
		));
	}
	if !parts[1].is_empty() {
		return Err(VerificationFailure::MalformedEnvelope(
			"detached envelope must leave the payload segment empty".to_string(),
		));
	}
	Ok((parts[0], parts[2]))
}

/// Active candidate keys, with a header `kid` match tried first.
fn candidates<'a>(keys: &'a [PublicKeyExport], kid: Option<&str>) -> Vec<&'a PublicKeyExport> {
	let mut active: Vec<&PublicKeyExport> = keys.iter().filter(|key| key.is_active).collect();
	if let Some(kid) = kid {
		active.sort_by_key(|key| key.kid != kid);
	}
	active
}

fn rs256_header(key: &SigningKey) -> Header {
	let mut header = Header::new(Algorithm::RS256);
	header.kid = Some(key.kid.clone());
	header
}

fn encoding_key(key: &SigningKey) -> Result<EncodingKey, SigningError> {
	EncodingKey::from_rsa_pem(key.private_key_pem.as_bytes()).map_err(|e| {
		SigningError::InvalidKeyMaterial {
			kid: key.kid.clone(),
			message: e.to_string(),
		}
	})
}

fn unix_now() -> Result<u64, SigningError> {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.map_err(|e| SigningError::Signing(format!("system clock error: {e}")))
}
