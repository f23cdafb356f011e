// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Verified artifact cache with last-known-good semantics.
//!
//! The store only ever swaps in an artifact that passed signature
//! verification and is at least as new as what it already holds. Every
//! rejected apply leaves the current artifact untouched: a bad delivery
//! channel can cost freshness, never content.

use tracing::{debug, warn};

use bunting_core::artifact::ConfigArtifact;
use bunting_core::version::ConfigVersion;
use bunting_signing::{verify_detached, PublicKeyExport};

use crate::error::StoreError;

/// A verified artifact the store currently serves.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
	pub artifact: ConfigArtifact,
	pub version: ConfigVersion,
	/// Kid of the key that verified the artifact's signature.
	pub kid: String,
	/// The exact string the signature covered.
	pub config_json: String,
}

/// Outcome of a successful [`ArtifactStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
	/// The artifact verified and replaced the current one.
	Applied(ConfigVersion),
	/// The offered version is the one already held; nothing changed.
	AlreadyCurrent(ConfigVersion),
}

/// Holds the SDK's current (last-known-good) artifact.
#[derive(Debug, Default)]
pub struct ArtifactStore {
	current: Option<StoredArtifact>,
}

impl ArtifactStore {
	pub fn new() -> Self {
		Self { current: None }
	}

	pub fn current(&self) -> Option<&StoredArtifact> {
		self.current.as_ref()
	}

	pub fn artifact(&self) -> Option<&ConfigArtifact> {
		self.current.as_ref().map(|stored| &stored.artifact)
	}

	pub fn version(&self) -> Option<ConfigVersion> {
		self.current.as_ref().map(|stored| stored.version)
	}

	/// Verifies a fetched config against the candidate keys and swaps it in.
	///
	/// Version monotonicity is enforced against the held artifact: an older
	/// version is rejected as [`StoreError::Stale`], re-applying the current
	/// version is an idempotent no-op.
	pub fn apply(
		&mut self,
		config_json: &str,
		detached_jws: &str,
		candidate_keys: &[PublicKeyExport],
	) -> Result<ApplyOutcome, StoreError> {
		let verified = match verify_detached(config_json, detached_jws, candidate_keys) {
			Ok(verified) => verified,
			Err(failure) => {
				warn!(error = %failure, "rejecting artifact, keeping last known good");
				return Err(StoreError::Verification(failure));
			}
		};

		let artifact: ConfigArtifact = serde_json::from_str(&verified.config_json)?;
		let version = match artifact.config_version {
			Some(version) => version,
			None => return Err(StoreError::Unversioned),
		};

		if let Some(current) = &self.current {
			if version < current.version {
				warn!(
					current = %current.version,
					offered = %version,
					"rejecting stale artifact"
				);
				return Err(StoreError::Stale {
					current: current.version,
					offered: version,
				});
			}
			if version == current.version {
				return Ok(ApplyOutcome::AlreadyCurrent(version));
			}
		}

		debug!(version = %version, kid = %verified.kid, "applied config artifact");
		self.current = Some(StoredArtifact {
			artifact,
			version,
			kid: verified.kid,
			config_json: verified.config_json,
		});
		Ok(ApplyOutcome::Applied(version))
	}
}
