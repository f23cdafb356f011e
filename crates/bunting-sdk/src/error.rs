// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for evaluation and the artifact store.

use thiserror::Error;

use bunting_core::environment::Environment;
use bunting_core::version::ConfigVersion;
use bunting_signing::VerificationFailure;

/// Failures looking up a flag for evaluation.
///
/// These are caller or artifact defects, not user-targeting misses; a flag
/// that simply matches no variant still evaluates to its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
	#[error("unknown flag '{0}'")]
	UnknownFlag(String),

	#[error("flag '{flag}' has no {environment} configuration")]
	EnvironmentNotConfigured { flag: String, environment: Environment },
}

/// Failures applying a fetched artifact to the store.
///
/// Any failure leaves the store's last-known-good artifact in place.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error(transparent)]
	Verification(#[from] VerificationFailure),

	#[error("artifact failed to parse: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("artifact carries no config version")]
	Unversioned,

	#[error("artifact version {offered} is older than current {current}")]
	Stale {
		current: ConfigVersion,
		offered: ConfigVersion,
	},
}
