// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the publish pipeline.

use thiserror::Error;

use bunting_signing::SigningError;

use crate::compiler::CompileError;
use crate::validator::ValidationError;

/// Failures that abort a publish.
///
/// Validation errors are carried whole so the caller can surface every
/// defect at once instead of the first one hit.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error(transparent)]
	Compile(#[from] CompileError),

	#[error("validation failed with {} error(s)", .errors.len())]
	ValidationFailed { errors: Vec<ValidationError> },

	#[error(transparent)]
	Signing(#[from] SigningError),

	#[error("artifact serialization failed: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Convenience alias for publish-pipeline results.
pub type Result<T> = std::result::Result<T, ServerError>;
