// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors produced by identifier key validation.
///
/// Messages are written to be shown inline next to a form field, so they name
/// the broken rule rather than the internal check that caught it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
	#[error("key must not be empty")]
	Empty,

	#[error("key must be at least 2 characters")]
	TooShort,

	#[error("key must be at most 64 characters")]
	TooLong,

	#[error("key must start with a lowercase letter")]
	InvalidStart,

	#[error("key contains invalid character '{0}', only lowercase letters and underscores are allowed")]
	InvalidCharacter(char),

	#[error("key must not end with an underscore")]
	TrailingUnderscore,
}
