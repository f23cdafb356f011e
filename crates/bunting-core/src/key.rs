// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier key validation and normalization.
//!
//! Every user-chosen key (flags, cohorts, tests, rollouts) shares the same
//! compiled form: lowercase letters and underscores, starting with a letter,
//! no trailing underscore, 2-64 characters. The human-authoring form may also
//! contain `/` to namespace keys; it is validated per segment and collapsed
//! into the compiled form by [`normalize_key`].

use crate::error::KeyError;

/// Minimum length for a compiled key.
pub const MIN_KEY_LENGTH: usize = 2;

/// Maximum length for a compiled key.
pub const MAX_KEY_LENGTH: usize = 64;

/// Validates a compiled key.
///
/// Valid keys:
/// - Lowercase letters and underscores only (`^[a-z][a-z_]*$`)
/// - No trailing underscore
/// - 2-64 characters
pub fn validate_key(key: &str) -> Result<(), KeyError> {
	if key.is_empty() {
		return Err(KeyError::Empty);
	}
	if key.len() < MIN_KEY_LENGTH {
		return Err(KeyError::TooShort);
	}
	if key.len() > MAX_KEY_LENGTH {
		return Err(KeyError::TooLong);
	}

	let mut chars = key.chars();

	// First character must be a lowercase letter, which also rules out a
	// leading underscore
	match chars.next() {
		Some(c) if c.is_ascii_lowercase() => {}
		_ => return Err(KeyError::InvalidStart),
	}

	for c in chars {
		if !c.is_ascii_lowercase() && c != '_' {
			return Err(KeyError::InvalidCharacter(c));
		}
	}

	if key.ends_with('_') {
		return Err(KeyError::TrailingUnderscore);
	}

	Ok(())
}

/// Validates a key in its human-authoring form.
///
/// The authoring form permits `/`-namespacing (e.g., `checkout/new_flow`);
/// each segment must itself be a valid compiled key.
pub fn validate_authoring_key(key: &str) -> Result<(), KeyError> {
	if key.is_empty() {
		return Err(KeyError::Empty);
	}

	for segment in key.split('/') {
		validate_key(segment)?;
	}

	Ok(())
}

/// Normalizes free-form input into the compiled key form.
///
/// Lowercases, replaces runs of non-letter characters with a single
/// underscore, trims underscores from both edges, and truncates to
/// [`MAX_KEY_LENGTH`]. The result may still fail [`validate_key`] (for
/// example, a one-letter input stays one letter), so callers validate after
/// normalizing rather than assuming success.
pub fn normalize_key(input: &str) -> String {
	let mut out = String::with_capacity(input.len().min(MAX_KEY_LENGTH));
	let mut pending_separator = false;

	for c in input.chars() {
		let c = c.to_ascii_lowercase();
		if c.is_ascii_lowercase() {
			// A separator is only emitted between letters, which trims the
			// edges and collapses repeats in one pass
			if pending_separator && !out.is_empty() {
				out.push('_');
			}
			out.push(c);
			pending_separator = false;
		} else {
			pending_separator = true;
		}
	}

	out.truncate(MAX_KEY_LENGTH);
	while out.ends_with('_') {
		out.pop();
	}
	out
}


#[cfg(test)]
mod proptest_tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// Keys matching the compiled grammar always validate.
		#[test]
		fn compiled_grammar_passes(key in "[a-z]([a-z_]{0,62}[a-z])?") {
			if key.len() >= MIN_KEY_LENGTH {
				prop_assert_eq!(validate_key(&key), Ok(()));
			}
		}

		/// Validation never panics on arbitrary input.
		#[test]
		fn validate_total(input in ".*") {
			let _ = validate_key(&input);
			let _ = validate_authoring_key(&input);
		}

		/// Normalized output is either empty or made of the compiled alphabet
		/// with no edge underscores.
		#[test]
		fn normalize_output_shape(input in ".*") {
			let normalized = normalize_key(&input);
			prop_assert!(normalized.len() <= MAX_KEY_LENGTH);
			prop_assert!(normalized.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
			prop_assert!(!normalized.starts_with('_'));
			prop_assert!(!normalized.ends_with('_'));
		}

		/// Normalization is idempotent.
		#[test]
		fn normalize_idempotent(input in ".*") {
			let once = normalize_key(&input);
			let twice = normalize_key(&once);
			prop_assert_eq!(once, twice);
		}

		/// Any normalized output of 2+ characters is a valid compiled key.
		#[test]
		fn normalized_keys_validate(input in ".*") {
			let normalized = normalize_key(&input);
			if normalized.len() >= MIN_KEY_LENGTH {
				prop_assert_eq!(validate_key(&normalized), Ok(()));
			}
		}
	}
}
