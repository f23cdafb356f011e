// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deterministic hash-based bucket assignment.
//!
//! Every percentage decision (rollouts, test variants) reduces to placing a
//! user into one of 100 buckets. The placement must be identical across
//! processes, machines, and SDK implementations in other languages, so the
//! algorithm is fixed: SHA-256 over `salt:local_id`, first 4 digest bytes as
//! a big-endian u32, modulo 100, plus 1. Changing a salt reassigns every
//! user, which is why salts are immutable once an artifact referencing them
//! has been published.

use sha2::{Digest, Sha256};

/// Number of buckets users are distributed across.
pub const BUCKET_COUNT: u32 = 100;

/// Assigns a stable bucket in `[1, 100]` for a `(salt, local_id)` pair.
pub fn bucket_for(salt: &str, local_id: &str) -> u8 {
	let mut hasher = Sha256::new();
	hasher.update(salt.as_bytes());
	hasher.update(b":");
	hasher.update(local_id.as_bytes());
	let digest = hasher.finalize();

	let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
	(head % BUCKET_COUNT) as u8 + 1
}

/// Whether a user falls inside a percentage rollout.
///
/// `0` never matches and `100` (or anything above) always matches, without
/// consulting the hash.
pub fn is_in_rollout(salt: &str, local_id: &str, percentage: u8) -> bool {
	if percentage == 0 {
		return false;
	}
	if percentage >= 100 {
		return true;
	}
	bucket_for(salt, local_id) <= percentage
}

/// Assigns a user to one of a test's weighted variants.
///
/// Variants are walked in declared order, accumulating percentages; the user
/// lands in the first variant whose cumulative range covers their bucket.
/// Returns `None` when the bucket exceeds the total accumulated percentage
/// (weights summing under 100 leave a deliberately unassigned remainder, and
/// those users see the flag's environment default instead).
pub fn assign_variant<'a, I>(salt: &str, local_id: &str, variants: I) -> Option<&'a str>
where
	I: IntoIterator<Item = (&'a str, u8)>,
{
	let bucket = u32::from(bucket_for(salt, local_id));
	let mut cumulative = 0u32;

	for (name, percentage) in variants {
		cumulative += u32::from(percentage);
		if bucket <= cumulative {
			return Some(name);
		}
	}

	None
}
