// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cohort::Cohort;
use crate::experiment::{Rollout, Test};
use crate::flag::Flag;

/// An application owning flags, cohorts, tests, and rollouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
	/// Globally unique reverse-domain identifier, e.g., "com.example.shop".
	pub identifier: String,
	pub name: String,
	#[serde(default)]
	pub fetch_policy: FetchPolicy,
}

impl App {
	/// Validates the reverse-domain identifier format.
	///
	/// Valid identifiers:
	/// - At least two `.`-separated segments
	/// - Each segment starts with a lowercase letter, then lowercase
	///   alphanumerics
	pub fn validate_identifier(identifier: &str) -> bool {
		let mut segments = 0usize;

		for segment in identifier.split('.') {
			segments += 1;

			let mut chars = segment.chars();
			match chars.next() {
				Some(c) if c.is_ascii_lowercase() => {}
				_ => return false,
			}
			if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
				return false;
			}
		}

		segments >= 2
	}
}

/// How often SDKs may refetch and how stale a cached artifact may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPolicy {
	pub min_fetch_interval_secs: u64,
	pub hard_ttl_secs: u64,
}

impl Default for FetchPolicy {
	fn default() -> Self {
		Self {
			min_fetch_interval_secs: 300,
			hard_ttl_secs: 86_400,
		}
	}
}

/// An immutable in-memory snapshot of one app's stored entities.
///
/// This is the compiler's whole input: the persistence layer assembles it,
/// and compilation never reaches back into storage. Maps are ordered by
/// entity key so identical snapshots compile to byte-identical artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
	pub app: App,
	#[serde(default)]
	pub flags: BTreeMap<String, Flag>,
	#[serde(default)]
	pub cohorts: BTreeMap<String, Cohort>,
	#[serde(default)]
	pub tests: BTreeMap<String, Test>,
	#[serde(default)]
	pub rollouts: BTreeMap<String, Rollout>,
}

impl AppSnapshot {
	pub fn new(app: App) -> Self {
		Self {
			app,
			flags: BTreeMap::new(),
			cohorts: BTreeMap::new(),
			tests: BTreeMap::new(),
			rollouts: BTreeMap::new(),
		}
	}

	pub fn with_flag(mut self, flag: Flag) -> Self {
		self.flags.insert(flag.key.clone(), flag);
		self
	}

	pub fn with_cohort(mut self, cohort: Cohort) -> Self {
		self.cohorts.insert(cohort.key.clone(), cohort);
		self
	}

	pub fn with_test(mut self, test: Test) -> Self {
		self.tests.insert(test.key.clone(), test);
		self
	}

	pub fn with_rollout(mut self, rollout: Rollout) -> Self {
		self.rollouts.insert(rollout.key.clone(), rollout);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flag::FlagEnvironment;

	#[test]
	fn test_validate_identifier_valid() {
		assert!(App::validate_identifier("com.example"));
		assert!(App::validate_identifier("com.example.shop"));
		assert!(App::validate_identifier("io.bunting.demo2"));
	}

	#[test]
	fn test_validate_identifier_invalid() {
		// Too few segments
		assert!(!App::validate_identifier("example"));
		assert!(!App::validate_identifier(""));

		// Empty or malformed segments
		assert!(!App::validate_identifier("com..example"));
		assert!(!App::validate_identifier(".com.example"));
		assert!(!App::validate_identifier("com.example."));

		// Case and characters
		assert!(!App::validate_identifier("Com.example"));
		assert!(!App::validate_identifier("com.2example"));
		assert!(!App::validate_identifier("com.ex-ample"));
	}

	#[test]
	fn test_fetch_policy_default() {
		let policy = FetchPolicy::default();
		assert_eq!(policy.min_fetch_interval_secs, 300);
		assert_eq!(policy.hard_ttl_secs, 86_400);
	}

	#[test]
	fn test_snapshot_builder_keys_by_entity_key() {
		let snapshot = AppSnapshot::new(App {
			identifier: "com.example.shop".to_string(),
			name: "Shop".to_string(),
			fetch_policy: FetchPolicy::default(),
		})
		.with_flag(Flag {
			key: "dark_mode".to_string(),
			flag_type: "bool".to_string(),
			description: String::new(),
			development: FlagEnvironment::default(),
			staging: FlagEnvironment::default(),
			production: FlagEnvironment::default(),
		});

		assert!(snapshot.flags.contains_key("dark_mode"));
		assert!(snapshot.cohorts.is_empty());
	}
}
