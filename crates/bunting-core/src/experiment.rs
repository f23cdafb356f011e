// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A/B tests and percentage rollouts.
//!
//! Both carry a salt that seeds bucket assignment. Once an artifact
//! referencing a test or rollout has been published, its salt is an immutable
//! contract: regenerating it reassigns every user, so that only happens
//! through an explicit [`Test::regenerate_salt`] / [`Rollout::regenerate_salt`]
//! call, never as a side effect of editing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::condition::Condition;
use crate::environment::Environment;

/// Generates an opaque random salt (UUIDv4 hex).
pub fn generate_salt() -> String {
	Uuid::new_v4().simple().to_string()
}

/// An A/B test with weighted variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
	pub key: String,
	pub name: String,
	pub salt: String,
	/// Audience gate: users must match all conditions before bucketing.
	#[serde(default)]
	pub conditions: Vec<Condition>,
	pub variants: Vec<TestVariant>,
}

impl Test {
	/// Replaces the salt, reassigning every user's variant.
	pub fn regenerate_salt(&mut self) {
		self.salt = generate_salt();
	}

	/// Sum of variant weights. May be under 100; the remainder is the
	/// unassigned share of users.
	pub fn total_percentage(&self) -> u32 {
		self.variants
			.iter()
			.map(|variant| u32::from(variant.percentage))
			.sum()
	}
}

/// One weighted arm of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVariant {
	pub name: String,
	pub percentage: u8,
	pub values: EnvValues,
}

/// A single-value percentage rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
	pub key: String,
	pub name: String,
	pub salt: String,
	/// Audience gate: users must match all conditions before bucketing.
	#[serde(default)]
	pub conditions: Vec<Condition>,
	pub percentage: u8,
	pub values: EnvValues,
}

impl Rollout {
	/// Replaces the salt, reassigning every user's bucket.
	pub fn regenerate_salt(&mut self) {
		self.salt = generate_salt();
	}
}

/// Per-environment values served by a test variant or rollout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvValues {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub development: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub staging: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub production: Option<serde_json::Value>,
}

impl EnvValues {
	/// Same value for all three environments.
	pub fn uniform(value: serde_json::Value) -> Self {
		Self {
			development: Some(value.clone()),
			staging: Some(value.clone()),
			production: Some(value),
		}
	}

	pub fn get(&self, environment: Environment) -> Option<&serde_json::Value> {
		match environment {
			Environment::Development => self.development.as_ref(),
			Environment::Staging => self.staging.as_ref(),
			Environment::Production => self.production.as_ref(),
		}
	}
}
