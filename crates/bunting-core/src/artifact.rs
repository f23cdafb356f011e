// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The compiled, versioned artifact that SDKs fetch.
//!
//! An artifact is immutable once signed. The compiler produces it without
//! `config_version`/`published_at`; the publisher stamps those when a version
//! is committed, so previews and diffs can be computed without burning a
//! version number. Sections are `BTreeMap`s and every struct serializes in
//! declaration order, which is what makes compilation byte-stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::environment::Environment;
use crate::experiment::{EnvValues, TestVariant};
use crate::flag::Variant;
use crate::version::ConfigVersion;

/// Version of the artifact wire schema.
pub const SCHEMA_VERSION: u32 = 2;

/// A compiled configuration artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigArtifact {
	pub schema_version: u32,
	/// Set by the publisher, absent on previews.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config_version: Option<ConfigVersion>,
	/// Set by the publisher, absent on previews.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub published_at: Option<DateTime<Utc>>,
	pub app_identifier: String,
	pub cohorts: BTreeMap<String, CompiledCohort>,
	pub flags: BTreeMap<String, CompiledFlag>,
	pub tests: BTreeMap<String, CompiledTest>,
	pub rollouts: BTreeMap<String, CompiledRollout>,
}

impl ConfigArtifact {
	/// An empty artifact shell for the given app.
	pub fn new(app_identifier: impl Into<String>) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			config_version: None,
			published_at: None,
			app_identifier: app_identifier.into(),
			cohorts: BTreeMap::new(),
			flags: BTreeMap::new(),
			tests: BTreeMap::new(),
			rollouts: BTreeMap::new(),
		}
	}

	/// Whether a version has been stamped onto this artifact.
	pub fn is_published(&self) -> bool {
		self.config_version.is_some()
	}

	/// The canonical JSON form, which is what gets signed and verified.
	///
	/// Signatures cover this exact string; consumers must verify the string
	/// they received, not a re-serialization of the parsed value.
	pub fn canonical_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}

/// A compiled cohort, environment-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCohort {
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub conditions: Vec<Condition>,
}

/// A compiled flag with its three environment configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFlag {
	/// Declared type, kept as the raw wire string. The compiler only emits
	/// canonical [`FlagType`](crate::flag::FlagType) names, but artifacts
	/// produced elsewhere can drift, and the validator has to see the drift
	/// rather than have deserialization reject it.
	#[serde(rename = "type")]
	pub flag_type: String,
	#[serde(default)]
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub development: Option<EnvConfig>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub staging: Option<EnvConfig>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub production: Option<EnvConfig>,
}

impl CompiledFlag {
	/// Environment configuration, when the artifact carries one.
	///
	/// The compiler always emits all three; `None` only occurs in
	/// hand-crafted or truncated artifacts, which evaluators treat as an
	/// error rather than guessing.
	pub fn environment(&self, environment: Environment) -> Option<&EnvConfig> {
		match environment {
			Environment::Development => self.development.as_ref(),
			Environment::Staging => self.staging.as_ref(),
			Environment::Production => self.production.as_ref(),
		}
	}
}

/// One environment's compiled configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
	pub default: serde_json::Value,
	pub variants: Vec<Variant>,
}

/// Experiment kind discriminator carried on the wire.
///
/// Tests and rollouts live in separate artifact sections, so this is
/// redundant for parsing; it stays because SDKs in other languages key off
/// it when flattening sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
	Test,
	Rollout,
}

/// A compiled A/B test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTest {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ExperimentKind,
	pub salt: String,
	pub conditions: Vec<Condition>,
	pub variants: Vec<TestVariant>,
}

/// A compiled rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRollout {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ExperimentKind,
	pub salt: String,
	pub conditions: Vec<Condition>,
	pub percentage: u8,
	pub values: EnvValues,
}
