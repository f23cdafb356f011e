// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compiles an app snapshot into a config artifact.
//!
//! Compilation is deterministic: the same snapshot always produces the same
//! artifact, byte for byte once serialized, because sections are ordered
//! maps and variants are sorted by `order` with a stable sort. Version and
//! publish timestamp are stamped later by the publisher, so previews and
//! diffs never burn a version number.
//!
//! The compiler refuses to emit a structurally broken artifact: unknown flag
//! types, missing per-environment defaults, and malformed entity keys are
//! collected into one [`CompileError`] listing every defect found. Deeper
//! semantic checks (cohort references, type drift in foreign artifacts) are
//! the validator's job.

use thiserror::Error;
use tracing::debug;

use bunting_core::app::{App, AppSnapshot};
use bunting_core::artifact::{
	CompiledCohort, CompiledFlag, CompiledRollout, CompiledTest, ConfigArtifact, EnvConfig,
	ExperimentKind,
};
use bunting_core::environment::Environment;
use bunting_core::error::KeyError;
use bunting_core::flag::{Flag, FlagEnvironment, FlagType};
use bunting_core::key::validate_key;

/// One structural defect found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileDefect {
	#[error("flag '{flag}' declares unknown type '{found}'")]
	UnknownFlagType { flag: String, found: String },

	#[error("flag '{flag}' has no {environment} default")]
	MissingDefault { flag: String, environment: Environment },

	#[error("key '{key}' is invalid: {source}")]
	InvalidKey { key: String, source: KeyError },

	#[error("app identifier '{identifier}' is not a reverse-domain name")]
	InvalidAppIdentifier { identifier: String },
}

/// Compilation failure carrying every structural defect, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compilation found {} structural defect(s)", .defects.len())]
pub struct CompileError {
	pub defects: Vec<CompileDefect>,
}

/// Compiles a snapshot into an unversioned artifact.
pub fn compile(snapshot: &AppSnapshot) -> Result<ConfigArtifact, CompileError> {
	let mut defects = Vec::new();

	if !App::validate_identifier(&snapshot.app.identifier) {
		defects.push(CompileDefect::InvalidAppIdentifier {
			identifier: snapshot.app.identifier.clone(),
		});
	}

	let mut artifact = ConfigArtifact::new(snapshot.app.identifier.clone());

	for (key, cohort) in &snapshot.cohorts {
		check_key(key, &mut defects);
		artifact.cohorts.insert(
			key.clone(),
			CompiledCohort {
				name: cohort.name.clone(),
				description: cohort.description.clone(),
				conditions: cohort.conditions.clone(),
			},
		);
	}

	for (key, flag) in &snapshot.flags {
		check_key(key, &mut defects);
		artifact.flags.insert(key.clone(), compile_flag(key, flag, &mut defects));
	}

	for (key, test) in &snapshot.tests {
		check_key(key, &mut defects);
		artifact.tests.insert(
			key.clone(),
			CompiledTest {
				name: test.name.clone(),
				kind: ExperimentKind::Test,
				salt: test.salt.clone(),
				conditions: test.conditions.clone(),
				variants: test.variants.clone(),
			},
		);
	}

	for (key, rollout) in &snapshot.rollouts {
		check_key(key, &mut defects);
		artifact.rollouts.insert(
			key.clone(),
			CompiledRollout {
				name: rollout.name.clone(),
				kind: ExperimentKind::Rollout,
				salt: rollout.salt.clone(),
				conditions: rollout.conditions.clone(),
				percentage: rollout.percentage,
				values: rollout.values.clone(),
			},
		);
	}

	if !defects.is_empty() {
		return Err(CompileError { defects });
	}

	debug!(
		flags = artifact.flags.len(),
		cohorts = artifact.cohorts.len(),
		tests = artifact.tests.len(),
		rollouts = artifact.rollouts.len(),
		"compiled config artifact"
	);
	Ok(artifact)
}

fn compile_flag(key: &str, flag: &Flag, defects: &mut Vec<CompileDefect>) -> CompiledFlag {
	// The stored record carries the type as a plain string; only canonical
	// names compile.
	let flag_type = match flag.flag_type.parse::<FlagType>() {
		Ok(parsed) => parsed.as_str().to_string(),
		Err(_) => {
			defects.push(CompileDefect::UnknownFlagType {
				flag: key.to_string(),
				found: flag.flag_type.clone(),
			});
			flag.flag_type.clone()
		}
	};

	CompiledFlag {
		flag_type,
		description: flag.description.clone(),
		development: Some(compile_environment(
			key,
			Environment::Development,
			flag.environment(Environment::Development),
			defects,
		)),
		staging: Some(compile_environment(
			key,
			Environment::Staging,
			flag.environment(Environment::Staging),
			defects,
		)),
		production: Some(compile_environment(
			key,
			Environment::Production,
			flag.environment(Environment::Production),
			defects,
		)),
	}
}

fn compile_environment(
	flag_key: &str,
	environment: Environment,
	config: &FlagEnvironment,
	defects: &mut Vec<CompileDefect>,
) -> EnvConfig {
	let default = match &config.default {
		Some(value) => value.clone(),
		None => {
			defects.push(CompileDefect::MissingDefault {
				flag: flag_key.to_string(),
				environment,
			});
			serde_json::Value::Null
		}
	};

	// Stable sort keeps insertion order for equal orders.
	let mut variants = config.variants.clone();
	variants.sort_by_key(|variant| variant.order);

	EnvConfig { default, variants }
}

fn check_key(key: &str, defects: &mut Vec<CompileDefect>) {
	if let Err(source) = validate_key(key) {
		defects.push(CompileDefect::InvalidKey {
			key: key.to_string(),
			source,
		});
	}
}
