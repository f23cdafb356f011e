// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Semantic validation of compiled artifacts.
//!
//! The validator never panics and never returns early: it walks the whole
//! artifact and returns every error and warning it found, so an authoring UI
//! can show all problems at once. Errors block publishing; warnings are
//! surfaced but never block.
//!
//! It deliberately overlaps with the compiler's structural checks. The
//! compiler guards artifacts built from this codebase's own records; the
//! validator is the single source of truth for artifacts wherever they came
//! from, which is why it re-checks flag types that the compiler would have
//! already refused (the `"boolean"` drift class of bug).

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use bunting_core::artifact::{CompiledFlag, ConfigArtifact};
use bunting_core::condition::Condition;
use bunting_core::environment::Environment;
use bunting_core::flag::{FlagType, VariantKind};

/// A validation finding that blocks publishing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
	#[error("missing_default: flag '{flag}' has no {environment} default")]
	MissingDefault { flag: String, environment: Environment },

	#[error("invalid_type: flag '{flag}' declares unknown type '{found}'")]
	InvalidType { flag: String, found: String },

	#[error("invalid_json: flag '{flag}' {environment} default does not parse as JSON")]
	InvalidJson { flag: String, environment: Environment },

	#[error("missing_cohort_reference: '{owner}' references unknown cohort '{cohort}'")]
	MissingCohortReference { owner: String, cohort: String },

	#[error("circular_cohort_reference: cohort '{cohort}' references another cohort")]
	CircularCohortReference { cohort: String },
}

impl ValidationError {
	/// Stable machine-readable rule name.
	pub fn code(&self) -> &'static str {
		match self {
			ValidationError::MissingDefault { .. } => "missing_default",
			ValidationError::InvalidType { .. } => "invalid_type",
			ValidationError::InvalidJson { .. } => "invalid_json",
			ValidationError::MissingCohortReference { .. } => "missing_cohort_reference",
			ValidationError::CircularCohortReference { .. } => "circular_cohort_reference",
		}
	}
}

/// A non-blocking validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationWarning {
	#[error("empty_variant: flag '{flag}' {environment} variant at order {order} has no conditions")]
	EmptyVariant {
		flag: String,
		environment: Environment,
		order: u32,
	},

	#[error("empty_cohort: cohort '{cohort}' has no conditions")]
	EmptyCohort { cohort: String },
}

impl ValidationWarning {
	/// Stable machine-readable rule name.
	pub fn code(&self) -> &'static str {
		match self {
			ValidationWarning::EmptyVariant { .. } => "empty_variant",
			ValidationWarning::EmptyCohort { .. } => "empty_cohort",
		}
	}
}

/// Everything the validator found, errors and warnings both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
	pub errors: Vec<ValidationError>,
	pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
	/// Publishing is gated strictly on the error list being empty.
	pub fn is_publishable(&self) -> bool {
		self.errors.is_empty()
	}
}

/// Validates a compiled artifact.
pub fn validate(artifact: &ConfigArtifact) -> ValidationReport {
	let mut report = ValidationReport::default();

	for (key, cohort) in &artifact.cohorts {
		if cohort.conditions.is_empty() {
			report.warnings.push(ValidationWarning::EmptyCohort { cohort: key.clone() });
		}
		// Cohorts may not reference cohorts; this keeps membership
		// resolution a single hop and makes cycles impossible.
		for condition in &cohort.conditions {
			if condition.cohort_keys().is_some() {
				report
					.errors
					.push(ValidationError::CircularCohortReference { cohort: key.clone() });
			}
		}
	}

	for (key, flag) in &artifact.flags {
		check_flag_type(key, flag, &mut report);
		for environment in Environment::ALL {
			check_environment(key, flag, environment, artifact, &mut report);
		}
	}

	// Test and rollout audience conditions ride the same condition union, so
	// their cohort references get the same treatment as flag variants.
	for (key, test) in &artifact.tests {
		check_cohort_references(key, &test.conditions, artifact, &mut report);
	}
	for (key, rollout) in &artifact.rollouts {
		check_cohort_references(key, &rollout.conditions, artifact, &mut report);
	}

	if !report.warnings.is_empty() {
		warn!(
			warnings = report.warnings.len(),
			app = %artifact.app_identifier,
			"config validation produced warnings"
		);
	}
	report
}

fn check_flag_type(key: &str, flag: &CompiledFlag, report: &mut ValidationReport) {
	if flag.flag_type.parse::<FlagType>().is_err() {
		report.errors.push(ValidationError::InvalidType {
			flag: key.to_string(),
			found: flag.flag_type.clone(),
		});
	}
}

fn check_environment(
	key: &str,
	flag: &CompiledFlag,
	environment: Environment,
	artifact: &ConfigArtifact,
	report: &mut ValidationReport,
) {
	let config = match flag.environment(environment) {
		Some(config) => config,
		None => {
			report.errors.push(ValidationError::MissingDefault {
				flag: key.to_string(),
				environment,
			});
			return;
		}
	};

	// `null` is no default; the author has to pick a value.
	if config.default.is_null() {
		report.errors.push(ValidationError::MissingDefault {
			flag: key.to_string(),
			environment,
		});
	} else if flag.flag_type == FlagType::Json.as_str() {
		if let serde_json::Value::String(raw) = &config.default {
			if serde_json::from_str::<serde_json::Value>(raw).is_err() {
				report.errors.push(ValidationError::InvalidJson {
					flag: key.to_string(),
					environment,
				});
			}
		}
	}

	for variant in &config.variants {
		if let VariantKind::Conditional { conditions, .. } = &variant.kind {
			if conditions.is_empty() {
				report.warnings.push(ValidationWarning::EmptyVariant {
					flag: key.to_string(),
					environment,
					order: variant.order,
				});
			}
			check_cohort_references(key, conditions, artifact, report);
		}
	}
}

fn check_cohort_references(
	owner: &str,
	conditions: &[Condition],
	artifact: &ConfigArtifact,
	report: &mut ValidationReport,
) {
	for condition in conditions {
		if let Some(keys) = condition.cohort_keys() {
			for cohort in keys {
				if !artifact.cohorts.contains_key(cohort) {
					report.errors.push(ValidationError::MissingCohortReference {
						owner: owner.to_string(),
						cohort: cohort.clone(),
					});
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bunting_core::artifact::{
		CompiledCohort, CompiledRollout, CompiledTest, EnvConfig, ExperimentKind,
	};
	use bunting_core::condition::MembershipOperator;
	use bunting_core::experiment::EnvValues;
	use bunting_core::flag::Variant;
	use serde_json::json;

	fn env(default: serde_json::Value) -> Option<EnvConfig> {
		Some(EnvConfig {
			default,
			variants: vec![],
		})
	}

	fn bool_flag() -> CompiledFlag {
		CompiledFlag {
			flag_type: "bool".to_string(),
			description: String::new(),
			development: env(json!(true)),
			staging: env(json!(false)),
			production: env(json!(false)),
		}
	}

	fn cohort_condition(keys: &[&str]) -> Condition {
		Condition::Cohort {
			id: "c1".to_string(),
			operator: MembershipOperator::In,
			values: keys.iter().map(|k| k.to_string()).collect(),
		}
	}

	fn region_condition() -> Condition {
		Condition::Region {
			id: "c2".to_string(),
			operator: MembershipOperator::In,
			values: vec!["EU".to_string()],
		}
	}

	#[test]
	fn test_valid_artifact_passes() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		artifact.flags.insert("dark_mode".to_string(), bool_flag());

		let report = validate(&artifact);
		assert!(report.is_publishable());
		assert!(report.errors.is_empty());
		assert!(report.warnings.is_empty());
	}

	#[test]
	fn test_boolean_type_drift_is_exactly_one_error() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.flag_type = "boolean".to_string();
		artifact.flags.insert("f".to_string(), flag);

		let report = validate(&artifact);
		assert_eq!(
			report.errors,
			vec![ValidationError::InvalidType {
				flag: "f".to_string(),
				found: "boolean".to_string(),
			}]
		);
		assert_eq!(report.errors[0].code(), "invalid_type");
		assert!(!report.is_publishable());
	}

	#[test]
	fn test_missing_environment_is_missing_default() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.staging = None;
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		assert_eq!(
			report.errors,
			vec![ValidationError::MissingDefault {
				flag: "dark_mode".to_string(),
				environment: Environment::Staging,
			}]
		);
	}

	#[test]
	fn test_null_default_is_missing_default() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.production = env(serde_json::Value::Null);
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		assert_eq!(report.errors.len(), 1);
		assert_eq!(report.errors[0].code(), "missing_default");
	}

	#[test]
	fn test_json_string_default_must_parse() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.flag_type = "json".to_string();
		flag.development = env(json!(r#"{"items": [1, 2]}"#));
		flag.staging = env(json!("{not json"));
		flag.production = env(json!({"inline": "object"}));
		artifact.flags.insert("payload".to_string(), flag);

		let report = validate(&artifact);
		assert_eq!(
			report.errors,
			vec![ValidationError::InvalidJson {
				flag: "payload".to_string(),
				environment: Environment::Staging,
			}]
		);
	}

	#[test]
	fn test_missing_cohort_reference_in_flag_variant() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.production = Some(EnvConfig {
			default: json!(false),
			variants: vec![Variant {
				order: 1,
				kind: VariantKind::Conditional {
					conditions: vec![cohort_condition(&["beta_testers"])],
					value: json!(true),
				},
			}],
		});
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		assert_eq!(
			report.errors,
			vec![ValidationError::MissingCohortReference {
				owner: "dark_mode".to_string(),
				cohort: "beta_testers".to_string(),
			}]
		);
	}

	#[test]
	fn test_cohort_references_resolve_when_cohort_exists() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		artifact.cohorts.insert(
			"beta_testers".to_string(),
			CompiledCohort {
				name: "Beta testers".to_string(),
				description: String::new(),
				conditions: vec![region_condition()],
			},
		);
		let mut flag = bool_flag();
		flag.production = Some(EnvConfig {
			default: json!(false),
			variants: vec![Variant {
				order: 1,
				kind: VariantKind::Conditional {
					conditions: vec![cohort_condition(&["beta_testers"])],
					value: json!(true),
				},
			}],
		});
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		assert!(report.is_publishable());
	}

	#[test]
	fn test_missing_cohort_reference_in_test_and_rollout() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		artifact.tests.insert(
			"checkout_test".to_string(),
			CompiledTest {
				name: "Checkout".to_string(),
				kind: ExperimentKind::Test,
				salt: "s1".to_string(),
				conditions: vec![cohort_condition(&["gone"])],
				variants: vec![],
			},
		);
		artifact.rollouts.insert(
			"gradual".to_string(),
			CompiledRollout {
				name: "Gradual".to_string(),
				kind: ExperimentKind::Rollout,
				salt: "s2".to_string(),
				conditions: vec![cohort_condition(&["also_gone"])],
				percentage: 10,
				values: EnvValues::uniform(json!(true)),
			},
		);

		let report = validate(&artifact);
		assert_eq!(report.errors.len(), 2);
		assert!(report.errors.iter().all(|e| e.code() == "missing_cohort_reference"));
	}

	#[test]
	fn test_cohort_referencing_cohort_is_circular() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		artifact.cohorts.insert(
			"outer".to_string(),
			CompiledCohort {
				name: "Outer".to_string(),
				description: String::new(),
				conditions: vec![cohort_condition(&["inner"])],
			},
		);
		artifact.cohorts.insert(
			"inner".to_string(),
			CompiledCohort {
				name: "Inner".to_string(),
				description: String::new(),
				conditions: vec![region_condition()],
			},
		);

		let report = validate(&artifact);
		assert_eq!(
			report.errors,
			vec![ValidationError::CircularCohortReference {
				cohort: "outer".to_string(),
			}]
		);
	}

	#[test]
	fn test_empty_variant_and_cohort_warn_without_blocking() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		artifact.cohorts.insert(
			"everyone".to_string(),
			CompiledCohort {
				name: "Everyone".to_string(),
				description: String::new(),
				conditions: vec![],
			},
		);
		let mut flag = bool_flag();
		flag.production = Some(EnvConfig {
			default: json!(false),
			variants: vec![Variant {
				order: 1,
				kind: VariantKind::Conditional {
					conditions: vec![],
					value: json!(true),
				},
			}],
		});
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		assert!(report.is_publishable());
		assert_eq!(report.warnings.len(), 2);
		assert!(report.warnings.iter().any(|w| w.code() == "empty_cohort"));
		assert!(report.warnings.iter().any(|w| matches!(
			w,
			ValidationWarning::EmptyVariant { flag, order: 1, .. } if flag == "dark_mode"
		)));
	}

	#[test]
	fn test_report_collects_errors_and_warnings_together() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut drifted = bool_flag();
		drifted.flag_type = "boolean".to_string();
		artifact.flags.insert("f".to_string(), drifted);
		artifact.cohorts.insert(
			"everyone".to_string(),
			CompiledCohort {
				name: "Everyone".to_string(),
				description: String::new(),
				conditions: vec![],
			},
		);

		let report = validate(&artifact);
		assert_eq!(report.errors.len(), 1);
		assert_eq!(report.warnings.len(), 1);
		assert!(!report.is_publishable());
	}

	#[test]
	fn test_report_serializes_with_codes() {
		let mut artifact = ConfigArtifact::new("com.example.shop");
		let mut flag = bool_flag();
		flag.staging = None;
		artifact.flags.insert("dark_mode".to_string(), flag);

		let report = validate(&artifact);
		let value = serde_json::to_value(&report).unwrap();
		assert_eq!(value["errors"][0]["code"], "missing_default");
		assert_eq!(value["errors"][0]["flag"], "dark_mode");
		assert_eq!(value["errors"][0]["environment"], "staging");
	}
}
