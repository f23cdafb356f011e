// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side flag evaluation.
//!
//! Evaluation never trusts the artifact it was handed: variants are
//! re-sorted, dangling test/rollout/cohort references fall through instead
//! of matching, and a flag that matches nothing lands on its environment
//! default. The only errors are caller/artifact defects (unknown flag,
//! missing environment section); a targeting miss is not an error.

use std::collections::BTreeMap;

use tracing::warn;

use bunting_core::artifact::ConfigArtifact;
use bunting_core::bucketing::{assign_variant, is_in_rollout};
use bunting_core::condition::{Condition, MembershipOperator};
use bunting_core::environment::Environment;
use bunting_core::flag::{Variant, VariantKind};

use crate::context::{CustomAttributeResolver, UserContext};
use crate::error::EvaluationError;

/// Why an evaluation produced its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationReason {
	Conditional,
	Test,
	Rollout,
	Default,
}

/// The resolved value of one flag for one context.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Evaluation {
	pub value: serde_json::Value,
	pub reason: EvaluationReason,
}

impl Evaluation {
	pub fn as_bool(&self) -> Option<bool> {
		self.value.as_bool()
	}

	pub fn as_str(&self) -> Option<&str> {
		self.value.as_str()
	}

	pub fn as_i64(&self) -> Option<i64> {
		self.value.as_i64()
	}

	pub fn as_f64(&self) -> Option<f64> {
		self.value.as_f64()
	}
}

/// Resolves one flag's effective value.
///
/// Variants are walked in `order`, first match wins; no match means the
/// environment default with reason [`EvaluationReason::Default`].
pub fn evaluate_flag(
	artifact: &ConfigArtifact,
	flag_key: &str,
	environment: Environment,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> Result<Evaluation, EvaluationError> {
	let flag = artifact
		.flags
		.get(flag_key)
		.ok_or_else(|| EvaluationError::UnknownFlag(flag_key.to_string()))?;
	let config = flag.environment(environment).ok_or_else(|| {
		EvaluationError::EnvironmentNotConfigured {
			flag: flag_key.to_string(),
			environment,
		}
	})?;

	// The compiler emits variants sorted, but the artifact may not have come
	// from this compiler. The sort is stable, so equal orders keep artifact
	// order.
	let mut variants: Vec<&Variant> = config.variants.iter().collect();
	variants.sort_by_key(|variant| variant.order);

	for variant in variants {
		match &variant.kind {
			VariantKind::Conditional { conditions, value } => {
				if all_match(conditions, artifact, context, resolver) {
					return Ok(Evaluation {
						value: value.clone(),
						reason: EvaluationReason::Conditional,
					});
				}
			}
			VariantKind::Test { test } => {
				if let Some(value) = resolve_test(artifact, test, environment, context, resolver) {
					return Ok(Evaluation {
						value,
						reason: EvaluationReason::Test,
					});
				}
			}
			VariantKind::Rollout { rollout } => {
				if let Some(value) =
					resolve_rollout(artifact, rollout, environment, context, resolver)
				{
					return Ok(Evaluation {
						value,
						reason: EvaluationReason::Rollout,
					});
				}
			}
		}
	}

	Ok(Evaluation {
		value: config.default.clone(),
		reason: EvaluationReason::Default,
	})
}

/// Evaluates every flag in the artifact for one context.
///
/// Flags that cannot be evaluated (no section for this environment) are
/// skipped with a warning rather than failing the whole pass.
pub fn evaluate_all(
	artifact: &ConfigArtifact,
	environment: Environment,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> BTreeMap<String, Evaluation> {
	let mut results = BTreeMap::new();
	for key in artifact.flags.keys() {
		match evaluate_flag(artifact, key, environment, context, resolver) {
			Ok(evaluation) => {
				results.insert(key.clone(), evaluation);
			}
			Err(err) => {
				warn!(flag = %key, error = %err, "skipping flag during bulk evaluation");
			}
		}
	}
	results
}

/// Buckets the user into one of the test's weighted variants.
///
/// Falls through (`None`) when the reference dangles, the user is outside
/// the test's audience, the bucket lands past the cumulative weights, or the
/// assigned variant has no value for this environment.
fn resolve_test(
	artifact: &ConfigArtifact,
	test_key: &str,
	environment: Environment,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> Option<serde_json::Value> {
	let test = artifact.tests.get(test_key)?;
	if !all_match(&test.conditions, artifact, context, resolver) {
		return None;
	}

	let weights: Vec<(&str, u8)> = test
		.variants
		.iter()
		.map(|variant| (variant.name.as_str(), variant.percentage))
		.collect();
	let assigned = assign_variant(&test.salt, &context.local_id, weights)?;

	let variant = test.variants.iter().find(|variant| variant.name == assigned)?;
	variant.values.get(environment).cloned()
}

fn resolve_rollout(
	artifact: &ConfigArtifact,
	rollout_key: &str,
	environment: Environment,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> Option<serde_json::Value> {
	let rollout = artifact.rollouts.get(rollout_key)?;
	if !all_match(&rollout.conditions, artifact, context, resolver) {
		return None;
	}
	if !is_in_rollout(&rollout.salt, &context.local_id, rollout.percentage) {
		return None;
	}
	rollout.values.get(environment).cloned()
}

/// AND over a condition list, short-circuiting on the first miss.
///
/// An empty list matches vacuously; the validator warns about those at
/// authoring time.
fn all_match(
	conditions: &[Condition],
	artifact: &ConfigArtifact,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> bool {
	conditions
		.iter()
		.all(|condition| condition_matches(condition, artifact, context, resolver))
}

fn condition_matches(
	condition: &Condition,
	artifact: &ConfigArtifact,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> bool {
	match condition {
		Condition::AppVersion { operator, values, .. } => match &context.app_version {
			Some(actual) => operator.evaluate(actual, values),
			None => false,
		},
		Condition::OsVersion { operator, values, .. } => match &context.os_version {
			Some(actual) => operator.evaluate(actual, values),
			None => false,
		},
		Condition::Platform { operator, values, .. } => {
			membership(*operator, context.platform.as_deref(), values)
		}
		Condition::DeviceModel { operator, values, .. } => {
			membership(*operator, context.device_model.as_deref(), values)
		}
		Condition::Region { operator, values, .. } => {
			membership(*operator, context.region.as_deref(), values)
		}
		Condition::Cohort { operator, values, .. } => {
			let in_any = values
				.iter()
				.any(|key| in_cohort(artifact, key, context, resolver));
			match operator {
				MembershipOperator::In => in_any,
				MembershipOperator::NotIn => !in_any,
			}
		}
		Condition::CustomAttribute {
			key,
			operator,
			values,
			..
		} => resolver.matches(context, key, operator, values),
	}
}

/// A context attribute that was never set fails the condition, including
/// `not_in`: with nothing to compare, the evaluator refuses to guess.
fn membership(operator: MembershipOperator, actual: Option<&str>, values: &[String]) -> bool {
	match actual {
		Some(actual) => operator.evaluate(actual, values),
		None => false,
	}
}

/// Whether the context satisfies all of one cohort's conditions.
fn in_cohort(
	artifact: &ConfigArtifact,
	cohort_key: &str,
	context: &UserContext,
	resolver: &dyn CustomAttributeResolver,
) -> bool {
	let cohort = match artifact.cohorts.get(cohort_key) {
		Some(cohort) => cohort,
		None => return false,
	};
	cohort.conditions.iter().all(|condition| {
		// Cohorts may not reference cohorts. The validator rejects such
		// artifacts, but an untrusted one must not send us recursing.
		if condition.cohort_keys().is_some() {
			return false;
		}
		condition_matches(condition, artifact, context, resolver)
	})
}


#[cfg(test)]
mod proptest_tests {
	use super::*;
	use crate::context::NoOpCustomAttributeResolver;
	use bunting_core::artifact::{CompiledFlag, EnvConfig};
	use bunting_core::bucketing::bucket_for;
	use proptest::prelude::*;
	use serde_json::json;

	proptest! {
		/// A flag with no variants always evaluates to its default, for any
		/// local id.
		#[test]
		fn prop_no_variants_means_default(local_id in ".{0,40}") {
			let mut artifact = ConfigArtifact::new("com.example.shop");
			artifact.flags.insert(
				"plain".to_string(),
				CompiledFlag {
					flag_type: "int".to_string(),
					description: String::new(),
					development: None,
					staging: None,
					production: Some(EnvConfig { default: json!(7), variants: vec![] }),
				},
			);

			let result = evaluate_flag(
				&artifact,
				"plain",
				Environment::Production,
				&UserContext::new(local_id),
				&NoOpCustomAttributeResolver,
			)
			.unwrap();
			prop_assert_eq!(result.as_i64(), Some(7));
			prop_assert_eq!(result.reason, EvaluationReason::Default);
		}

		/// Rollout evaluation agrees with the bucketing engine for any user
		/// and percentage.
		#[test]
		fn prop_rollout_matches_bucketing(local_id in ".{1,40}", percentage in 0u8..=100) {
			let mut artifact = ConfigArtifact::new("com.example.shop");
			artifact.flags.insert(
				"dark_mode".to_string(),
				CompiledFlag {
					flag_type: "bool".to_string(),
					description: String::new(),
					development: None,
					staging: None,
					production: Some(EnvConfig {
						default: json!(false),
						variants: vec![Variant {
							order: 1,
							kind: VariantKind::Rollout { rollout: "r".to_string() },
						}],
					}),
				},
			);
			artifact.rollouts.insert(
				"r".to_string(),
				bunting_core::artifact::CompiledRollout {
					name: "R".to_string(),
					kind: bunting_core::artifact::ExperimentKind::Rollout,
					salt: "prop_salt".to_string(),
					conditions: vec![],
					percentage,
					values: bunting_core::experiment::EnvValues::uniform(json!(true)),
				},
			);

			let result = evaluate_flag(
				&artifact,
				"dark_mode",
				Environment::Production,
				&UserContext::new(local_id.clone()),
				&NoOpCustomAttributeResolver,
			)
			.unwrap();

			let expected = percentage > 0 && bucket_for("prop_salt", &local_id) <= percentage;
			prop_assert_eq!(result.as_bool(), Some(expected));
		}
	}
}
