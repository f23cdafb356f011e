// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Targeting conditions and their operators.
//!
//! Conditions are attached to conditional variants, cohorts, and test/rollout
//! audiences, and are always combined with AND semantics. Each kind carries
//! its own operator set, so an impossible pairing (say, `between` on a region
//! list) is unrepresentable rather than a runtime validation case.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A typed targeting predicate.
///
/// Serialized with an internal `type` tag, matching the artifact wire format:
/// `{"type": "region", "id": "...", "operator": "in", "values": ["EU"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
	AppVersion {
		#[serde(default)]
		id: String,
		operator: VersionOperator,
		values: Vec<String>,
	},
	OsVersion {
		#[serde(default)]
		id: String,
		operator: VersionOperator,
		values: Vec<String>,
	},
	Platform {
		#[serde(default)]
		id: String,
		operator: MembershipOperator,
		values: Vec<String>,
	},
	DeviceModel {
		#[serde(default)]
		id: String,
		operator: MembershipOperator,
		values: Vec<String>,
	},
	Region {
		#[serde(default)]
		id: String,
		operator: MembershipOperator,
		values: Vec<String>,
	},
	/// Membership in named cohorts; `values` holds cohort keys.
	Cohort {
		#[serde(default)]
		id: String,
		operator: MembershipOperator,
		values: Vec<String>,
	},
	/// Extension point evaluated by the calling SDK, which receives the
	/// attribute key, a free-form operator, and the values as given.
	CustomAttribute {
		#[serde(default)]
		id: String,
		key: String,
		operator: String,
		values: Vec<serde_json::Value>,
	},
}

impl Condition {
	/// The condition kind as it appears on the wire.
	pub fn kind(&self) -> &'static str {
		match self {
			Condition::AppVersion { .. } => "app_version",
			Condition::OsVersion { .. } => "os_version",
			Condition::Platform { .. } => "platform",
			Condition::DeviceModel { .. } => "device_model",
			Condition::Region { .. } => "region",
			Condition::Cohort { .. } => "cohort",
			Condition::CustomAttribute { .. } => "custom_attribute",
		}
	}

	/// Cohort keys referenced by this condition, if any.
	pub fn cohort_keys(&self) -> Option<&[String]> {
		match self {
			Condition::Cohort { values, .. } => Some(values),
			_ => None,
		}
	}
}

/// Comparison operators for version-valued conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOperator {
	Equals,
	DoesNotEqual,
	GreaterThan,
	GreaterThanOrEqual,
	LessThan,
	LessThanOrEqual,
	/// Inclusive on both bounds; expects exactly two values.
	Between,
}

impl VersionOperator {
	/// Evaluates the operator against an actual version string.
	///
	/// Any unparseable version, on either side, makes the condition
	/// non-matching. That includes `does_not_equal`: a user whose version we
	/// cannot read is never targeted.
	pub fn evaluate(&self, actual: &str, values: &[String]) -> bool {
		match self {
			VersionOperator::Equals => compare_first(actual, values) == Some(Ordering::Equal),
			VersionOperator::DoesNotEqual => matches!(
				compare_first(actual, values),
				Some(Ordering::Less | Ordering::Greater)
			),
			VersionOperator::GreaterThan => compare_first(actual, values) == Some(Ordering::Greater),
			VersionOperator::GreaterThanOrEqual => matches!(
				compare_first(actual, values),
				Some(Ordering::Greater | Ordering::Equal)
			),
			VersionOperator::LessThan => compare_first(actual, values) == Some(Ordering::Less),
			VersionOperator::LessThanOrEqual => matches!(
				compare_first(actual, values),
				Some(Ordering::Less | Ordering::Equal)
			),
			VersionOperator::Between => match (values.first(), values.get(1)) {
				(Some(low), Some(high)) => {
					matches!(
						compare_versions(actual, low),
						Some(Ordering::Greater | Ordering::Equal)
					) && matches!(
						compare_versions(actual, high),
						Some(Ordering::Less | Ordering::Equal)
					)
				}
				_ => false,
			},
		}
	}
}

fn compare_first(actual: &str, values: &[String]) -> Option<Ordering> {
	compare_versions(actual, values.first()?)
}

/// Membership operators for list-valued conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipOperator {
	In,
	NotIn,
}

impl MembershipOperator {
	pub fn evaluate(&self, actual: &str, values: &[String]) -> bool {
		let contains = values.iter().any(|v| v == actual);
		match self {
			MembershipOperator::In => contains,
			MembershipOperator::NotIn => !contains,
		}
	}
}

/// Compares two version strings component-wise.
///
/// Versions are split on `.` and compared as integers, with missing trailing
/// components treated as 0 (`"1.2"` equals `"1.2.0"`). Returns `None` when
/// either side has a non-numeric component; callers treat that as
/// non-matching.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
	let a_parts = parse_version(a)?;
	let b_parts = parse_version(b)?;

	let len = a_parts.len().max(b_parts.len());
	for i in 0..len {
		let x = a_parts.get(i).copied().unwrap_or(0);
		let y = b_parts.get(i).copied().unwrap_or(0);
		match x.cmp(&y) {
			Ordering::Equal => {}
			other => return Some(other),
		}
	}

	Some(Ordering::Equal)
}

fn parse_version(version: &str) -> Option<Vec<u64>> {
	version
		.split('.')
		.map(|component| component.trim().parse::<u64>().ok())
		.collect()
}
