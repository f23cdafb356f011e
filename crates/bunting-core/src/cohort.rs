// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// A named, reusable set of targeting conditions (ANDed).
///
/// Cohorts are referenced from variant conditions by key. A cohort's own
/// conditions must never contain a `cohort` condition; the validator rejects
/// that structurally, so cohort membership checks never recurse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
	pub key: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub conditions: Vec<Condition>,
}
