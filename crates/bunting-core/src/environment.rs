// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deployment environment a flag value is resolved against.
///
/// The set is closed: every flag carries configuration for exactly these
/// three environments, and SDK callers pick one at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	Development,
	Staging,
	Production,
}

impl Environment {
	/// All environments, in artifact order.
	pub const ALL: [Environment; 3] = [
		Environment::Development,
		Environment::Staging,
		Environment::Production,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Environment::Development => "development",
			Environment::Staging => "staging",
			Environment::Production => "production",
		}
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error for environment names outside the canonical set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment '{0}', expected one of development, staging, production")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
	type Err = UnknownEnvironment;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"development" => Ok(Environment::Development),
			"staging" => Ok(Environment::Staging),
			"production" => Ok(Environment::Production),
			other => Err(UnknownEnvironment(other.to_string())),
		}
	}
}
