// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::condition::Condition;
use crate::environment::Environment;

/// Canonical flag value types.
///
/// The six lowercase names below are the only valid type strings; anything
/// else (the historical `"boolean"` drift included) is rejected when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
	Bool,
	String,
	Int,
	Double,
	Date,
	Json,
}

impl FlagType {
	/// All canonical types.
	pub const ALL: [FlagType; 6] = [
		FlagType::Bool,
		FlagType::String,
		FlagType::Int,
		FlagType::Double,
		FlagType::Date,
		FlagType::Json,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FlagType::Bool => "bool",
			FlagType::String => "string",
			FlagType::Int => "int",
			FlagType::Double => "double",
			FlagType::Date => "date",
			FlagType::Json => "json",
		}
	}
}

impl fmt::Display for FlagType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error for type names outside the canonical set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flag type '{0}'")]
pub struct ParseFlagTypeError(pub String);

impl FromStr for FlagType {
	type Err = ParseFlagTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bool" => Ok(FlagType::Bool),
			"string" => Ok(FlagType::String),
			"int" => Ok(FlagType::Int),
			"double" => Ok(FlagType::Double),
			"date" => Ok(FlagType::Date),
			"json" => Ok(FlagType::Json),
			other => Err(ParseFlagTypeError(other.to_string())),
		}
	}
}

/// A stored feature flag, as authored.
///
/// The declared type is kept as the stored string here; the record store is
/// schemaless and historical data contains drifted names, so the compiler
/// parses it into [`FlagType`] and fails fast instead of trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
	pub key: String,
	#[serde(rename = "type")]
	pub flag_type: String,
	#[serde(default)]
	pub description: String,
	pub development: FlagEnvironment,
	pub staging: FlagEnvironment,
	pub production: FlagEnvironment,
}

impl Flag {
	/// Per-environment configuration for the given environment.
	pub fn environment(&self, environment: Environment) -> &FlagEnvironment {
		match environment {
			Environment::Development => &self.development,
			Environment::Staging => &self.staging,
			Environment::Production => &self.production,
		}
	}
}

/// One environment's stored configuration for a flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagEnvironment {
	/// Value served when no variant matches. Required at compile time.
	#[serde(default)]
	pub default: Option<serde_json::Value>,
	#[serde(default)]
	pub variants: Vec<Variant>,
}

/// One override rule inside a flag's per-environment configuration.
///
/// Variants are evaluated ascending by `order`; the first match wins. Ties
/// keep their original insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
	pub order: u32,
	#[serde(flatten)]
	pub kind: VariantKind,
}

/// The three variant kinds, tagged on `type`.
///
/// Each kind carries only the fields relevant to it: conditions and a value
/// for `conditional`, a key reference for `test` and `rollout`. An artifact
/// cannot express a rollout variant with leftover conditional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantKind {
	Conditional {
		#[serde(default)]
		conditions: Vec<Condition>,
		value: serde_json::Value,
	},
	Test {
		/// Key of the referenced test.
		test: String,
	},
	Rollout {
		/// Key of the referenced rollout.
		rollout: String,
	},
}
