// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Bunting feature flag engine.
//!
//! This crate provides the shared domain model (flags, cohorts, tests,
//! rollouts), identifier validation, the deterministic bucketing algorithm,
//! and the compiled artifact schema. It is used by both the authoring-side
//! engine (`bunting-server`) and the client SDK (`bunting-sdk`).
//!
//! # Overview
//!
//! The engine turns stored entities into signed artifacts:
//! - Flags declare a type and per-environment defaults plus ordered variants
//! - Variants override the default conditionally, via an A/B test, or via a
//!   percentage rollout
//! - Bucketing hashes `salt:local_id` so every SDK assigns users identically
//! - Artifacts are versioned `YYYY-MM-DD.N` and serialized canonically so
//!   signatures stay byte-exact
//!
//! # Example
//!
//! ```
//! use bunting_core::{bucket_for, is_in_rollout, validate_key};
//!
//! // Keys are validated before anything is stored or compiled
//! assert!(validate_key("dark_mode").is_ok());
//! assert!(validate_key("Dark-Mode").is_err());
//!
//! // Bucket assignment is pure and deterministic
//! let bucket = bucket_for("rollout_salt", "user_42");
//! assert!((1..=100).contains(&bucket));
//! assert_eq!(
//!     is_in_rollout("rollout_salt", "user_42", 50),
//!     bucket <= 50,
//! );
//! ```

pub mod app;
pub mod artifact;
pub mod bucketing;
pub mod cohort;
pub mod condition;
pub mod environment;
pub mod error;
pub mod experiment;
pub mod flag;
pub mod key;
pub mod version;

pub use app::{App, AppSnapshot, FetchPolicy};
pub use artifact::{
	CompiledCohort, CompiledFlag, CompiledRollout, CompiledTest, ConfigArtifact, EnvConfig,
	ExperimentKind, SCHEMA_VERSION,
};
pub use bucketing::{assign_variant, bucket_for, is_in_rollout, BUCKET_COUNT};
pub use cohort::Cohort;
pub use condition::{compare_versions, Condition, MembershipOperator, VersionOperator};
pub use environment::{Environment, UnknownEnvironment};
pub use error::KeyError;
pub use experiment::{generate_salt, EnvValues, Rollout, Test, TestVariant};
pub use flag::{Flag, FlagEnvironment, FlagType, ParseFlagTypeError, Variant, VariantKind};
pub use key::{normalize_key, validate_authoring_key, validate_key, MAX_KEY_LENGTH, MIN_KEY_LENGTH};
pub use version::{ConfigVersion, ParseVersionError};
