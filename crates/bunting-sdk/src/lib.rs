// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side engine for Bunting feature configuration.
//!
//! # Overview
//!
//! - Evaluates a flag (or all flags) against a [`UserContext`], walking
//!   variants in order and bucketing test/rollout references
//!   deterministically
//! - Caches the current artifact in an [`ArtifactStore`] that only swaps
//!   after signature verification and keeps last-known-good on any failure
//! - Leaves `custom_attribute` conditions to the host via
//!   [`CustomAttributeResolver`]
//!
//! # Example
//!
//! ```
//! use bunting_core::artifact::{CompiledFlag, ConfigArtifact, EnvConfig};
//! use bunting_core::environment::Environment;
//! use bunting_sdk::{evaluate_flag, NoOpCustomAttributeResolver, UserContext};
//!
//! # fn main() -> Result<(), bunting_sdk::EvaluationError> {
//! let mut artifact = ConfigArtifact::new("com.example.app");
//! artifact.flags.insert(
//!     "dark_mode".to_string(),
//!     CompiledFlag {
//!         flag_type: "bool".to_string(),
//!         description: String::new(),
//!         development: None,
//!         staging: None,
//!         production: Some(EnvConfig {
//!             default: serde_json::json!(false),
//!             variants: vec![],
//!         }),
//!     },
//! );
//!
//! let context = UserContext::new("device-9f8e").with_region("EU");
//! let result = evaluate_flag(
//!     &artifact,
//!     "dark_mode",
//!     Environment::Production,
//!     &context,
//!     &NoOpCustomAttributeResolver,
//! )?;
//! assert_eq!(result.as_bool(), Some(false));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod evaluator;
pub mod store;

pub use context::{CustomAttributeResolver, NoOpCustomAttributeResolver, UserContext};
pub use error::{EvaluationError, StoreError};
pub use evaluator::{evaluate_all, evaluate_flag, Evaluation, EvaluationReason};
pub use store::{ApplyOutcome, ArtifactStore, StoredArtifact};
