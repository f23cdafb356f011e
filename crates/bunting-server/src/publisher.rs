// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The publish pipeline: compile, validate, version, sign.
//!
//! `preview` runs the pure compile+validate half so authors can inspect and
//! diff the artifact without committing anything. `publish` runs the whole
//! pipeline and returns the signed, versioned result; the storing caller
//! owns the transaction that makes the version allocation serial per app.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use bunting_core::app::AppSnapshot;
use bunting_core::artifact::ConfigArtifact;
use bunting_core::version::ConfigVersion;
use bunting_signing::{sign_artifact, sign_detached, KeyRing, DEFAULT_MAX_AGE};

use crate::compiler::compile;
use crate::error::{Result, ServerError};
use crate::validator::{validate, ValidationReport, ValidationWarning};

/// A compiled-but-uncommitted artifact with its validation findings.
#[derive(Debug, Clone)]
pub struct Preview {
	pub artifact: ConfigArtifact,
	pub report: ValidationReport,
}

/// The result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
	pub artifact: ConfigArtifact,
	pub version: ConfigVersion,
	/// The exact string the signatures cover.
	pub config_json: String,
	/// Embedded JWS (`header.payload.signature`).
	pub signature: String,
	/// Detached JWS (`header..signature`) over `config_json`.
	pub detached_signature: String,
	pub warnings: Vec<ValidationWarning>,
}

/// Compiles and validates without stamping a version or signing.
///
/// Validation findings do not fail a preview; they are returned for display.
pub fn preview(snapshot: &AppSnapshot) -> Result<Preview> {
	let artifact = compile(snapshot)?;
	let report = validate(&artifact);
	Ok(Preview { artifact, report })
}

/// Runs the full pipeline and returns the signed artifact.
///
/// `existing_versions` is the set of versions already committed for this
/// app; the caller must serialize concurrent publishes (read existing,
/// publish, commit, retry on conflict) because allocation here is pure.
pub fn publish(
	snapshot: &AppSnapshot,
	keyring: &KeyRing,
	existing_versions: &[ConfigVersion],
	now: DateTime<Utc>,
) -> Result<PublishedArtifact> {
	let mut artifact = compile(snapshot)?;

	let report = validate(&artifact);
	if !report.is_publishable() {
		return Err(ServerError::ValidationFailed {
			errors: report.errors,
		});
	}

	let version = ConfigVersion::next(now.date_naive(), existing_versions.iter().copied());
	artifact.config_version = Some(version);
	artifact.published_at = Some(now);

	let config_json = artifact.canonical_json()?;
	let key = keyring.active()?;
	let signature = sign_artifact(&config_json, key, DEFAULT_MAX_AGE)?;
	let detached_signature = sign_detached(&config_json, key)?;

	debug!(
		app = %artifact.app_identifier,
		version = %version,
		digest = %content_digest(&config_json),
		kid = %key.kid,
		"published config artifact"
	);

	Ok(PublishedArtifact {
		artifact,
		version,
		config_json,
		signature,
		detached_signature,
		warnings: report.warnings,
	})
}

/// Hex SHA-256 of the canonical JSON, a stable content id for storage paths
/// and logs.
pub fn content_digest(config_json: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(config_json.as_bytes());
	hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;
	use bunting_core::app::App;
	use bunting_core::condition::{Condition, MembershipOperator};
	use bunting_core::flag::{Flag, FlagEnvironment, Variant, VariantKind};
	use bunting_signing::{verify_artifact, verify_detached, SigningError};
	use chrono::TimeZone;
	use serde_json::json;
	use std::sync::OnceLock;

	fn keyring() -> &'static KeyRing {
		static RING: OnceLock<KeyRing> = OnceLock::new();
		RING.get_or_init(|| KeyRing::with_initial_key().expect("key generation"))
	}

	fn snapshot() -> AppSnapshot {
		AppSnapshot::new(App {
			identifier: "com.example.shop".to_string(),
			name: "Shop".to_string(),
			fetch_policy: Default::default(),
		})
		.with_flag(Flag {
			key: "dark_mode".to_string(),
			flag_type: "bool".to_string(),
			description: String::new(),
			development: FlagEnvironment {
				default: Some(json!(true)),
				variants: vec![],
			},
			staging: FlagEnvironment {
				default: Some(json!(false)),
				variants: vec![],
			},
			production: FlagEnvironment {
				default: Some(json!(false)),
				variants: vec![],
			},
		})
	}

	fn publish_time() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
	}

	#[test]
	fn test_preview_is_unversioned_and_unsigned() {
		let preview = preview(&snapshot()).unwrap();
		assert!(!preview.artifact.is_published());
		assert!(preview.report.is_publishable());
	}

	#[test]
	fn test_publish_stamps_version_and_signs() {
		let published = publish(&snapshot(), keyring(), &[], publish_time()).unwrap();

		assert_eq!(published.version.to_string(), "2025-06-01.1");
		assert!(published.artifact.is_published());
		assert!(published.config_json.contains(r#""config_version":"2025-06-01.1""#));
		assert!(published.config_json.contains(r#""published_at":"#));

		let exports = keyring().export_public_keys();
		let verified = verify_artifact(&published.signature, &exports).unwrap();
		assert_eq!(verified.config_json, published.config_json);

		let verified =
			verify_detached(&published.config_json, &published.detached_signature, &exports)
				.unwrap();
		assert_eq!(verified.config_json, published.config_json);
	}

	#[test]
	fn test_publish_allocates_next_sequence_for_today() {
		let existing = vec![
			"2025-05-31.7".parse().unwrap(),
			"2025-06-01.1".parse().unwrap(),
			"2025-06-01.2".parse().unwrap(),
		];

		let published = publish(&snapshot(), keyring(), &existing, publish_time()).unwrap();
		assert_eq!(published.version.to_string(), "2025-06-01.3");
	}

	#[test]
	fn test_publish_gates_on_validation_errors() {
		// A dangling cohort reference compiles fine but fails validation.
		let mut snapshot = snapshot();
		let flag = snapshot.flags.get_mut("dark_mode").unwrap();
		flag.production.variants = vec![Variant {
			order: 1,
			kind: VariantKind::Conditional {
				conditions: vec![Condition::Cohort {
					id: "c1".to_string(),
					operator: MembershipOperator::In,
					values: vec!["beta_testers".to_string()],
				}],
				value: json!(true),
			},
		}];

		let err = publish(&snapshot, keyring(), &[], publish_time()).unwrap_err();
		match err {
			ServerError::ValidationFailed { errors } => {
				assert_eq!(errors.len(), 1);
				assert_eq!(errors[0].code(), "missing_cohort_reference");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_publish_surfaces_compile_defects() {
		let mut snapshot = snapshot();
		snapshot.flags.get_mut("dark_mode").unwrap().flag_type = "boolean".to_string();

		let err = publish(&snapshot, keyring(), &[], publish_time()).unwrap_err();
		assert!(matches!(err, ServerError::Compile(_)));
	}

	#[test]
	fn test_publish_requires_active_key() {
		let empty = KeyRing::new();
		let err = publish(&snapshot(), &empty, &[], publish_time()).unwrap_err();
		assert!(matches!(err, ServerError::Signing(SigningError::NoActiveKey)));
	}

	#[test]
	fn test_content_digest_is_stable_hex() {
		let digest = content_digest(r#"{"schema_version":2}"#);
		assert_eq!(digest.len(), 64);
		assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
		assert_eq!(digest, content_digest(r#"{"schema_version":2}"#));
		assert_ne!(digest, content_digest(r#"{"schema_version":3}"#));
	}
}
