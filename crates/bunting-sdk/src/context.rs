// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The user context a flag is evaluated against.

use std::collections::BTreeMap;

/// Everything known about the user/device at evaluation time.
///
/// `local_id` is the stable per-install identifier that drives bucketing;
/// the rest are targeting attributes matched by conditions. Attributes that
/// were never set simply fail the conditions that need them.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
	pub local_id: String,
	pub app_version: Option<String>,
	pub os_version: Option<String>,
	pub platform: Option<String>,
	pub device_model: Option<String>,
	pub region: Option<String>,
	/// Free-form attributes consumed by a [`CustomAttributeResolver`].
	pub attributes: BTreeMap<String, serde_json::Value>,
}

impl UserContext {
	pub fn new(local_id: impl Into<String>) -> Self {
		Self {
			local_id: local_id.into(),
			app_version: None,
			os_version: None,
			platform: None,
			device_model: None,
			region: None,
			attributes: BTreeMap::new(),
		}
	}

	pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
		self.os_version = Some(version.into());
		self
	}

	pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
		self.platform = Some(platform.into());
		self
	}

	pub fn with_device_model(mut self, model: impl Into<String>) -> Self {
		self.device_model = Some(model.into());
		self
	}

	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());
		self
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.attributes.insert(key.into(), value);
		self
	}
}

/// Extension point for `custom_attribute` conditions.
///
/// The engine defines the contract only: the host SDK decides what the
/// condition's key/operator/values mean. Implementations must treat any
/// condition they cannot resolve as non-matching, never matching-by-default.
pub trait CustomAttributeResolver {
	fn matches(
		&self,
		context: &UserContext,
		key: &str,
		operator: &str,
		values: &[serde_json::Value],
	) -> bool;
}

/// Resolves nothing; every custom-attribute condition is non-matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCustomAttributeResolver;

impl CustomAttributeResolver for NoOpCustomAttributeResolver {
	fn matches(&self, _: &UserContext, _: &str, _: &str, _: &[serde_json::Value]) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_builder_accumulates_attributes() {
		let context = UserContext::new("device-9f8e")
			.with_app_version("2.1.0")
			.with_platform("ios")
			.with_region("EU")
			.with_attribute("plan", json!("pro"))
			.with_attribute("signup_year", json!(2024));

		assert_eq!(context.local_id, "device-9f8e");
		assert_eq!(context.app_version.as_deref(), Some("2.1.0"));
		assert_eq!(context.os_version, None);
		assert_eq!(context.attributes["plan"], json!("pro"));
		assert_eq!(context.attributes.len(), 2);
	}

	#[test]
	fn test_noop_resolver_never_matches() {
		let context = UserContext::new("u1").with_attribute("plan", json!("pro"));
		let resolver = NoOpCustomAttributeResolver;
		assert!(!resolver.matches(&context, "plan", "equals", &[json!("pro")]));
	}
}
