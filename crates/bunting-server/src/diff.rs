// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structural diff between two artifacts, for preview-before-publish.

use std::collections::BTreeMap;

use serde::Serialize;

use bunting_core::artifact::ConfigArtifact;

/// Added/removed/changed entity keys within one artifact section.
///
/// Keys come out sorted because sections are ordered maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionDiff {
	pub added: Vec<String>,
	pub removed: Vec<String>,
	pub changed: Vec<String>,
}

impl SectionDiff {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
	}
}

/// Per-section diff of two artifacts.
///
/// Version and publish timestamp are not compared; a re-publish of identical
/// content diffs empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactDiff {
	pub flags: SectionDiff,
	pub cohorts: SectionDiff,
	pub tests: SectionDiff,
	pub rollouts: SectionDiff,
}

impl ArtifactDiff {
	pub fn is_empty(&self) -> bool {
		self.flags.is_empty()
			&& self.cohorts.is_empty()
			&& self.tests.is_empty()
			&& self.rollouts.is_empty()
	}
}

/// Diffs two artifacts section by section.
pub fn diff(old: &ConfigArtifact, new: &ConfigArtifact) -> ArtifactDiff {
	ArtifactDiff {
		flags: section_diff(&old.flags, &new.flags),
		cohorts: section_diff(&old.cohorts, &new.cohorts),
		tests: section_diff(&old.tests, &new.tests),
		rollouts: section_diff(&old.rollouts, &new.rollouts),
	}
}

fn section_diff<T: PartialEq>(
	old: &BTreeMap<String, T>,
	new: &BTreeMap<String, T>,
) -> SectionDiff {
	let mut diff = SectionDiff::default();

	for (key, value) in new {
		match old.get(key) {
			None => diff.added.push(key.clone()),
			Some(previous) if previous != value => diff.changed.push(key.clone()),
			Some(_) => {}
		}
	}
	for key in old.keys() {
		if !new.contains_key(key) {
			diff.removed.push(key.clone());
		}
	}

	diff
}
