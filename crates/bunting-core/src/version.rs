// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A config version of the form `YYYY-MM-DD.N`.
///
/// Versions order by date, then by sequence number within the day. The
/// sequence starts at 1 and allocation is pure: [`ConfigVersion::next`] picks
/// the successor given the versions that already exist, and the storing
/// caller is responsible for committing it transactionally (two publishers
/// racing must not both win the same number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigVersion {
	date: NaiveDate,
	seq: u32,
}

impl ConfigVersion {
	/// First version of a day.
	pub fn initial(date: NaiveDate) -> Self {
		Self { date, seq: 1 }
	}

	/// Allocates the next version for `today` given all existing versions.
	///
	/// Existing versions from other days are ignored; the first publish of a
	/// new day restarts the sequence at 1.
	pub fn next<I>(today: NaiveDate, existing: I) -> Self
	where
		I: IntoIterator<Item = ConfigVersion>,
	{
		let max_today = existing
			.into_iter()
			.filter(|version| version.date == today)
			.map(|version| version.seq)
			.max();

		match max_today {
			Some(seq) => Self {
				date: today,
				seq: seq + 1,
			},
			None => Self::initial(today),
		}
	}

	pub fn date(&self) -> NaiveDate {
		self.date
	}

	pub fn seq(&self) -> u32 {
		self.seq
	}
}

impl fmt::Display for ConfigVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.date.format("%Y-%m-%d"), self.seq)
	}
}

/// Error for version strings that do not parse as `YYYY-MM-DD.N`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
	#[error("malformed config version '{0}', expected YYYY-MM-DD.N")]
	Malformed(String),

	#[error("invalid date in config version '{0}'")]
	InvalidDate(String),

	#[error("invalid sequence number in config version '{0}'")]
	InvalidSequence(String),
}

impl FromStr for ConfigVersion {
	type Err = ParseVersionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (date_part, seq_part) = match s.rsplit_once('.') {
			Some(parts) => parts,
			None => return Err(ParseVersionError::Malformed(s.to_string())),
		};

		let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
			.map_err(|_| ParseVersionError::InvalidDate(s.to_string()))?;

		let seq: u32 = seq_part
			.parse()
			.map_err(|_| ParseVersionError::InvalidSequence(s.to_string()))?;
		if seq == 0 {
			return Err(ParseVersionError::InvalidSequence(s.to_string()));
		}

		Ok(Self { date, seq })
	}
}

impl Serialize for ConfigVersion {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ConfigVersion {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn test_display_format() {
		let version = ConfigVersion::initial(date(2025, 3, 7));
		assert_eq!(version.to_string(), "2025-03-07.1");
	}

	#[test]
	fn test_parse_round_trip() {
		let version: ConfigVersion = "2025-03-07.12".parse().unwrap();
		assert_eq!(version.date(), date(2025, 3, 7));
		assert_eq!(version.seq(), 12);
		assert_eq!(version.to_string(), "2025-03-07.12");
	}

	#[test]
	fn test_parse_rejects_malformed() {
		assert_eq!(
			"20250307".parse::<ConfigVersion>(),
			Err(ParseVersionError::Malformed("20250307".to_string()))
		);
		assert!(matches!(
			"2025-13-01.1".parse::<ConfigVersion>(),
			Err(ParseVersionError::InvalidDate(_))
		));
		assert!(matches!(
			"2025-03-07.0".parse::<ConfigVersion>(),
			Err(ParseVersionError::InvalidSequence(_))
		));
		assert!(matches!(
			"2025-03-07.x".parse::<ConfigVersion>(),
			Err(ParseVersionError::InvalidSequence(_))
		));
	}

	#[test]
	fn test_next_increments_within_day() {
		let today = date(2025, 3, 7);
		let existing = vec![
			ConfigVersion::initial(today),
			ConfigVersion::next(today, [ConfigVersion::initial(today)]),
		];

		let next = ConfigVersion::next(today, existing);
		assert_eq!(next.to_string(), "2025-03-07.3");
	}

	#[test]
	fn test_next_restarts_on_new_day() {
		let yesterday = date(2025, 3, 6);
		let today = date(2025, 3, 7);

		let existing = vec!["2025-03-06.9".parse::<ConfigVersion>().unwrap()];
		assert_eq!(existing[0].date(), yesterday);

		let next = ConfigVersion::next(today, existing);
		assert_eq!(next, ConfigVersion::initial(today));
	}

	#[test]
	fn test_ordering_is_date_then_seq() {
		let a: ConfigVersion = "2025-03-06.9".parse().unwrap();
		let b: ConfigVersion = "2025-03-07.1".parse().unwrap();
		let c: ConfigVersion = "2025-03-07.2".parse().unwrap();

		assert!(a < b);
		assert!(b < c);
	}

	#[test]
	fn test_serializes_as_string() {
		let version: ConfigVersion = "2025-03-07.2".parse().unwrap();
		assert_eq!(serde_json::to_string(&version).unwrap(), "\"2025-03-07.2\"");

		let parsed: ConfigVersion = serde_json::from_str("\"2025-03-07.2\"").unwrap();
		assert_eq!(parsed, version);
	}
}
