// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Spawn timing configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_START_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpawnConfigLayer {
	pub poll_interval_secs: Option<u64>,
	pub start_timeout_secs: Option<u64>,
}

impl SpawnConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.poll_interval_secs.is_some() {
			self.poll_interval_secs = other.poll_interval_secs;
		}
		if other.start_timeout_secs.is_some() {
			self.start_timeout_secs = other.start_timeout_secs;
		}
	}

	pub fn resolve(self) -> Result<SpawnConfig, ConfigError> {
		let poll_interval_secs = self
			.poll_interval_secs
			.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
		let start_timeout_secs = self
			.start_timeout_secs
			.unwrap_or(DEFAULT_START_TIMEOUT_SECS);

		if poll_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"spawn.poll_interval_secs must be greater than zero".to_string(),
			));
		}
		if start_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"spawn.start_timeout_secs must be greater than zero".to_string(),
			));
		}

		Ok(SpawnConfig {
			poll_interval_secs,
			start_timeout_secs,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
	/// Sleep between readiness polls
	pub poll_interval_secs: u64,
	/// Maximum wait for a pod to reach `Running`
	pub start_timeout_secs: u64,
}

impl SpawnConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn start_timeout(&self) -> Duration {
		Duration::from_secs(self.start_timeout_secs)
	}
}

impl Default for SpawnConfig {
	fn default() -> Self {
		Self {
			poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
			start_timeout_secs: DEFAULT_START_TIMEOUT_SECS,
		}
	}
}
