// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hub address configuration section.
//!
//! At most one of the options is used; `ip` wins over `ip_from_service`,
//! which wins over `ip_from_pod`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HubConfigLayer {
	pub ip: Option<String>,
	pub ip_from_service: Option<String>,
	pub ip_from_pod: Option<String>,
}

impl HubConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.ip.is_some() {
			self.ip = other.ip;
		}
		if other.ip_from_service.is_some() {
			self.ip_from_service = other.ip_from_service;
		}
		if other.ip_from_pod.is_some() {
			self.ip_from_pod = other.ip_from_pod;
		}
	}

	/// Empty values count as unset.
	pub fn finalize(self) -> HubConfig {
		HubConfig {
			ip: non_empty(self.ip),
			ip_from_service: non_empty(self.ip_from_service),
			ip_from_pod: non_empty(self.ip_from_pod),
		}
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HubConfig {
	/// Static hub address
	pub ip: Option<String>,
	/// Service whose first load-balancer ingress is the hub
	pub ip_from_service: Option<String>,
	/// Peer pod whose address is the hub
	pub ip_from_pod: Option<String>,
}

impl HubConfig {
	/// Name of the option that will be consulted, for logging.
	pub fn source_name(&self) -> &'static str {
		if self.ip.is_some() {
			"static"
		} else if self.ip_from_service.is_some() {
			"service"
		} else if self.ip_from_pod.is_some() {
			"pod"
		} else {
			"platform-default"
		}
	}
}
