// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Spawner runtime configuration.

use std::time::Duration;

const USERNAME_PLACEHOLDER: &str = "{username}";

/// Configuration for the spawner.
#[derive(Debug, Clone)]
pub struct SpawnerConfig {
	/// Namespace for user pods and hub services
	pub namespace: String,
	/// Pod names are `<prefix>-<escaped username>`
	pub pod_name_prefix: String,
	/// Notebook container image
	pub image: String,
	/// Container port reported back to the platform
	pub port: u16,
	/// Optional storage mounted into every user pod
	pub volume: Option<VolumeRef>,
	/// Where the pod should reach the hub API
	pub hub_address: HubAddressOverrides,
	/// Sleep between readiness polls
	pub poll_interval: Duration,
	/// Maximum wait for a pod to reach `Running`
	pub start_timeout: Duration,
}

impl Default for SpawnerConfig {
	fn default() -> Self {
		Self {
			namespace: "default".to_string(),
			pod_name_prefix: "jupyterhub".to_string(),
			image: "jupyterhub/singleuser".to_string(),
			port: 8888,
			volume: None,
			hub_address: HubAddressOverrides::default(),
			poll_interval: Duration::from_secs(5),
			start_timeout: Duration::from_secs(300),
		}
	}
}

/// Storage attached to a user pod.
///
/// Any field may contain `{username}`, expanded per user by [`VolumeRef::for_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeRef {
	PersistentClaim {
		claim_name: String,
		mount_path: String,
	},
	Nfs {
		server: String,
		path: String,
		mount_path: String,
	},
}

impl VolumeRef {
	pub fn mount_path(&self) -> &str {
		match self {
			VolumeRef::PersistentClaim { mount_path, .. } | VolumeRef::Nfs { mount_path, .. } => {
				mount_path
			}
		}
	}

	/// Expand `{username}` placeholders with an already escaped username.
	pub fn for_user(&self, escaped_username: &str) -> VolumeRef {
		let expand = |s: &str| s.replace(USERNAME_PLACEHOLDER, escaped_username);
		match self {
			VolumeRef::PersistentClaim {
				claim_name,
				mount_path,
			} => VolumeRef::PersistentClaim {
				claim_name: expand(claim_name),
				mount_path: expand(mount_path),
			},
			VolumeRef::Nfs {
				server,
				path,
				mount_path,
			} => VolumeRef::Nfs {
				server: expand(server),
				path: expand(path),
				mount_path: expand(mount_path),
			},
		}
	}
}

/// Hub address overrides, consulted in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubAddressOverrides {
	/// Static hub address
	pub ip: Option<String>,
	/// Service whose first load-balancer ingress is the hub
	pub service: Option<String>,
	/// Peer pod whose address is the hub
	pub pod: Option<String>,
}

/// The single source a hub address is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubAddressSource<'a> {
	Static(&'a str),
	Service(&'a str),
	Pod(&'a str),
	PlatformDefault,
}

impl HubAddressOverrides {
	/// Highest-priority configured source. Empty values count as unset.
	pub fn source(&self) -> HubAddressSource<'_> {
		if let Some(ip) = configured(&self.ip) {
			HubAddressSource::Static(ip)
		} else if let Some(service) = configured(&self.service) {
			HubAddressSource::Service(service)
		} else if let Some(pod) = configured(&self.pod) {
			HubAddressSource::Pod(pod)
		} else {
			HubAddressSource::PlatformDefault
		}
	}
}

fn configured(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|s| !s.is_empty())
}
