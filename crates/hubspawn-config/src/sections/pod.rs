// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User pod configuration section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_NAME_PREFIX: &str = "jupyterhub";
const DEFAULT_IMAGE: &str = "jupyterhub/singleuser";
const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PodConfigLayer {
	pub name_prefix: Option<String>,
	pub image: Option<String>,
	pub port: Option<u16>,
	pub volume: Option<VolumeConfigLayer>,
}

/// Volume options. Either `claim_name` or `nfs_server` + `nfs_path`, always
/// with `mount_path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolumeConfigLayer {
	pub claim_name: Option<String>,
	pub mount_path: Option<String>,
	pub nfs_server: Option<String>,
	pub nfs_path: Option<String>,
}

impl VolumeConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.claim_name.is_some() {
			self.claim_name = other.claim_name;
		}
		if other.mount_path.is_some() {
			self.mount_path = other.mount_path;
		}
		if other.nfs_server.is_some() {
			self.nfs_server = other.nfs_server;
		}
		if other.nfs_path.is_some() {
			self.nfs_path = other.nfs_path;
		}
	}

	fn is_empty(&self) -> bool {
		self.claim_name.is_none()
			&& self.mount_path.is_none()
			&& self.nfs_server.is_none()
			&& self.nfs_path.is_none()
	}

	pub fn resolve(self) -> Result<Option<VolumeConfig>, ConfigError> {
		if self.is_empty() {
			return Ok(None);
		}

		let is_nfs = self.nfs_server.is_some() || self.nfs_path.is_some();
		if self.claim_name.is_some() && is_nfs {
			return Err(ConfigError::Validation(
				"pod.volume: claim_name and nfs_server/nfs_path are mutually exclusive".to_string(),
			));
		}

		let mount_path = self.mount_path.ok_or_else(|| {
			ConfigError::Validation("pod.volume.mount_path is required for a volume".to_string())
		})?;

		if let Some(claim_name) = self.claim_name {
			return Ok(Some(VolumeConfig::PersistentClaim {
				claim_name,
				mount_path,
			}));
		}

		match (self.nfs_server, self.nfs_path) {
			(Some(server), Some(path)) => Ok(Some(VolumeConfig::Nfs {
				server,
				path,
				mount_path,
			})),
			(None, None) => Err(ConfigError::Validation(
				"pod.volume.mount_path is set without claim_name or nfs_server/nfs_path"
					.to_string(),
			)),
			_ => Err(ConfigError::Validation(
				"pod.volume: nfs_server and nfs_path must be set together".to_string(),
			)),
		}
	}
}

impl PodConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.name_prefix.is_some() {
			self.name_prefix = other.name_prefix;
		}
		if other.image.is_some() {
			self.image = other.image;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		match (self.volume.as_mut(), other.volume) {
			(Some(volume), Some(other)) => volume.merge(other),
			(None, Some(other)) => self.volume = Some(other),
			_ => {}
		}
	}

	pub fn resolve(self) -> Result<PodConfig, ConfigError> {
		let port = self.port.unwrap_or(DEFAULT_PORT);
		if port == 0 {
			return Err(ConfigError::Validation(
				"pod.port must be greater than zero".to_string(),
			));
		}

		let volume = match self.volume {
			Some(layer) => layer.resolve()?,
			None => None,
		};

		Ok(PodConfig {
			name_prefix: self
				.name_prefix
				.unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string()),
			image: self.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
			port,
			volume,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodConfig {
	pub name_prefix: String,
	pub image: String,
	pub port: u16,
	pub volume: Option<VolumeConfig>,
}

impl Default for PodConfig {
	fn default() -> Self {
		Self {
			name_prefix: DEFAULT_NAME_PREFIX.to_string(),
			image: DEFAULT_IMAGE.to_string(),
			port: DEFAULT_PORT,
			volume: None,
		}
	}
}

/// Storage mounted into each user pod. Values may contain `{username}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeConfig {
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
