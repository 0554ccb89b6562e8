// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::{env_bool, env_u16, env_u64, env_var, load_secret_env};
use crate::error::ConfigError;
use crate::layer::HubspawnConfigLayer;
use crate::sections::{
	ClusterConfigLayer, HubConfigLayer, LoggingConfigLayer, PodConfigLayer, SpawnConfigLayer,
	VolumeConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<HubspawnConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<HubspawnConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(HubspawnConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/hubspawn/hubspawn.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<HubspawnConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(HubspawnConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: HubspawnConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: HUBSPAWN_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<HubspawnConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(HubspawnConfigLayer {
			cluster: Some(load_cluster_from_env()?),
			pod: Some(load_pod_from_env()?),
			hub: Some(load_hub_from_env()),
			spawn: Some(load_spawn_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn load_cluster_from_env() -> Result<ClusterConfigLayer, ConfigError> {
	Ok(ClusterConfigLayer {
		host: env_var("HUBSPAWN_CLUSTER_HOST"),
		namespace: env_var("HUBSPAWN_CLUSTER_NAMESPACE"),
		username: env_var("HUBSPAWN_CLUSTER_USERNAME"),
		password: load_secret_env("HUBSPAWN_CLUSTER_PASSWORD")?,
		token_file: env_var("HUBSPAWN_CLUSTER_TOKEN_FILE").map(PathBuf::from),
		verify_ssl: env_bool("HUBSPAWN_CLUSTER_VERIFY_SSL")?,
	})
}

fn load_pod_from_env() -> Result<PodConfigLayer, ConfigError> {
	Ok(PodConfigLayer {
		name_prefix: env_var("HUBSPAWN_POD_NAME_PREFIX"),
		image: env_var("HUBSPAWN_POD_IMAGE"),
		port: env_u16("HUBSPAWN_POD_PORT")?,
		volume: Some(VolumeConfigLayer {
			claim_name: env_var("HUBSPAWN_POD_VOLUME_CLAIM"),
			mount_path: env_var("HUBSPAWN_POD_VOLUME_MOUNT_PATH"),
			nfs_server: env_var("HUBSPAWN_POD_VOLUME_NFS_SERVER"),
			nfs_path: env_var("HUBSPAWN_POD_VOLUME_NFS_PATH"),
		}),
	})
}

fn load_hub_from_env() -> HubConfigLayer {
	HubConfigLayer {
		ip: env_var("HUBSPAWN_HUB_IP"),
		ip_from_service: env_var("HUBSPAWN_HUB_IP_FROM_SERVICE"),
		ip_from_pod: env_var("HUBSPAWN_HUB_IP_FROM_POD"),
	}
}

fn load_spawn_from_env() -> Result<SpawnConfigLayer, ConfigError> {
	Ok(SpawnConfigLayer {
		poll_interval_secs: env_u64("HUBSPAWN_SPAWN_POLL_INTERVAL_SECS")?,
		start_timeout_secs: env_u64("HUBSPAWN_SPAWN_START_TIMEOUT_SECS")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("HUBSPAWN_LOG_LEVEL"),
	}
}
