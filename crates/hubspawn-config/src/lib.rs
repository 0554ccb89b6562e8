// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for hubspawn.
//!
//! Sources, lowest to highest precedence:
//! - Built-in defaults
//! - TOML file (`/etc/hubspawn/hubspawn.toml` or an explicit path)
//! - Environment variables (`HUBSPAWN_<SECTION>_<FIELD>`)
//!
//! ```ignore
//! use hubspawn_config::load_config;
//!
//! let config = load_config()?;
//! println!("spawning {} into {}", config.pod.image, config.cluster.namespace);
//! ```

mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::load_secret_env;
pub use error::ConfigError;
pub use layer::HubspawnConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved hubspawn configuration.
#[derive(Debug, Default)]
pub struct HubspawnConfig {
	pub cluster: ClusterConfig,
	pub pod: PodConfig,
	pub hub: HubConfig,
	pub spawn: SpawnConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
pub fn load_config() -> Result<HubspawnConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<HubspawnConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<HubspawnConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = HubspawnConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: HubspawnConfigLayer) -> Result<HubspawnConfig, ConfigError> {
	let cluster = layer.cluster.unwrap_or_default().resolve()?;
	let pod = layer.pod.unwrap_or_default().resolve()?;
	let hub = layer.hub.unwrap_or_default().finalize();
	let spawn = layer.spawn.unwrap_or_default().resolve()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		namespace = %cluster.namespace,
		cluster_host = cluster.host.as_deref().unwrap_or("inferred"),
		basic_auth = cluster.username.is_some(),
		image = %pod.image,
		port = pod.port,
		volume_configured = pod.volume.is_some(),
		hub_address = hub.source_name(),
		start_timeout_secs = spawn.start_timeout_secs,
		"Hubspawn configuration loaded"
	);

	Ok(HubspawnConfig {
		cluster,
		pod,
		hub,
		spawn,
		logging,
	})
}
