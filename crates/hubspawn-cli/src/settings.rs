// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mapping from loaded configuration to cluster and spawner settings.

use hubspawn_config::{ClusterConfig, HubConfig, HubspawnConfig, PodConfig, SpawnConfig, VolumeConfig};
use hubspawn_k8s::{ClusterCredentials, ClusterSettings};
use hubspawn_spawner::{HubAddressOverrides, SpawnerConfig, VolumeRef};

/// Credentials follow what is configured: basic auth when a username and
/// password are present, the service account token when only a host is
/// given, otherwise whatever the environment provides.
pub fn cluster_settings(cluster: ClusterConfig) -> ClusterSettings {
	let credentials = match (cluster.username, cluster.password, &cluster.host) {
		(Some(username), Some(password), _) => ClusterCredentials::Basic { username, password },
		(_, _, Some(_)) => ClusterCredentials::ServiceAccountToken {
			token_file: cluster.token_file,
		},
		_ => ClusterCredentials::Inferred,
	};

	ClusterSettings {
		host: cluster.host,
		credentials,
		verify_ssl: cluster.verify_ssl,
	}
}

pub fn spawner_config(
	namespace: String,
	pod: PodConfig,
	hub: HubConfig,
	spawn: &SpawnConfig,
) -> SpawnerConfig {
	SpawnerConfig {
		namespace,
		pod_name_prefix: pod.name_prefix,
		image: pod.image,
		port: pod.port,
		volume: pod.volume.map(volume_ref),
		hub_address: HubAddressOverrides {
			ip: hub.ip,
			service: hub.ip_from_service,
			pod: hub.ip_from_pod,
		},
		poll_interval: spawn.poll_interval(),
		start_timeout: spawn.start_timeout(),
	}
}

fn volume_ref(volume: VolumeConfig) -> VolumeRef {
	match volume {
		VolumeConfig::PersistentClaim {
			claim_name,
			mount_path,
		} => VolumeRef::PersistentClaim {
			claim_name,
			mount_path,
		},
		VolumeConfig::Nfs {
			server,
			path,
			mount_path,
		} => VolumeRef::Nfs {
			server,
			path,
			mount_path,
		},
	}
}

/// Split a loaded configuration into what the cluster client and the
/// spawner need.
pub fn split(config: HubspawnConfig) -> (ClusterSettings, SpawnerConfig) {
	let namespace = config.cluster.namespace.clone();
	let spawner = spawner_config(namespace, config.pod, config.hub, &config.spawn);
	(cluster_settings(config.cluster), spawner)
}
