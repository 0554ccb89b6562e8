// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Construction of the pod submitted for a user's notebook server.

use std::collections::BTreeMap;

use hubspawn_k8s::{
	Container, ContainerPort, EnvVar, EnvVarSource, NFSVolumeSource, ObjectFieldSelector,
	ObjectMeta, PersistentVolumeClaimVolumeSource, Pod, PodSpec, Quantity, ResourceRequirements,
	Volume, VolumeMount,
};

use crate::config::VolumeRef;

pub const CONTAINER_NAME: &str = "notebook";
pub const VOLUME_NAME: &str = "user-storage";
pub const NAME_LABEL: &str = "name";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "hubspawn";
pub const USERNAME_ANNOTATION: &str = "hubspawn.io/username";
pub const POD_IP_ENV: &str = "POD_IP";
const POD_IP_FIELD: &str = "status.podIP";
const DEFAULT_CPU: &str = "250m";
const DEFAULT_MEMORY: &str = "1Gi";
const MAX_LABEL_LENGTH: usize = 63;

fn is_label_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Value of the `name` label for a pod.
///
/// Equal to the pod name unless the name is longer than the 63-character
/// label limit or starts or ends with a non-alphanumeric character. In those
/// cases the label is the longest valid value derived from it and no longer
/// matches the pod name exactly; look pods up by name, not by this label.
fn name_label_value(pod_name: &str) -> String {
	let mapped: String = pod_name
		.chars()
		.map(|c| if is_label_char(c) { c } else { '_' })
		.collect();

	let mut value = mapped.trim_matches(|c: char| !c.is_ascii_alphanumeric());
	if value.len() > MAX_LABEL_LENGTH {
		value = value[..MAX_LABEL_LENGTH].trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
	}
	value.to_string()
}

/// Build the pod specification for one user's notebook server.
///
/// Pure: identical inputs always produce identical pods. The `POD_IP`
/// variable is always first and is resolved by the cluster from the pod's
/// own status; `env` follows in key order.
pub fn build_pod_spec(
	name: &str,
	image: &str,
	port: u16,
	env: &BTreeMap<String, String>,
	volume: Option<&VolumeRef>,
) -> Pod {
	let mut labels = BTreeMap::new();
	labels.insert(NAME_LABEL.to_string(), name_label_value(name));
	labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

	let mount = volume.map(|v| VolumeMount {
		name: VOLUME_NAME.to_string(),
		mount_path: v.mount_path().to_string(),
		..Default::default()
	});

	Pod {
		metadata: ObjectMeta {
			name: Some(name.to_string()),
			labels: Some(labels),
			..Default::default()
		},
		spec: Some(PodSpec {
			containers: vec![build_container(image, port, env, mount)],
			volumes: volume.map(|v| vec![build_volume(v)]),
			..Default::default()
		}),
		status: None,
	}
}

fn build_container(
	image: &str,
	port: u16,
	env: &BTreeMap<String, String>,
	mount: Option<VolumeMount>,
) -> Container {
	let mut env_vars = Vec::with_capacity(env.len() + 1);
	env_vars.push(EnvVar {
		name: POD_IP_ENV.to_string(),
		value: None,
		value_from: Some(EnvVarSource {
			field_ref: Some(ObjectFieldSelector {
				field_path: POD_IP_FIELD.to_string(),
				..Default::default()
			}),
			..Default::default()
		}),
	});
	env_vars.extend(env.iter().map(|(k, v)| EnvVar {
		name: k.clone(),
		value: Some(v.clone()),
		value_from: None,
	}));

	let mut resources = BTreeMap::new();
	resources.insert("cpu".to_string(), Quantity(DEFAULT_CPU.to_string()));
	resources.insert("memory".to_string(), Quantity(DEFAULT_MEMORY.to_string()));

	Container {
		name: CONTAINER_NAME.to_string(),
		image: Some(image.to_string()),
		ports: Some(vec![ContainerPort {
			container_port: i32::from(port),
			..Default::default()
		}]),
		env: Some(env_vars),
		resources: Some(ResourceRequirements {
			requests: Some(resources.clone()),
			limits: Some(resources),
			..Default::default()
		}),
		volume_mounts: mount.map(|m| vec![m]),
		..Default::default()
	}
}

fn build_volume(volume: &VolumeRef) -> Volume {
	match volume {
		VolumeRef::PersistentClaim { claim_name, .. } => Volume {
			name: VOLUME_NAME.to_string(),
			persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
				claim_name: claim_name.clone(),
				read_only: None,
			}),
			..Default::default()
		},
		VolumeRef::Nfs { server, path, .. } => Volume {
			name: VOLUME_NAME.to_string(),
			nfs: Some(NFSVolumeSource {
				server: server.clone(),
				path: path.clone(),
				read_only: None,
			}),
			..Default::default()
		},
	}
}
