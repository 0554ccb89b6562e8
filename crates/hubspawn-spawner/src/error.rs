// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Spawner error types.

use std::time::Duration;

use hubspawn_k8s::{ClusterError, PodPhase};

/// Errors that can occur while starting, polling or stopping a user pod.
#[derive(Debug, thiserror::Error)]
pub enum SpawnerError {
	/// Cluster API error
	#[error(transparent)]
	Cluster(#[from] ClusterError),

	/// Pod reached a phase it cannot recover from
	#[error("Pod {pod_name} failed to launch (phase {phase}): {reason}")]
	PodLaunchFailed {
		pod_name: String,
		phase: PodPhase,
		reason: String,
	},

	/// Pod disappeared while waiting for it to run
	#[error("Pod {pod_name} disappeared while waiting for it to run")]
	PodVanished { pod_name: String },

	/// Pod did not reach the running phase in time
	#[error("Pod {pod_name} not running after {waited:?}")]
	LaunchTimeout { pod_name: String, waited: Duration },

	/// Running pod has no network address
	#[error("Pod {pod_name} is running but has no address")]
	PodAddressMissing { pod_name: String },

	/// Configured hub address source could not supply an address
	#[error("Hub address unavailable from {source_kind} {name}: {reason}")]
	HubAddressUnavailable {
		source_kind: &'static str,
		name: String,
		reason: String,
	},

	/// Hub API URL could not be rewritten
	#[error("Invalid hub API URL {url}: {message}")]
	InvalidHubUrl { url: String, message: String },
}

impl SpawnerError {
	/// Whether the cluster reported the pod gone.
	pub fn is_not_found(&self) -> bool {
		matches!(self, SpawnerError::Cluster(e) if e.is_not_found())
	}
}
