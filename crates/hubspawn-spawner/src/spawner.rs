// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core spawner implementation for per-user pod lifecycle management.

use std::collections::BTreeMap;
use std::sync::Arc;

use hubspawn_k8s::{pod_ip, ClusterClient, Pod, PodPhase};
use secrecy::ExposeSecret;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::SpawnerConfig;
use crate::error::SpawnerError;
use crate::escape::{escape_username, pod_name};
use crate::hub_address::resolve_hub_api_url;
use crate::pod_spec::{build_pod_spec, USERNAME_ANNOTATION};
use crate::session::{PodEndpoint, PollStatus, UserSession};

pub const ENV_API_TOKEN: &str = "JPY_API_TOKEN";
pub const ENV_USER: &str = "JPY_USER";
pub const ENV_COOKIE_NAME: &str = "JPY_COOKIE_NAME";
pub const ENV_BASE_URL: &str = "JPY_BASE_URL";
pub const ENV_HUB_PREFIX: &str = "JPY_HUB_PREFIX";
pub const ENV_HUB_API_URL: &str = "JPY_HUB_API_URL";

/// Starts, polls and stops one notebook pod per user.
///
/// Holds no per-user state; every decision is made from what the cluster
/// reports, so one spawner can serve many users concurrently.
pub struct Spawner {
	client: Arc<dyn ClusterClient>,
	config: SpawnerConfig,
}

impl Spawner {
	/// Create a new spawner with the given cluster client and configuration.
	pub fn new(client: Arc<dyn ClusterClient>, config: SpawnerConfig) -> Self {
		Self { client, config }
	}

	/// Cluster name of the pod serving `username`.
	pub fn pod_name(&self, username: &str) -> String {
		pod_name(&self.config.pod_name_prefix, username)
	}

	/// Ensure the user's pod exists and is running, then record its address.
	///
	/// An existing pod is reused rather than resubmitted. On success the
	/// session's server record carries the pod IP and container port.
	#[instrument(skip(self, session), fields(user = %session.username))]
	pub async fn start(&self, session: &mut UserSession) -> Result<PodEndpoint, SpawnerError> {
		let pod_name = self.pod_name(&session.username);
		let namespace = &self.config.namespace;

		let observed = match self.client.get_pod(&pod_name, namespace).await? {
			Some(existing) => {
				debug!(pod_name = %pod_name, phase = ?PodPhase::of(&existing), "Reusing existing pod");
				warn_on_owner_mismatch(&existing, &pod_name, &session.username);
				Some(existing)
			}
			None => {
				let env = self.collect_env_vars(session).await?;
				let pod = self.pod_for(&pod_name, &session.username, &env);
				info!(
					pod_name = %pod_name,
					namespace = %namespace,
					image = %self.config.image,
					"Creating user pod"
				);
				self.client.create_pod(pod, namespace).await?;
				None
			}
		};

		let pod = match observed {
			Some(pod) if PodPhase::of(&pod) == Some(PodPhase::Running) => pod,
			Some(pod) => {
				check_not_terminal(&pod_name, &pod)?;
				self.wait_for_running(&pod_name).await?
			}
			None => self.wait_for_running(&pod_name).await?,
		};

		let ip = pod_ip(&pod)
			.ok_or_else(|| SpawnerError::PodAddressMissing {
				pod_name: pod_name.clone(),
			})?
			.to_string();
		let port = self.config.port;

		session.server.ip = Some(ip.clone());
		session.server.port = Some(port);
		info!(pod_name = %pod_name, ip = %ip, port, "User pod running");

		Ok(PodEndpoint { ip, port })
	}

	/// Report whether the user's pod is still serving.
	///
	/// Absence is the normal "needs restart" answer, never an error.
	#[instrument(skip(self))]
	pub async fn poll(&self, username: &str) -> Result<PollStatus, SpawnerError> {
		let pod_name = self.pod_name(username);
		let status = match self.client.get_pod(&pod_name, &self.config.namespace).await? {
			Some(pod) if PodPhase::of(&pod) == Some(PodPhase::Running) => PollStatus::Alive,
			Some(pod) => {
				debug!(pod_name = %pod_name, phase = ?PodPhase::of(&pod), "Pod not running");
				PollStatus::NeedsRestart
			}
			None => {
				debug!(pod_name = %pod_name, "Pod not found");
				PollStatus::NeedsRestart
			}
		};
		Ok(status)
	}

	/// Request deletion of the user's pod without waiting for it to go away.
	///
	/// Deleting an absent pod is a cluster error; check
	/// [`SpawnerError::is_not_found`] to tolerate it.
	#[instrument(skip(self))]
	pub async fn stop(&self, username: &str) -> Result<(), SpawnerError> {
		let pod_name = self.pod_name(username);
		self
			.client
			.delete_pod(&pod_name, &self.config.namespace)
			.await?;
		info!(pod_name = %pod_name, "Deleted user pod");
		Ok(())
	}

	/// Environment handed to the notebook server so it can find the hub.
	pub async fn collect_env_vars(
		&self,
		session: &UserSession,
	) -> Result<BTreeMap<String, String>, SpawnerError> {
		let hub_api_url = resolve_hub_api_url(
			self.client.as_ref(),
			&self.config.namespace,
			&self.config.hub_address,
			&session.hub.api_url,
		)
		.await?;

		let mut env = BTreeMap::new();
		env.insert(
			ENV_API_TOKEN.to_string(),
			session.api_token.expose_secret().to_string(),
		);
		env.insert(ENV_USER.to_string(), session.username.clone());
		env.insert(ENV_COOKIE_NAME.to_string(), session.server.cookie_name.clone());
		env.insert(ENV_BASE_URL.to_string(), session.server.base_url.clone());
		env.insert(ENV_HUB_PREFIX.to_string(), session.hub.base_url.clone());
		env.insert(ENV_HUB_API_URL.to_string(), hub_api_url.to_string());
		Ok(env)
	}

	fn pod_for(&self, pod_name: &str, username: &str, env: &BTreeMap<String, String>) -> Pod {
		let volume = self
			.config
			.volume
			.as_ref()
			.map(|v| v.for_user(&escape_username(username)));
		let mut pod = build_pod_spec(
			pod_name,
			&self.config.image,
			self.config.port,
			env,
			volume.as_ref(),
		);

		let mut annotations = BTreeMap::new();
		annotations.insert(USERNAME_ANNOTATION.to_string(), username.to_string());
		pod.metadata.annotations = Some(annotations);
		pod
	}

	/// Poll until the pod runs, fails, disappears or the start timeout passes.
	///
	/// The last sleep ends at the deadline and is followed by one final
	/// observation before giving up.
	async fn wait_for_running(&self, pod_name: &str) -> Result<Pod, SpawnerError> {
		let start = Instant::now();
		let deadline = start + self.config.start_timeout;

		loop {
			let pod = self
				.client
				.get_pod(pod_name, &self.config.namespace)
				.await?
				.ok_or_else(|| SpawnerError::PodVanished {
					pod_name: pod_name.to_string(),
				})?;

			let phase = PodPhase::of(&pod);
			if phase == Some(PodPhase::Running) {
				return Ok(pod);
			}
			check_not_terminal(pod_name, &pod)?;

			let now = Instant::now();
			if now >= deadline {
				return Err(SpawnerError::LaunchTimeout {
					pod_name: pod_name.to_string(),
					waited: now - start,
				});
			}

			debug!(pod_name = %pod_name, phase = ?phase, "Waiting for pod to run");
			tokio::time::sleep(self.config.poll_interval.min(deadline - now)).await;
		}
	}
}

/// Fail for phases a pod cannot leave on its own.
fn check_not_terminal(pod_name: &str, pod: &Pod) -> Result<(), SpawnerError> {
	match PodPhase::of(pod) {
		Some(phase) if phase.is_terminal() => {
			let reason = pod
				.status
				.as_ref()
				.and_then(|s| s.message.clone().or_else(|| s.reason.clone()))
				.unwrap_or_else(|| format!("pod reported phase {phase}"));
			warn!(pod_name = %pod_name, phase = %phase, reason = %reason, "User pod failed");
			Err(SpawnerError::PodLaunchFailed {
				pod_name: pod_name.to_string(),
				phase,
				reason,
			})
		}
		_ => Ok(()),
	}
}

fn warn_on_owner_mismatch(pod: &Pod, pod_name: &str, username: &str) {
	let owner = pod
		.metadata
		.annotations
		.as_ref()
		.and_then(|a| a.get(USERNAME_ANNOTATION));
	if let Some(owner) = owner {
		if owner != username {
			warn!(
				pod_name = %pod_name,
				owner = %owner,
				user = %username,
				"Reusing pod created for a different user whose name escapes identically"
			);
		}
	}
}
