// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

pub use k8s_openapi::api::core::v1::{
	Container, ContainerPort, EnvVar, EnvVarSource, LoadBalancerIngress, LoadBalancerStatus,
	NFSVolumeSource, ObjectFieldSelector, PersistentVolumeClaimVolumeSource, Pod, PodSpec,
	PodStatus, ResourceRequirements, Service, ServiceStatus, Volume, VolumeMount,
};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Coarse lifecycle status the cluster reports for a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodPhase {
	Pending,
	Running,
	Succeeded,
	Failed,
	Unknown,
}

impl PodPhase {
	/// Phase of an observed pod, or `None` while the cluster has not reported
	/// one yet. Unrecognised phases are `Unknown`.
	pub fn of(pod: &Pod) -> Option<Self> {
		pod
			.status
			.as_ref()
			.and_then(|s| s.phase.as_deref())
			.map(Self::parse)
	}

	/// Whether the pod can no longer become `Running` on its own.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			PodPhase::Succeeded | PodPhase::Failed | PodPhase::Unknown
		)
	}

	pub fn parse(phase: &str) -> Self {
		match phase {
			"Pending" => PodPhase::Pending,
			"Running" => PodPhase::Running,
			"Succeeded" => PodPhase::Succeeded,
			"Failed" => PodPhase::Failed,
			_ => PodPhase::Unknown,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			PodPhase::Pending => "Pending",
			PodPhase::Running => "Running",
			PodPhase::Succeeded => "Succeeded",
			PodPhase::Failed => "Failed",
			PodPhase::Unknown => "Unknown",
		}
	}
}

impl fmt::Display for PodPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Network address the cluster assigned to a pod, if any.
pub fn pod_ip(pod: &Pod) -> Option<&str> {
	pod
		.status
		.as_ref()
		.and_then(|s| s.pod_ip.as_deref())
		.filter(|ip| !ip.is_empty())
}

/// First load-balancer ingress address of a service.
///
/// Prefers the ingress IP and falls back to its hostname, which is what cloud
/// load balancers populate.
pub fn first_ingress_address(service: &Service) -> Option<&str> {
	let ingress = service
		.status
		.as_ref()?
		.load_balancer
		.as_ref()?
		.ingress
		.as_ref()?
		.first()?;

	ingress
		.ip
		.as_deref()
		.filter(|ip| !ip.is_empty())
		.or_else(|| ingress.hostname.as_deref().filter(|h| !h.is_empty()))
}
