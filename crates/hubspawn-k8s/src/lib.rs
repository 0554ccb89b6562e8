// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster client abstraction for hubspawn pod provisioning.
//!
//! This crate provides:
//! - A trait-based cluster client abstraction for testability
//! - Production implementation using the kube crate
//! - Credential acquisition (basic auth, service account token, inferred)
//! - A scripted mock client for exercising callers without a cluster

mod client;
mod credentials;
mod error;
mod kube_client;
mod mock;
mod types;

pub use client::ClusterClient;
pub use credentials::{
	read_token_file, ClusterCredentials, ClusterSettings, SERVICE_ACCOUNT_TOKEN_PATH,
};
pub use error::ClusterError;
pub use kube_client::KubeClient;
pub use mock::MockClusterClient;
pub use types::{
	first_ingress_address, pod_ip, Container, ContainerPort, EnvVar, EnvVarSource,
	LoadBalancerIngress, LoadBalancerStatus, NFSVolumeSource, ObjectFieldSelector, ObjectMeta,
	PersistentVolumeClaimVolumeSource, Pod, PodPhase, PodSpec, PodStatus, Quantity,
	ResourceRequirements, Service, ServiceStatus, Volume, VolumeMount,
};
