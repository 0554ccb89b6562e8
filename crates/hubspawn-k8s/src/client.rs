// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::ClusterError;
use crate::types::{Pod, Service};

/// Trait for the cluster control-plane operations the spawner needs.
///
/// This abstraction allows for easy mocking in tests while keeping the
/// spawner independent of how the cluster is reached.
#[async_trait]
pub trait ClusterClient: Send + Sync {
	/// Submit a pod to the specified namespace.
	///
	/// Any non-success response, including a name conflict, is an error.
	async fn create_pod(&self, pod: Pod, namespace: &str) -> Result<Pod, ClusterError>;

	/// Get a pod by name.
	///
	/// Returns `Ok(None)` when the pod does not exist; every other failure is
	/// an error.
	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Option<Pod>, ClusterError>;

	/// Delete a pod by name without waiting for it to disappear.
	///
	/// Deleting an absent pod is rejected by the cluster and surfaces as an
	/// error with status 404 (see [`ClusterError::is_not_found`]).
	async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), ClusterError>;

	/// Get a service by name. An absent service is an error.
	async fn get_service(&self, name: &str, namespace: &str) -> Result<Service, ClusterError>;
}
