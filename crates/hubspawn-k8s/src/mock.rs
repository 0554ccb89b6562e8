// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Scripted in-memory cluster for tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::ClusterClient;
use crate::error::ClusterError;
use crate::types::{
	LoadBalancerIngress, LoadBalancerStatus, ObjectMeta, Pod, PodStatus, Service, ServiceStatus,
};

/// A mock cluster client that can be used for testing the spawner.
///
/// `get_pod` answers from a per-name script of observations: each call
/// consumes the front entry, and the last entry repeats forever. Every call is
/// recorded so tests can assert on what was (not) submitted.
#[derive(Debug, Clone, Default)]
pub struct MockClusterClient {
	state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
	pods: HashMap<String, VecDeque<Option<Pod>>>,
	services: HashMap<String, Service>,
	get_pod_error: Option<String>,
	create_error: Option<String>,
	created: Vec<(String, Pod)>,
	deleted: Vec<String>,
	get_pod_calls: Vec<String>,
	get_service_calls: Vec<String>,
}

impl MockClusterClient {
	/// Create a new mock with an empty cluster.
	pub fn new() -> Self {
		Self::default()
	}

	/// Script the observations returned by successive `get_pod` calls for `name`.
	///
	/// `None` means "not found". The final observation repeats.
	pub fn script_pod(&self, name: &str, observations: Vec<Option<Pod>>) {
		self
			.state
			.lock()
			.unwrap()
			.pods
			.insert(name.to_string(), observations.into());
	}

	/// Register a service returned by `get_service`.
	pub fn add_service(&self, name: &str, service: Service) {
		self
			.state
			.lock()
			.unwrap()
			.services
			.insert(name.to_string(), service);
	}

	/// Make every subsequent `get_pod` call fail with a transport error.
	pub fn fail_get_pod(&self, message: &str) {
		self.state.lock().unwrap().get_pod_error = Some(message.to_string());
	}

	/// Make every subsequent `create_pod` call fail with a conflict.
	pub fn fail_create(&self, message: &str) {
		self.state.lock().unwrap().create_error = Some(message.to_string());
	}

	/// Pods submitted through `create_pod`, in order.
	pub fn created_pods(&self) -> Vec<Pod> {
		self
			.state
			.lock()
			.unwrap()
			.created
			.iter()
			.map(|(_, pod)| pod.clone())
			.collect()
	}

	/// Namespaces `create_pod` was called with, in order.
	pub fn created_namespaces(&self) -> Vec<String> {
		self
			.state
			.lock()
			.unwrap()
			.created
			.iter()
			.map(|(ns, _)| ns.clone())
			.collect()
	}

	/// Names passed to `delete_pod`, in order, including rejected ones.
	pub fn deleted_pods(&self) -> Vec<String> {
		self.state.lock().unwrap().deleted.clone()
	}

	/// Names passed to `get_pod`, in order.
	pub fn get_pod_calls(&self) -> Vec<String> {
		self.state.lock().unwrap().get_pod_calls.clone()
	}

	/// Names passed to `get_service`, in order.
	pub fn get_service_calls(&self) -> Vec<String> {
		self.state.lock().unwrap().get_service_calls.clone()
	}

	/// Build an observed pod with the given phase and address.
	pub fn pod(name: &str, phase: &str, pod_ip: Option<&str>) -> Pod {
		let mut labels = BTreeMap::new();
		labels.insert("name".to_string(), name.to_string());
		Pod {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				labels: Some(labels),
				..Default::default()
			},
			spec: None,
			status: Some(PodStatus {
				phase: Some(phase.to_string()),
				pod_ip: pod_ip.map(str::to_string),
				..Default::default()
			}),
		}
	}

	/// Build a service whose load balancer has a single ingress IP.
	pub fn load_balancer_service(name: &str, ingress_ip: &str) -> Service {
		Service {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				..Default::default()
			},
			spec: None,
			status: Some(ServiceStatus {
				load_balancer: Some(LoadBalancerStatus {
					ingress: Some(vec![LoadBalancerIngress {
						ip: Some(ingress_ip.to_string()),
						..Default::default()
					}]),
				}),
				..Default::default()
			}),
		}
	}

	fn not_found(kind: &str, name: &str) -> ClusterError {
		ClusterError::Api {
			code: Some(404),
			message: format!("{kind} \"{name}\" not found"),
		}
	}
}

#[async_trait]
impl ClusterClient for MockClusterClient {
	async fn create_pod(&self, pod: Pod, namespace: &str) -> Result<Pod, ClusterError> {
		let mut state = self.state.lock().unwrap();
		if let Some(message) = &state.create_error {
			return Err(ClusterError::Api {
				code: Some(409),
				message: message.clone(),
			});
		}
		state.created.push((namespace.to_string(), pod.clone()));
		Ok(pod)
	}

	async fn get_pod(&self, name: &str, _namespace: &str) -> Result<Option<Pod>, ClusterError> {
		let mut state = self.state.lock().unwrap();
		state.get_pod_calls.push(name.to_string());
		if let Some(message) = &state.get_pod_error {
			return Err(ClusterError::Api {
				code: None,
				message: message.clone(),
			});
		}

		let Some(script) = state.pods.get_mut(name) else {
			return Ok(None);
		};
		let observation = if script.len() > 1 {
			script.pop_front().flatten()
		} else {
			script.front().cloned().flatten()
		};
		Ok(observation)
	}

	async fn delete_pod(&self, name: &str, _namespace: &str) -> Result<(), ClusterError> {
		let mut state = self.state.lock().unwrap();
		state.deleted.push(name.to_string());

		let exists = state
			.pods
			.get(name)
			.and_then(|script| script.front())
			.is_some_and(|pod| pod.is_some());
		if !exists {
			return Err(Self::not_found("pods", name));
		}

		state
			.pods
			.insert(name.to_string(), VecDeque::from(vec![None]));
		Ok(())
	}

	async fn get_service(&self, name: &str, _namespace: &str) -> Result<Service, ClusterError> {
		let mut state = self.state.lock().unwrap();
		state.get_service_calls.push(name.to_string());
		state
			.services
			.get(name)
			.cloned()
			.ok_or_else(|| Self::not_found("services", name))
	}
}
