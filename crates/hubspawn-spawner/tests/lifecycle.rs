// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end lifecycle tests against the scripted cluster.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hubspawn_k8s::{MockClusterClient, PodPhase};
use hubspawn_spawner::{
	PodEndpoint, PollStatus, Spawner, SpawnerConfig, SpawnerError, UserSession,
};
use secrecy::SecretString;
use url::Url;

fn fast_config() -> SpawnerConfig {
	SpawnerConfig {
		poll_interval: Duration::from_millis(1),
		start_timeout: Duration::from_secs(5),
		..Default::default()
	}
}

fn session(user: &str) -> UserSession {
	UserSession::new(
		user,
		SecretString::from("api-token".to_string()),
		Url::parse("http://127.0.0.1:8081/hub/api").unwrap(),
	)
}

fn spawner(mock: &MockClusterClient, config: SpawnerConfig) -> Spawner {
	Spawner::new(Arc::new(mock.clone()), config)
}

#[tokio::test]
async fn start_creates_pod_and_waits_through_pending() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-alice_smith";
	mock.script_pod(
		name,
		vec![
			None,
			Some(MockClusterClient::pod(name, "Pending", None)),
			Some(MockClusterClient::pod(name, "Pending", None)),
			Some(MockClusterClient::pod(name, "Running", Some("10.4.0.17"))),
		],
	);
	let spawner = spawner(&mock, fast_config());
	let mut session = session("alice.smith");

	let endpoint = spawner.start(&mut session).await.unwrap();

	assert_eq!(
		endpoint,
		PodEndpoint {
			ip: "10.4.0.17".to_string(),
			port: 8888,
		}
	);
	assert_eq!(session.server.ip.as_deref(), Some("10.4.0.17"));
	assert_eq!(session.server.port, Some(8888));

	let created = mock.created_pods();
	assert_eq!(created.len(), 1);
	assert_eq!(created[0].metadata.name.as_deref(), Some(name));
	assert_eq!(mock.created_namespaces(), vec!["default"]);
	// existence check, then Pending, Pending, Running
	assert_eq!(mock.get_pod_calls().len(), 4);
}

#[tokio::test]
async fn start_reuses_running_pod_without_creating() {
	let mock = MockClusterClient::new();
	mock.script_pod(
		"jupyterhub-bob",
		vec![Some(MockClusterClient::pod(
			"jupyterhub-bob",
			"Running",
			Some("10.4.0.2"),
		))],
	);
	let spawner = spawner(&mock, fast_config());

	let endpoint = spawner.start(&mut session("bob")).await.unwrap();

	assert_eq!(endpoint.ip, "10.4.0.2");
	assert_eq!(endpoint.port, 8888);
	assert!(mock.created_pods().is_empty());
	assert_eq!(mock.get_pod_calls().len(), 1);
}

#[tokio::test]
async fn start_awaits_existing_pending_pod() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-carol";
	mock.script_pod(
		name,
		vec![
			Some(MockClusterClient::pod(name, "Pending", None)),
			Some(MockClusterClient::pod(name, "Running", Some("10.4.0.3"))),
		],
	);
	let spawner = spawner(&mock, fast_config());

	let endpoint = spawner.start(&mut session("carol")).await.unwrap();

	assert_eq!(endpoint.ip, "10.4.0.3");
	assert!(mock.created_pods().is_empty());
}

#[tokio::test]
async fn colliding_user_adopts_existing_pod() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-alice_smith";
	let mut existing = MockClusterClient::pod(name, "Running", Some("10.4.0.30"));
	existing.metadata.annotations = Some(BTreeMap::from([(
		"hubspawn.io/username".to_string(),
		"alice.smith".to_string(),
	)]));
	mock.script_pod(name, vec![Some(existing)]);
	let spawner = spawner(&mock, fast_config());

	let mut session = session("alice@smith");
	let endpoint = spawner.start(&mut session).await.unwrap();

	assert_eq!(
		endpoint,
		PodEndpoint {
			ip: "10.4.0.30".to_string(),
			port: 8888,
		}
	);
	assert!(mock.created_pods().is_empty());
	assert_eq!(mock.get_pod_calls(), vec![name]);
	assert_eq!(session.server.ip.as_deref(), Some("10.4.0.30"));
}

#[tokio::test]
async fn failed_phase_during_wait_stops_polling() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-dave";
	mock.script_pod(
		name,
		vec![
			None,
			Some(MockClusterClient::pod(name, "Pending", None)),
			Some(MockClusterClient::pod(name, "Failed", None)),
		],
	);
	let spawner = spawner(&mock, fast_config());

	let err = spawner.start(&mut session("dave")).await.unwrap_err();

	assert!(matches!(
		err,
		SpawnerError::PodLaunchFailed {
			phase: PodPhase::Failed,
			..
		}
	));
	assert_eq!(mock.get_pod_calls().len(), 3);
}

#[tokio::test]
async fn unknown_phase_during_wait_is_fatal() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-erin";
	mock.script_pod(
		name,
		vec![None, Some(MockClusterClient::pod(name, "Unknown", None))],
	);
	let spawner = spawner(&mock, fast_config());

	let err = spawner.start(&mut session("erin")).await.unwrap_err();

	assert!(matches!(
		err,
		SpawnerError::PodLaunchFailed {
			phase: PodPhase::Unknown,
			..
		}
	));
}

#[tokio::test]
async fn pod_vanishing_during_wait_is_reported() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-frank";
	mock.script_pod(
		name,
		vec![
			None,
			Some(MockClusterClient::pod(name, "Pending", None)),
			None,
		],
	);
	let spawner = spawner(&mock, fast_config());

	let err = spawner.start(&mut session("frank")).await.unwrap_err();

	assert!(matches!(err, SpawnerError::PodVanished { .. }));
}

#[tokio::test]
async fn wait_is_bounded_by_start_timeout() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-grace";
	mock.script_pod(
		name,
		vec![None, Some(MockClusterClient::pod(name, "Pending", None))],
	);
	let config = SpawnerConfig {
		poll_interval: Duration::from_millis(5),
		start_timeout: Duration::from_millis(30),
		..Default::default()
	};
	let spawner = spawner(&mock, config);

	let err = spawner.start(&mut session("grace")).await.unwrap_err();

	match err {
		SpawnerError::LaunchTimeout { waited, .. } => {
			assert!(waited >= Duration::from_millis(30))
		}
		other => panic!("unexpected error: {other:?}"),
	}
	assert!(mock.get_pod_calls().len() > 2);
}

#[tokio::test]
async fn pod_running_at_deadline_is_accepted() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-judy";
	mock.script_pod(
		name,
		vec![
			None,
			Some(MockClusterClient::pod(name, "Pending", None)),
			Some(MockClusterClient::pod(name, "Running", Some("10.4.0.21"))),
		],
	);
	// The only sleep is cut short at the deadline, after which the pod is
	// observed once more.
	let config = SpawnerConfig {
		poll_interval: Duration::from_millis(200),
		start_timeout: Duration::from_millis(30),
		..Default::default()
	};
	let spawner = spawner(&mock, config);

	let endpoint = spawner.start(&mut session("judy")).await.unwrap();

	assert_eq!(endpoint.ip, "10.4.0.21");
	assert_eq!(mock.get_pod_calls().len(), 3);
}

#[tokio::test]
async fn creation_conflict_propagates() {
	let mock = MockClusterClient::new();
	mock.fail_create("pods \"jupyterhub-heidi\" already exists");
	let spawner = spawner(&mock, fast_config());

	let err = spawner.start(&mut session("heidi")).await.unwrap_err();

	assert!(matches!(err, SpawnerError::Cluster(_)));
	assert!(!err.is_not_found());
}

#[tokio::test]
async fn poll_reports_alive_after_start_and_restart_after_stop() {
	let mock = MockClusterClient::new();
	let name = "jupyterhub-ivan";
	mock.script_pod(
		name,
		vec![
			None,
			Some(MockClusterClient::pod(name, "Running", Some("10.4.0.9"))),
		],
	);
	let spawner = spawner(&mock, fast_config());

	spawner.start(&mut session("ivan")).await.unwrap();
	assert_eq!(spawner.poll("ivan").await.unwrap(), PollStatus::Alive);

	spawner.stop("ivan").await.unwrap();
	assert_eq!(mock.deleted_pods(), vec![name]);
	assert_eq!(spawner.poll("ivan").await.unwrap(), PollStatus::NeedsRestart);
}

#[tokio::test]
async fn poll_needs_restart_when_not_running() {
	let mock = MockClusterClient::new();
	mock.script_pod(
		"jupyterhub-judy",
		vec![Some(MockClusterClient::pod("jupyterhub-judy", "Succeeded", None))],
	);
	let spawner = spawner(&mock, fast_config());

	assert_eq!(spawner.poll("judy").await.unwrap(), PollStatus::NeedsRestart);
	assert_eq!(spawner.poll("nobody").await.unwrap(), PollStatus::NeedsRestart);
}

#[tokio::test]
async fn stop_on_absent_pod_is_a_cluster_error() {
	let mock = MockClusterClient::new();
	let spawner = spawner(&mock, fast_config());

	let err = spawner.stop("mallory").await.unwrap_err();

	assert!(matches!(err, SpawnerError::Cluster(_)));
	assert!(err.is_not_found());
	assert_eq!(mock.deleted_pods(), vec!["jupyterhub-mallory"]);
}

#[tokio::test]
async fn users_are_independent() {
	let mock = MockClusterClient::new();
	for (name, ip) in [("jupyterhub-oscar", "10.4.1.1"), ("jupyterhub-peggy", "10.4.1.2")] {
		mock.script_pod(
			name,
			vec![None, Some(MockClusterClient::pod(name, "Running", Some(ip)))],
		);
	}
	let spawner = Arc::new(spawner(&mock, fast_config()));

	let (a, b) = tokio::join!(
		{
			let spawner = Arc::clone(&spawner);
			async move { spawner.start(&mut session("oscar")).await }
		},
		{
			let spawner = Arc::clone(&spawner);
			async move { spawner.start(&mut session("peggy")).await }
		}
	);

	assert_eq!(a.unwrap().ip, "10.4.1.1");
	assert_eq!(b.unwrap().ip, "10.4.1.2");
	assert_eq!(mock.created_pods().len(), 2);
}
