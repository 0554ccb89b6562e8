// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform-side session records read and updated by the spawner.

use std::fmt;

use secrecy::SecretString;
use url::Url;

/// Everything the platform knows about one user's notebook session.
#[derive(Debug)]
pub struct UserSession {
	/// Raw platform username, before escaping
	pub username: String,
	/// Token the notebook server uses to authenticate to the hub API
	pub api_token: SecretString,
	pub server: ServerRecord,
	pub hub: HubRecord,
}

/// The user's notebook server as recorded by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
	pub cookie_name: String,
	pub base_url: String,
	/// Set by a successful start
	pub ip: Option<String>,
	/// Set by a successful start
	pub port: Option<u16>,
}

/// How the hub itself is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubRecord {
	/// Path prefix the hub is served under
	pub base_url: String,
	/// Default hub API URL; its host may be replaced per cluster
	pub api_url: Url,
}

impl UserSession {
	/// Session with JupyterHub's conventional cookie name and URL layout.
	pub fn new(username: impl Into<String>, api_token: SecretString, hub_api_url: Url) -> Self {
		let username = username.into();
		Self {
			server: ServerRecord {
				cookie_name: format!("jupyter-hub-token-{username}"),
				base_url: format!("/user/{username}/"),
				ip: None,
				port: None,
			},
			hub: HubRecord {
				base_url: "/hub/".to_string(),
				api_url: hub_api_url,
			},
			username,
			api_token,
		}
	}
}

/// Where a started notebook server can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodEndpoint {
	pub ip: String,
	pub port: u16,
}

impl fmt::Display for PodEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.ip.parse::<std::net::Ipv6Addr>() {
			Ok(_) => write!(f, "[{}]:{}", self.ip, self.port),
			Err(_) => write!(f, "{}:{}", self.ip, self.port),
		}
	}
}

/// Outcome of a liveness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
	/// Pod exists and is running
	Alive,
	/// Pod is absent or not running; the platform should start it again
	NeedsRestart,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_session_uses_hub_conventions() {
		let session = UserSession::new(
			"alice.smith",
			SecretString::from("tok".to_string()),
			Url::parse("http://127.0.0.1:8081/hub/api").unwrap(),
		);
		assert_eq!(session.server.cookie_name, "jupyter-hub-token-alice.smith");
		assert_eq!(session.server.base_url, "/user/alice.smith/");
		assert_eq!(session.hub.base_url, "/hub/");
		assert!(session.server.ip.is_none());
		assert!(session.server.port.is_none());
	}

	#[test]
	fn debug_hides_api_token() {
		let session = UserSession::new(
			"bob",
			SecretString::from("super-secret-token".to_string()),
			Url::parse("http://hub:8081/hub/api").unwrap(),
		);
		assert!(!format!("{session:?}").contains("super-secret-token"));
	}

	#[test]
	fn endpoint_display_brackets_ipv6() {
		let v4 = PodEndpoint {
			ip: "10.1.2.3".to_string(),
			port: 8888,
		};
		let v6 = PodEndpoint {
			ip: "fd00::5".to_string(),
			port: 8888,
		};
		assert_eq!(v4.to_string(), "10.1.2.3:8888");
		assert_eq!(v6.to_string(), "[fd00::5]:8888");
	}
}
