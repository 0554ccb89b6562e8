// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cluster connection configuration section.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const DEFAULT_NAMESPACE: &str = "default";

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Cluster configuration layer (for merging).
#[derive(Debug, Default, Deserialize)]
pub struct ClusterConfigLayer {
	pub host: Option<String>,
	pub namespace: Option<String>,
	pub username: Option<String>,
	#[serde(default, deserialize_with = "deserialize_secret")]
	pub password: Option<SecretString>,
	pub token_file: Option<PathBuf>,
	pub verify_ssl: Option<bool>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.token_file.is_some() {
			self.token_file = other.token_file;
		}
		if other.verify_ssl.is_some() {
			self.verify_ssl = other.verify_ssl;
		}
	}

	pub fn resolve(self) -> Result<ClusterConfig, ConfigError> {
		if let Some(host) = &self.host {
			let url = Url::parse(host).map_err(|e| {
				ConfigError::Validation(format!("cluster.host '{host}' is not a valid URL: {e}"))
			})?;
			if !url.has_host() {
				return Err(ConfigError::Validation(format!(
					"cluster.host '{host}' has no host component"
				)));
			}
		}

		match (&self.username, &self.password) {
			(Some(_), None) => {
				return Err(ConfigError::Validation(
					"cluster.username is set without cluster.password".to_string(),
				))
			}
			(None, Some(_)) => {
				return Err(ConfigError::Validation(
					"cluster.password is set without cluster.username".to_string(),
				))
			}
			_ => {}
		}

		Ok(ClusterConfig {
			host: self.host,
			namespace: self
				.namespace
				.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
			username: self.username,
			password: self.password,
			token_file: self
				.token_file
				.unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
			verify_ssl: self.verify_ssl.unwrap_or(true),
		})
	}
}

/// Cluster configuration (runtime, resolved).
#[derive(Debug)]
pub struct ClusterConfig {
	/// API server URL; unset means infer from kubeconfig or the pod environment
	pub host: Option<String>,
	pub namespace: String,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	/// Service account token used when `host` is set without basic auth
	pub token_file: PathBuf,
	pub verify_ssl: bool,
}

impl Default for ClusterConfig {
	fn default() -> Self {
		Self {
			host: None,
			namespace: DEFAULT_NAMESPACE.to_string(),
			username: None,
			password: None,
			token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
			verify_ssl: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use secrecy::ExposeSecret;

	mod resolve {
		use super::*;

		#[test]
		fn defaults() {
			let config = ClusterConfigLayer::default().resolve().unwrap();
			assert!(config.host.is_none());
			assert_eq!(config.namespace, "default");
			assert_eq!(config.token_file, PathBuf::from(DEFAULT_TOKEN_FILE));
			assert!(config.verify_ssl);
		}

		#[test]
		fn basic_auth_requires_both_halves() {
			let layer = ClusterConfigLayer {
				username: Some("admin".to_string()),
				..Default::default()
			};
			assert!(matches!(layer.resolve(), Err(ConfigError::Validation(_))));

			let layer = ClusterConfigLayer {
				password: Some(SecretString::from("pw".to_string())),
				..Default::default()
			};
			assert!(matches!(layer.resolve(), Err(ConfigError::Validation(_))));
		}

		#[test]
		fn bad_host_rejected() {
			let layer = ClusterConfigLayer {
				host: Some("not a url".to_string()),
				..Default::default()
			};
			let err = layer.resolve().unwrap_err();
			assert!(err.to_string().contains("cluster.host"));
		}

		#[test]
		fn explicit_values_kept() {
			let layer = ClusterConfigLayer {
				host: Some("https://10.0.0.1:6443".to_string()),
				namespace: Some("notebooks".to_string()),
				username: Some("admin".to_string()),
				password: Some(SecretString::from("pw".to_string())),
				token_file: None,
				verify_ssl: Some(false),
			};
			let config = layer.resolve().unwrap();
			assert_eq!(config.host.as_deref(), Some("https://10.0.0.1:6443"));
			assert_eq!(config.namespace, "notebooks");
			assert_eq!(config.password.unwrap().expose_secret(), "pw");
			assert!(!config.verify_ssl);
		}
	}

	#[test]
	fn test_deserialize_password_as_secret() {
		let layer: ClusterConfigLayer = toml::from_str(
			r#"
host = "https://k8s.example.com"
username = "admin"
password = "hunter2"
"#,
		)
		.unwrap();
		assert_eq!(layer.password.as_ref().unwrap().expose_secret(), "hunter2");
		assert!(!format!("{layer:?}").contains("hunter2"));
	}

	#[test]
	fn test_merge_later_wins() {
		let mut base = ClusterConfigLayer {
			namespace: Some("a".to_string()),
			verify_ssl: Some(false),
			..Default::default()
		};
		base.merge(ClusterConfigLayer {
			namespace: Some("b".to_string()),
			..Default::default()
		});
		assert_eq!(base.namespace.as_deref(), Some("b"));
		assert_eq!(base.verify_ssl, Some(false));
	}
}
