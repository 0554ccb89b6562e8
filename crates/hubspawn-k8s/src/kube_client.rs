// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::{
	api::{Api, DeleteParams, PostParams},
	Client,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use crate::client::ClusterClient;
use crate::credentials::{read_token_file, ClusterCredentials, ClusterSettings};
use crate::error::ClusterError;

/// Production cluster client implementation using the kube crate.
///
/// Construct it once at process start and share it (behind an `Arc`) with
/// every spawner; the underlying connection pool and credentials are reused
/// across calls.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Create a client from explicit settings.
	pub async fn connect(settings: &ClusterSettings) -> Result<Self, ClusterError> {
		let config = match settings.credentials {
			ClusterCredentials::Inferred => {
				let mut config = kube::Config::infer().await.map_err(|e| ClusterError::Config {
					message: e.to_string(),
				})?;
				apply_tls_policy(&mut config, settings.verify_ssl);
				config
			}
			_ => build_config(settings)?,
		};

		let cluster_url = config.cluster_url.to_string();
		let client = Client::try_from(config)?;
		info!(
			cluster_url = %cluster_url,
			auth = settings.credentials.kind(),
			verify_ssl = settings.verify_ssl,
			"Cluster client initialized"
		);
		Ok(Self { client })
	}
}

/// Build a kube configuration for explicit (non-inferred) credentials.
fn build_config(settings: &ClusterSettings) -> Result<kube::Config, ClusterError> {
	let host = settings.host.as_deref().ok_or_else(|| ClusterError::Config {
		message: format!(
			"a cluster host is required for {} credentials",
			settings.credentials.kind()
		),
	})?;

	let uri: http::Uri = host.parse().map_err(|e: http::uri::InvalidUri| {
		ClusterError::InvalidClusterUrl {
			url: host.to_string(),
			message: e.to_string(),
		}
	})?;

	let mut config = kube::Config::new(uri);

	match &settings.credentials {
		ClusterCredentials::Basic { username, password } => {
			config.auth_info.username = Some(username.clone());
			config.auth_info.password = Some(SecretString::from(
				password.expose_secret().to_string(),
			));
		}
		ClusterCredentials::ServiceAccountToken { token_file } => {
			config.auth_info.token = Some(read_token_file(token_file)?);
		}
		ClusterCredentials::Inferred => {}
	}

	apply_tls_policy(&mut config, settings.verify_ssl);
	Ok(config)
}

fn apply_tls_policy(config: &mut kube::Config, verify_ssl: bool) {
	config.accept_invalid_certs = !verify_ssl;
	if !verify_ssl {
		warn!(
			cluster_url = %config.cluster_url,
			"TLS certificate verification is disabled for the cluster API"
		);
	}
}

#[async_trait]
impl ClusterClient for KubeClient {
	#[instrument(skip(self, pod), fields(pod_name = ?pod.metadata.name))]
	async fn create_pod(&self, pod: Pod, namespace: &str) -> Result<Pod, ClusterError> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		let pod = pods.create(&PostParams::default(), &pod).await?;
		Ok(pod)
	}

	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Option<Pod>, ClusterError> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		match pods.get(name).await {
			Ok(pod) => Ok(Some(pod)),
			Err(kube::Error::Api(err)) if err.code == 404 => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	#[instrument(skip(self))]
	async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), ClusterError> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		pods.delete(name, &DeleteParams::default()).await?;
		Ok(())
	}

	async fn get_service(&self, name: &str, namespace: &str) -> Result<Service, ClusterError> {
		let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
		let service = services.get(name).await?;
		Ok(service)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use std::path::PathBuf;

	#[test]
	fn basic_credentials_set_username_and_password() {
		let settings = ClusterSettings {
			host: Some("https://10.0.0.1:6443".to_string()),
			credentials: ClusterCredentials::Basic {
				username: "admin".to_string(),
				password: SecretString::from("s3cret".to_string()),
			},
			verify_ssl: true,
		};

		let config = build_config(&settings).unwrap();
		assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
		assert_eq!(config.auth_info.username.as_deref(), Some("admin"));
		assert_eq!(
			config.auth_info.password.as_ref().map(|p| p.expose_secret().to_string()),
			Some("s3cret".to_string())
		);
		assert!(config.auth_info.token.is_none());
		assert!(!config.accept_invalid_certs);
	}

	#[test]
	fn service_account_token_is_read_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "sa-token").unwrap();

		let settings = ClusterSettings {
			host: Some("https://kubernetes.default.svc".to_string()),
			credentials: ClusterCredentials::ServiceAccountToken {
				token_file: file.path().to_path_buf(),
			},
			verify_ssl: true,
		};

		let config = build_config(&settings).unwrap();
		assert_eq!(
			config.auth_info.token.as_ref().map(|t| t.expose_secret().to_string()),
			Some("sa-token".to_string())
		);
		assert!(config.auth_info.username.is_none());
	}

	#[test]
	fn missing_token_file_fails_construction() {
		let settings = ClusterSettings {
			host: Some("https://kubernetes.default.svc".to_string()),
			credentials: ClusterCredentials::ServiceAccountToken {
				token_file: PathBuf::from("/nonexistent/token"),
			},
			verify_ssl: true,
		};

		let err = build_config(&settings).unwrap_err();
		assert!(err.is_credential_error());
	}

	#[test]
	fn disabling_verification_accepts_invalid_certs() {
		let settings = ClusterSettings {
			host: Some("https://10.0.0.1:6443".to_string()),
			credentials: ClusterCredentials::Basic {
				username: "admin".to_string(),
				password: SecretString::from("pw".to_string()),
			},
			verify_ssl: false,
		};

		let config = build_config(&settings).unwrap();
		assert!(config.accept_invalid_certs);
	}

	#[test]
	fn explicit_credentials_require_a_host() {
		let settings = ClusterSettings {
			host: None,
			credentials: ClusterCredentials::service_account(),
			verify_ssl: true,
		};

		let err = build_config(&settings).unwrap_err();
		assert!(matches!(err, ClusterError::Config { .. }));
	}

	#[test]
	fn unparsable_host_is_rejected() {
		let settings = ClusterSettings {
			host: Some("https://bad host:6443".to_string()),
			credentials: ClusterCredentials::Basic {
				username: "admin".to_string(),
				password: SecretString::from("pw".to_string()),
			},
			verify_ssl: true,
		};

		let err = build_config(&settings).unwrap_err();
		assert!(matches!(err, ClusterError::InvalidClusterUrl { .. }));
	}
}
