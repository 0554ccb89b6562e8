// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster authentication and TLS policy.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::error::ClusterError;

/// Where the on-host service identity token is mounted inside a pod.
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// How the adapter authenticates against the API server.
#[derive(Debug)]
pub enum ClusterCredentials {
	/// Username/password exchanged for a basic-auth bearer on every request.
	Basic {
		username: String,
		password: SecretString,
	},
	/// Bearer token read once from an on-host credential file.
	ServiceAccountToken { token_file: PathBuf },
	/// Whatever kubeconfig or the in-cluster environment provides.
	Inferred,
}

impl ClusterCredentials {
	/// Service account token at the standard mount path.
	pub fn service_account() -> Self {
		ClusterCredentials::ServiceAccountToken {
			token_file: PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH),
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			ClusterCredentials::Basic { .. } => "basic",
			ClusterCredentials::ServiceAccountToken { .. } => "service-account-token",
			ClusterCredentials::Inferred => "inferred",
		}
	}
}

/// Everything needed to construct a cluster client.
#[derive(Debug)]
pub struct ClusterSettings {
	/// API server URL. Required unless credentials are [`ClusterCredentials::Inferred`].
	pub host: Option<String>,
	pub credentials: ClusterCredentials,
	/// Verify the API server's TLS certificate.
	pub verify_ssl: bool,
}

impl Default for ClusterSettings {
	fn default() -> Self {
		Self {
			host: None,
			credentials: ClusterCredentials::Inferred,
			verify_ssl: true,
		}
	}
}

/// Read a bearer token from an on-host credential file.
///
/// Surrounding whitespace (the trailing newline most mounts carry) is
/// stripped.
pub fn read_token_file(path: &Path) -> Result<SecretString, ClusterError> {
	if !path.exists() {
		return Err(ClusterError::MissingCredential {
			path: path.to_path_buf(),
		});
	}

	let content = std::fs::read_to_string(path).map_err(|source| ClusterError::Credential {
		path: path.to_path_buf(),
		source,
	})?;

	Ok(SecretString::from(content.trim().to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use secrecy::ExposeSecret;
	use std::io::Write;

	#[test]
	fn reads_and_trims_token_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "eyJhbGciOiJSUzI1NiJ9.token").unwrap();

		let token = read_token_file(file.path()).unwrap();
		assert_eq!(token.expose_secret(), "eyJhbGciOiJSUzI1NiJ9.token");
	}

	#[test]
	fn missing_token_file_is_credential_error() {
		let err = read_token_file(Path::new("/nonexistent/serviceaccount/token")).unwrap_err();
		assert!(matches!(err, ClusterError::MissingCredential { .. }));
		assert!(err.is_credential_error());
	}

	#[test]
	fn service_account_uses_standard_path() {
		match ClusterCredentials::service_account() {
			ClusterCredentials::ServiceAccountToken { token_file } => {
				assert_eq!(token_file, PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH));
			}
			other => panic!("unexpected credentials: {other:?}"),
		}
	}

	#[test]
	fn debug_never_shows_password() {
		let creds = ClusterCredentials::Basic {
			username: "admin".to_string(),
			password: SecretString::from("hunter2".to_string()),
		};
		let debug_output = format!("{creds:?}");
		assert!(debug_output.contains("admin"));
		assert!(!debug_output.contains("hunter2"));
	}

	#[test]
	fn default_settings_infer_and_verify() {
		let settings = ClusterSettings::default();
		assert!(settings.host.is_none());
		assert!(settings.verify_ssl);
		assert_eq!(settings.credentials.kind(), "inferred");
	}
}
