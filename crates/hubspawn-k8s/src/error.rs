// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the cluster control plane.
#[derive(Error, Debug)]
pub enum ClusterError {
	/// The control plane rejected the request or could not be reached.
	///
	/// `code` carries the HTTP status when the API server answered.
	#[error("Cluster API error: {message}")]
	Api { code: Option<u16>, message: String },

	#[error("Service account token file not found: {path}")]
	MissingCredential { path: PathBuf },

	#[error("Failed to read service account token {path}: {source}")]
	Credential {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid cluster URL '{url}': {message}")]
	InvalidClusterUrl { url: String, message: String },

	#[error("Cluster configuration error: {message}")]
	Config { message: String },
}

impl ClusterError {
	/// True when the API server answered 404 for the addressed object.
	pub fn is_not_found(&self) -> bool {
		matches!(self, ClusterError::Api { code: Some(404), .. })
	}

	/// True for any credential acquisition failure.
	pub fn is_credential_error(&self) -> bool {
		matches!(
			self,
			ClusterError::MissingCredential { .. } | ClusterError::Credential { .. }
		)
	}
}

impl From<kube::Error> for ClusterError {
	fn from(err: kube::Error) -> Self {
		match err {
			kube::Error::Api(resp) => ClusterError::Api {
				code: Some(resp.code),
				message: resp.message,
			},
			other => ClusterError::Api {
				code: None,
				message: other.to_string(),
			},
		}
	}
}
