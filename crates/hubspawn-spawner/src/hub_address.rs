// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution of the hub API URL handed to a user's pod.

use std::net::IpAddr;

use hubspawn_k8s::{first_ingress_address, pod_ip, ClusterClient};
use tracing::debug;
use url::Url;

use crate::config::{HubAddressOverrides, HubAddressSource};
use crate::error::SpawnerError;

/// Resolve the hub API URL a pod should call back to.
///
/// Only the highest-priority configured source is consulted. A resolved
/// address replaces the host of `default_api_url`; scheme, port and path are
/// kept. With nothing configured the default URL is returned unchanged.
pub async fn resolve_hub_api_url(
	client: &dyn ClusterClient,
	namespace: &str,
	overrides: &HubAddressOverrides,
	default_api_url: &Url,
) -> Result<Url, SpawnerError> {
	let address = match overrides.source() {
		HubAddressSource::PlatformDefault => {
			debug!(url = %default_api_url, "Using platform hub API URL");
			return Ok(default_api_url.clone());
		}
		HubAddressSource::Static(ip) => ip.to_string(),
		HubAddressSource::Service(name) => {
			let service = client.get_service(name, namespace).await?;
			first_ingress_address(&service)
				.ok_or_else(|| SpawnerError::HubAddressUnavailable {
					source_kind: "service",
					name: name.to_string(),
					reason: "no load-balancer ingress".to_string(),
				})?
				.to_string()
		}
		HubAddressSource::Pod(name) => {
			let pod = client.get_pod(name, namespace).await?.ok_or_else(|| {
				SpawnerError::HubAddressUnavailable {
					source_kind: "pod",
					name: name.to_string(),
					reason: "pod not found".to_string(),
				}
			})?;
			pod_ip(&pod)
				.ok_or_else(|| SpawnerError::HubAddressUnavailable {
					source_kind: "pod",
					name: name.to_string(),
					reason: "pod has no address".to_string(),
				})?
				.to_string()
		}
	};

	let url = substitute_host(default_api_url, &address)?;
	debug!(address = %address, url = %url, "Resolved hub API URL");
	Ok(url)
}

/// Replace the host of `url` with `address` (an IP or a DNS name).
pub fn substitute_host(url: &Url, address: &str) -> Result<Url, SpawnerError> {
	let invalid = |message: String| SpawnerError::InvalidHubUrl {
		url: url.to_string(),
		message,
	};

	let mut rewritten = url.clone();
	match address.parse::<IpAddr>() {
		Ok(ip) => rewritten
			.set_ip_host(ip)
			.map_err(|()| invalid("URL cannot carry a host".to_string()))?,
		Err(_) => rewritten
			.set_host(Some(address))
			.map_err(|e| invalid(format!("cannot use host {address:?}: {e}")))?,
	}
	Ok(rewritten)
}
