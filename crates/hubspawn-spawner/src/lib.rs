// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-user notebook pod provisioning for a multi-user notebook hub.
//!
//! # Architecture
//!
//! The spawner sits between the hub (which owns user sessions) and the
//! cluster client (hubspawn-k8s), implementing:
//!
//! - Username escaping into stable pod names
//! - Pod specification construction
//! - Hub API address resolution
//! - The start / poll / stop lifecycle

pub mod config;
pub mod error;
pub mod escape;
pub mod hub_address;
pub mod pod_spec;
pub mod session;
pub mod spawner;

pub use config::{HubAddressOverrides, HubAddressSource, SpawnerConfig, VolumeRef};
pub use error::SpawnerError;
pub use escape::{escape, escape_username, is_pod_name_char, pod_name, POD_NAME_ESCAPE_CHAR};
pub use hub_address::{resolve_hub_api_url, substitute_host};
pub use pod_spec::build_pod_spec;
pub use session::{HubRecord, PodEndpoint, PollStatus, ServerRecord, UserSession};
pub use spawner::Spawner;
