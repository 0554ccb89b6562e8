// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	ClusterConfigLayer, HubConfigLayer, LoggingConfigLayer, PodConfigLayer, SpawnConfigLayer,
};

/// Hubspawn configuration layer - all fields are Option for merging.
#[derive(Debug, Default, Deserialize)]
pub struct HubspawnConfigLayer {
	#[serde(default)]
	pub cluster: Option<ClusterConfigLayer>,
	#[serde(default)]
	pub pod: Option<PodConfigLayer>,
	#[serde(default)]
	pub hub: Option<HubConfigLayer>,
	#[serde(default)]
	pub spawn: Option<SpawnConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl HubspawnConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: HubspawnConfigLayer) {
		merge_option(&mut self.cluster, other.cluster, ClusterConfigLayer::merge);
		merge_option(&mut self.pod, other.pod, PodConfigLayer::merge);
		merge_option(&mut self.hub, other.hub, HubConfigLayer::merge);
		merge_option(&mut self.spawn, other.spawn, SpawnConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
