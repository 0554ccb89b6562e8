// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod cluster;
mod hub;
mod logging;
mod pod;
mod spawn;

pub use cluster::{ClusterConfig, ClusterConfigLayer, DEFAULT_TOKEN_FILE};
pub use hub::{HubConfig, HubConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use pod::{PodConfig, PodConfigLayer, VolumeConfig, VolumeConfigLayer};
pub use spawn::{SpawnConfig, SpawnConfigLayer};
