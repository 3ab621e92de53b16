//! File-backed inputs: one JSON bundle holding everything the collaborators
//! fetched for a single invocation.
//!
//! ```json
//! {
//!   "annotations": { "replicaCount": "3", "replicas": "10.10.10.10,nil", ... },
//!   "replicaStats": { "0": { "Replica": "10.10.10.10", "Status": "Online", "DataUpdateIndex": "1" } },
//!   "initial": { "Name": "vol1", "ReadIOPS": "0", ... },
//!   "final": { "Name": "vol1", "ReadIOPS": "10", ... }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, StatsError};
use crate::replica::{ReplicaDescriptor, ReplicaMeta, VolumeAnnotations};
use crate::snapshot::{RawVolumeMetrics, VolumeMetricsSnapshot};

/// Raw collaborator outputs for one stats invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSample {
    #[serde(default)]
    pub annotations: VolumeAnnotations,
    /// Live replica status keyed by index; absent or `null` means none.
    #[serde(default)]
    pub replica_stats: Option<BTreeMap<usize, ReplicaDescriptor>>,
    pub initial: RawVolumeMetrics,
    #[serde(rename = "final")]
    pub final_metrics: RawVolumeMetrics,
}

/// Validated reconciliation inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleInputs {
    pub meta: ReplicaMeta,
    pub initial: VolumeMetricsSnapshot,
    pub final_snapshot: VolumeMetricsSnapshot,
}

impl StatsSample {
    /// Parse counters and replica metadata.
    pub fn into_inputs(self) -> Result<SampleInputs, StatsError> {
        let meta = ReplicaMeta::from_annotations(
            &self.annotations,
            self.replica_stats.unwrap_or_default(),
        )?;
        Ok(SampleInputs {
            meta,
            initial: VolumeMetricsSnapshot::try_from(self.initial)?,
            final_snapshot: VolumeMetricsSnapshot::try_from(self.final_metrics)?,
        })
    }
}

/// Read and decode a [`StatsSample`] from `path`.
pub fn load_sample(path: &Path) -> Result<StatsSample, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path` and validate it into reconciliation inputs.
pub fn load_inputs(path: &Path) -> Result<SampleInputs, InputError> {
    load_sample(path)?
        .into_inputs()
        .map_err(|source| InputError::Invalid {
            path: path.to_path_buf(),
            source,
        })
}
