//! Volume-level metric snapshots as reported by the volume controller.
//!
//! The controller publishes most counters as string-encoded decimals. They
//! arrive here as [`RawVolumeMetrics`] and are validated into a typed
//! [`VolumeMetricsSnapshot`] before any arithmetic happens.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Controller metrics in their upstream wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVolumeMetrics {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ReadIOPS")]
    pub read_iops: String,
    #[serde(rename = "ReplicaCounter", default)]
    pub replica_counter: u64,
    #[serde(rename = "RevisionCounter", default)]
    pub revision_counter: u64,
    #[serde(rename = "SectorSize")]
    pub sector_size: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "TotalReadBlockCount")]
    pub total_read_block_count: String,
    #[serde(rename = "TotalReadTime")]
    pub total_read_time: String,
    #[serde(rename = "TotalWriteTime")]
    pub total_write_time: String,
    #[serde(rename = "TotalWriteBlockCount")]
    pub total_write_block_count: String,
    #[serde(rename = "UpTime", default)]
    pub up_time: f64,
    #[serde(rename = "UsedBlocks")]
    pub used_blocks: String,
    #[serde(rename = "UsedLogicalBlocks")]
    pub used_logical_blocks: String,
    #[serde(rename = "WriteIOPS")]
    pub write_iops: String,
}

/// One validated capture of volume counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetricsSnapshot {
    pub name: String,
    /// Controller uptime; resets to zero when the controller restarts.
    pub up_time_seconds: f64,
    pub replica_count: u64,
    pub revision_counter: u64,
    pub sector_size_bytes: u64,
    pub size_bytes: u64,
    pub used_blocks: u64,
    pub used_logical_blocks: u64,
    pub total_read_blocks: u64,
    pub total_read_time_micros: u64,
    pub total_write_blocks: u64,
    pub total_write_time_micros: u64,
    pub read_iops: u64,
    pub write_iops: u64,
}

fn parse_counter(volume: &str, field: &'static str, raw: &str) -> Result<u64, StatsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| StatsError::InvalidCounter {
            volume: volume.to_string(),
            field,
            value: raw.to_string(),
        })
}

impl TryFrom<RawVolumeMetrics> for VolumeMetricsSnapshot {
    type Error = StatsError;

    fn try_from(raw: RawVolumeMetrics) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(StatsError::EmptyVolumeName);
        }
        let name = raw.name.as_str();
        if !raw.up_time.is_finite() || raw.up_time < 0.0 {
            return Err(StatsError::InvalidCounter {
                volume: name.to_string(),
                field: "up_time_seconds",
                value: raw.up_time.to_string(),
            });
        }

        Ok(Self {
            up_time_seconds: raw.up_time,
            replica_count: raw.replica_counter,
            revision_counter: raw.revision_counter,
            sector_size_bytes: parse_counter(name, "sector_size_bytes", &raw.sector_size)?,
            size_bytes: parse_counter(name, "size_bytes", &raw.size)?,
            used_blocks: parse_counter(name, "used_blocks", &raw.used_blocks)?,
            used_logical_blocks: parse_counter(
                name,
                "used_logical_blocks",
                &raw.used_logical_blocks,
            )?,
            total_read_blocks: parse_counter(
                name,
                "total_read_blocks",
                &raw.total_read_block_count,
            )?,
            total_read_time_micros: parse_counter(
                name,
                "total_read_time_micros",
                &raw.total_read_time,
            )?,
            total_write_blocks: parse_counter(
                name,
                "total_write_blocks",
                &raw.total_write_block_count,
            )?,
            total_write_time_micros: parse_counter(
                name,
                "total_write_time_micros",
                &raw.total_write_time,
            )?,
            read_iops: parse_counter(name, "read_iops", &raw.read_iops)?,
            write_iops: parse_counter(name, "write_iops", &raw.write_iops)?,
            name: raw.name,
        })
    }
}
