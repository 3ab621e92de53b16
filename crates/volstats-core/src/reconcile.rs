//! Reconcile two volume snapshots and replica metadata into one report.
//!
//! The reconciler is a pure transform: it validates that both snapshots
//! describe the same volume with the same geometry, differences the four
//! windowed I/O counters, copies instantaneous fields from the final
//! snapshot, and materialises exactly `declared_count` replica rows.

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::delta::{CounterDelta, CounterResetWarning};
use crate::error::StatsError;
use crate::replica::{PortalDetails, ReplicaEntry, ReplicaMeta};
use crate::snapshot::VolumeMetricsSnapshot;

/// Sampling interval the collaborator uses when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(8);

/// Reconciliation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileConfig {
    /// Nominal gap between the two snapshots. Only used as the rate window
    /// when the controller uptime did not advance.
    pub interval: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Activity during the sampling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowedCounters {
    pub read_blocks: u64,
    pub read_time_micros: u64,
    pub write_blocks: u64,
    pub write_time_micros: u64,
}

/// Rates derived from the windowed counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub window_seconds: f64,
    pub read_bytes_per_sec: f64,
    pub write_bytes_per_sec: f64,
    pub avg_read_latency_micros: f64,
    pub avg_write_latency_micros: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityStats {
    pub logical_used_bytes: u64,
    pub actual_used_bytes: u64,
}

/// Reconciled point-in-time view of one volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub name: String,
    pub portal: PortalDetails,
    pub sector_size_bytes: u64,
    pub size_bytes: u64,
    pub used_blocks: u64,
    pub used_logical_blocks: u64,
    pub up_time_seconds: f64,
    pub replica_count: u64,
    pub revision_counter: u64,
    pub read_iops: u64,
    pub write_iops: u64,
    pub deltas: WindowedCounters,
    pub performance: PerformanceStats,
    pub capacity: CapacityStats,
    /// One row per declared replica, in index order.
    pub replicas: Vec<ReplicaEntry>,
    pub warnings: Vec<CounterResetWarning>,
}

fn ensure_equal<T: PartialEq + ToString>(
    volume: &str,
    field: &'static str,
    initial: &T,
    final_value: &T,
) -> Result<(), StatsError> {
    if initial == final_value {
        return Ok(());
    }
    Err(StatsError::InconsistentSnapshot {
        volume: volume.to_string(),
        field,
        initial: initial.to_string(),
        final_value: final_value.to_string(),
    })
}

fn validate(
    initial: &VolumeMetricsSnapshot,
    final_snap: &VolumeMetricsSnapshot,
) -> Result<(), StatsError> {
    if initial.name.trim().is_empty() || final_snap.name.trim().is_empty() {
        return Err(StatsError::EmptyVolumeName);
    }
    let volume = initial.name.as_str();
    ensure_equal(volume, "name", &initial.name, &final_snap.name)?;
    ensure_equal(
        volume,
        "sector_size_bytes",
        &initial.sector_size_bytes,
        &final_snap.sector_size_bytes,
    )?;
    ensure_equal(volume, "size_bytes", &initial.size_bytes, &final_snap.size_bytes)
}

/// Collects windowed deltas and the warnings raised along the way.
struct Window<'a> {
    volume: &'a str,
    warnings: Vec<CounterResetWarning>,
}

impl Window<'_> {
    fn delta(&mut self, counter: &str, initial: u64, final_value: u64) -> u64 {
        let d = CounterDelta::between(initial, final_value);
        if d.reset {
            let w = CounterResetWarning {
                counter: counter.to_string(),
                initial,
                final_value,
            };
            warn!("volume {}: {w}", self.volume);
            self.warnings.push(w);
        }
        d.value
    }
}

fn per_second(amount: f64, seconds: f64) -> f64 {
    if seconds > 0.0 { amount / seconds } else { 0.0 }
}

fn per_block(micros: u64, blocks: u64) -> f64 {
    if blocks == 0 {
        0.0
    } else {
        micros as f64 / blocks as f64
    }
}

/// Reconcile with the default configuration.
pub fn reconcile(
    meta: &ReplicaMeta,
    initial: &VolumeMetricsSnapshot,
    final_snap: &VolumeMetricsSnapshot,
) -> Result<StatsReport, StatsError> {
    reconcile_with(&ReconcileConfig::default(), meta, initial, final_snap)
}

/// Build a [`StatsReport`] from replica metadata and two snapshots.
///
/// Fails only when the snapshots disagree structurally; counter resets and
/// missing replica statuses are folded into the report.
pub fn reconcile_with(
    config: &ReconcileConfig,
    meta: &ReplicaMeta,
    initial: &VolumeMetricsSnapshot,
    final_snap: &VolumeMetricsSnapshot,
) -> Result<StatsReport, StatsError> {
    validate(initial, final_snap)?;

    let mut window = Window {
        volume: &final_snap.name,
        warnings: Vec::new(),
    };
    let deltas = WindowedCounters {
        read_blocks: window.delta(
            "total_read_blocks",
            initial.total_read_blocks,
            final_snap.total_read_blocks,
        ),
        read_time_micros: window.delta(
            "total_read_time_micros",
            initial.total_read_time_micros,
            final_snap.total_read_time_micros,
        ),
        write_blocks: window.delta(
            "total_write_blocks",
            initial.total_write_blocks,
            final_snap.total_write_blocks,
        ),
        write_time_micros: window.delta(
            "total_write_time_micros",
            initial.total_write_time_micros,
            final_snap.total_write_time_micros,
        ),
    };
    // Uptime is instantaneous: it only sizes the rate window.
    let elapsed = final_snap.up_time_seconds - initial.up_time_seconds;
    if elapsed < 0.0 {
        debug!(
            "volume {}: controller uptime went from {:.3}s to {:.3}s, using {:?} as the window",
            final_snap.name, initial.up_time_seconds, final_snap.up_time_seconds, config.interval
        );
    }
    let window_seconds = if elapsed > 0.0 {
        elapsed
    } else {
        config.interval.as_secs_f64()
    };
    let sector = final_snap.sector_size_bytes as f64;
    let performance = PerformanceStats {
        window_seconds,
        read_bytes_per_sec: per_second(deltas.read_blocks as f64 * sector, window_seconds),
        write_bytes_per_sec: per_second(deltas.write_blocks as f64 * sector, window_seconds),
        avg_read_latency_micros: per_block(deltas.read_time_micros, deltas.read_blocks),
        avg_write_latency_micros: per_block(deltas.write_time_micros, deltas.write_blocks),
    };
    let capacity = CapacityStats {
        logical_used_bytes: final_snap
            .used_logical_blocks
            .saturating_mul(final_snap.sector_size_bytes),
        actual_used_bytes: final_snap
            .used_blocks
            .saturating_mul(final_snap.sector_size_bytes),
    };

    let ignored = meta
        .statuses
        .range(meta.declared_count..)
        .map(|(i, _)| *i)
        .collect::<Vec<_>>();
    if !ignored.is_empty() {
        debug!(
            "volume {}: ignoring status for replica indices {:?} beyond declared count {}",
            final_snap.name, ignored, meta.declared_count
        );
    }
    let replicas: Vec<ReplicaEntry> = (0..meta.declared_count).map(|i| meta.entry(i)).collect();

    debug!(
        "volume {}: reconciled {} replica(s), {} warning(s), window {:.3}s",
        final_snap.name,
        replicas.len(),
        window.warnings.len(),
        window_seconds
    );

    Ok(StatsReport {
        name: final_snap.name.clone(),
        portal: meta.portal.clone(),
        sector_size_bytes: final_snap.sector_size_bytes,
        size_bytes: final_snap.size_bytes,
        used_blocks: final_snap.used_blocks,
        used_logical_blocks: final_snap.used_logical_blocks,
        up_time_seconds: final_snap.up_time_seconds,
        replica_count: final_snap.replica_count,
        revision_counter: final_snap.revision_counter,
        read_iops: final_snap.read_iops,
        write_iops: final_snap.write_iops,
        deltas,
        performance,
        capacity,
        replicas,
        warnings: window.warnings,
    })
}
