//! # volstats-core
//!
//! **What is this volume doing right now, and are its replicas healthy?**
//!
//! `volstats-core` turns two raw counter snapshots of a replicated storage
//! volume, taken a few seconds apart, plus the volume's replica metadata into
//! one reconciled [`StatsReport`].
//!
//! ## Quick Start
//!
//! ```
//! use volstats_core::{ReplicaMeta, VolumeMetricsSnapshot, reconcile};
//!
//! let initial = VolumeMetricsSnapshot {
//!     name: "vol1".to_string(),
//!     up_time_seconds: 100.0,
//!     total_read_blocks: 3,
//!     ..Default::default()
//! };
//! let final_snapshot = VolumeMetricsSnapshot {
//!     up_time_seconds: 108.0,
//!     total_read_blocks: 7,
//!     ..initial.clone()
//! };
//! let meta = ReplicaMeta { declared_count: 2, ..Default::default() };
//!
//! let report = reconcile(&meta, &initial, &final_snapshot).unwrap();
//! assert_eq!(report.deltas.read_blocks, 4);
//! assert_eq!(report.replicas.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! Collaborator inputs → [`ReplicaMeta`] + two [`VolumeMetricsSnapshot`]s →
//! [`reconcile`] (using [`ReplicaHealth::classify`] and [`CounterDelta`]) →
//! [`StatsReport`] → [`render`] → output sink
//!
//! Counters that go backwards are treated as reset by a controller restart:
//! the delta is the final value and a [`CounterResetWarning`] is attached.
//! Only structural disagreement between the snapshots is an error.

pub mod delta;
pub mod error;
pub mod input;
pub mod reconcile;
pub mod render;
pub mod replica;
pub mod snapshot;

pub use delta::{CounterDelta, CounterResetWarning, WindowCounter};
pub use error::{InputError, StatsError};
pub use input::{SampleInputs, StatsSample, load_inputs, load_sample};
pub use reconcile::{
    CapacityStats, DEFAULT_INTERVAL, PerformanceStats, ReconcileConfig, StatsReport,
    WindowedCounters, reconcile, reconcile_with,
};
pub use render::{OutputFormat, RenderConfig, format_bytes, render, render_to};
pub use replica::{
    PortalDetails, ReplicaDescriptor, ReplicaEntry, ReplicaHealth, ReplicaMeta, UNKNOWN_INDEX,
    UNREACHABLE, VolumeAnnotations, is_reachable,
};
pub use snapshot::{RawVolumeMetrics, VolumeMetricsSnapshot};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
