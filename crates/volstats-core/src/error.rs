//! Error types for snapshot validation and reconciliation.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when two snapshots cannot be reconciled into a report.
///
/// Every variant names the volume or field at fault so the CLI can print a
/// one-line diagnostic without further context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A field that must stay constant across the sampling window changed,
    /// or the two snapshots describe different volumes.
    #[error("volume {volume}: inconsistent snapshots, {field} changed from {initial} to {final_value}")]
    InconsistentSnapshot {
        volume: String,
        field: &'static str,
        initial: String,
        final_value: String,
    },
    /// A string-encoded upstream counter is not an unsigned integer.
    #[error("volume {volume}: counter {field} is not numeric: {value:?}")]
    InvalidCounter {
        volume: String,
        field: &'static str,
        value: String,
    },
    /// The declared replica count annotation is not an unsigned integer.
    #[error("invalid declared replica count {value:?}")]
    InvalidReplicaCount { value: String },
    #[error("snapshot has an empty volume name")]
    EmptyVolumeName,
}

/// Error returned when a collaborator file cannot be loaded.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The file parsed, but its contents are not a valid sample.
    #[error("invalid sample in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: StatsError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistent_snapshot_message_names_volume_and_field() {
        let err = StatsError::InconsistentSnapshot {
            volume: "vol1".to_string(),
            field: "size_bytes",
            initial: "1073741824".to_string(),
            final_value: "2147483648".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "volume vol1: inconsistent snapshots, size_bytes changed from 1073741824 to 2147483648"
        );
    }

    #[test]
    fn invalid_counter_quotes_value() {
        let err = StatsError::InvalidCounter {
            volume: "vol1".to_string(),
            field: "read_iops",
            value: "ten".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "volume vol1: counter read_iops is not numeric: \"ten\""
        );
    }
}
