//! Replica metadata and liveness classification.
//!
//! Upstream status vocabularies (pod phases, container waiting reasons,
//! replica modes) keep growing, so [`ReplicaHealth::classify`] is total: any
//! literal it does not recognise becomes [`ReplicaHealth::Unknown`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Address placeholder for a replica that could not be reached.
pub const UNREACHABLE: &str = "unreachable";
/// Data update index placeholder when a replica is not fully online.
pub const UNKNOWN_INDEX: &str = "Unknown";

const HEALTHY: &[&str] = &["Running", "Online", "RW", "Healthy"];
const OFFLINE: &[&str] = &["Offline", "Terminated"];
const DEGRADED: &[&str] = &[
    "CrashLoopBackOff",
    "ErrImagePull",
    "ImagePullBackOff",
    "CreateContainerError",
    "RunContainerError",
];

/// Derived health of one replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplicaHealth {
    Online,
    Offline,
    /// Restart loops and image fetch failures; transient, unlike `Offline`.
    Degraded,
    Unknown,
}

impl ReplicaHealth {
    /// Map a raw upstream status literal to a health state.
    pub fn classify(raw_status: &str) -> Self {
        let status = raw_status.trim();
        let is = |set: &[&str]| set.iter().any(|s| s.eq_ignore_ascii_case(status));
        if status.is_empty() {
            Self::Unknown
        } else if is(HEALTHY) {
            Self::Online
        } else if is(OFFLINE) {
            Self::Offline
        } else if is(DEGRADED) {
            Self::Degraded
        } else {
            Self::Unknown
        }
    }

    /// Like [`classify`](Self::classify), but an unreachable replica is never
    /// reported `Online`.
    pub fn classify_reachable(raw_status: &str, reachable: bool) -> Self {
        match Self::classify(raw_status) {
            Self::Online if !reachable => Self::Unknown,
            health => health,
        }
    }
}

impl std::fmt::Display for ReplicaHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "Online"),
            Self::Offline => write!(f, "Offline"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Whether an address names a contactable replica.
pub fn is_reachable(address: &str) -> bool {
    let a = address.trim();
    !(a.is_empty() || a.eq_ignore_ascii_case("nil") || a.eq_ignore_ascii_case(UNREACHABLE))
}

fn normalize_address(address: &str) -> String {
    if is_reachable(address) {
        address.trim().to_string()
    } else {
        UNREACHABLE.to_string()
    }
}

/// Live status reported for one replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaDescriptor {
    #[serde(alias = "Replica")]
    pub address: String,
    #[serde(rename = "status", alias = "Status")]
    pub raw_status_text: String,
    #[serde(alias = "DataUpdateIndex", default = "unknown_index")]
    pub data_update_index: String,
}

fn unknown_index() -> String {
    UNKNOWN_INDEX.to_string()
}

impl ReplicaDescriptor {
    pub fn new(address: &str, raw_status_text: &str, data_update_index: &str) -> Self {
        Self {
            address: address.to_string(),
            raw_status_text: raw_status_text.to_string(),
            data_update_index: data_update_index.to_string(),
        }
    }
}

/// Volume annotations supplied by the metadata collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeAnnotations {
    pub iqn: String,
    pub target_portal: String,
    pub volume_size: String,
    pub controller_status: String,
    /// Declared replica count, string-encoded.
    pub replica_count: String,
    /// Comma-separated pod phases, one per declared replica.
    pub replica_status: String,
    /// Comma-separated replica addresses; `nil` marks an unreachable replica.
    pub replicas: String,
}

fn split_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Target identity carried through from the volume annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalDetails {
    pub iqn: String,
    pub target_portal: String,
    pub volume_size: String,
    pub controller_status: String,
}

impl From<&VolumeAnnotations> for PortalDetails {
    fn from(a: &VolumeAnnotations) -> Self {
        Self {
            iqn: a.iqn.clone(),
            target_portal: a.target_portal.clone(),
            volume_size: a.volume_size.clone(),
            controller_status: a.controller_status.clone(),
        }
    }
}

/// Volume metadata inputs to reconciliation; replicas are indexed by
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaMeta {
    pub portal: PortalDetails,
    pub declared_count: usize,
    /// Annotated addresses; may be shorter or longer than `declared_count`.
    pub addresses: Vec<String>,
    /// Annotated pod phases; may be shorter or longer than `declared_count`.
    pub pod_statuses: Vec<String>,
    /// Live status map keyed by replica index. Sparse.
    pub statuses: BTreeMap<usize, ReplicaDescriptor>,
}

/// One resolved replica row of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaEntry {
    pub address: String,
    pub health: ReplicaHealth,
    pub data_update_index: String,
}

impl ReplicaEntry {
    pub fn placeholder() -> Self {
        Self {
            address: UNREACHABLE.to_string(),
            health: ReplicaHealth::Unknown,
            data_update_index: UNKNOWN_INDEX.to_string(),
        }
    }
}

impl ReplicaMeta {
    /// Build replica inputs from annotations and the live status map.
    pub fn from_annotations(
        annotations: &VolumeAnnotations,
        statuses: BTreeMap<usize, ReplicaDescriptor>,
    ) -> Result<Self, StatsError> {
        let raw = annotations.replica_count.trim();
        let declared_count = raw
            .parse::<usize>()
            .map_err(|_| StatsError::InvalidReplicaCount {
                value: annotations.replica_count.clone(),
            })?;
        Ok(Self {
            portal: PortalDetails::from(annotations),
            declared_count,
            addresses: split_list(&annotations.replicas),
            pod_statuses: split_list(&annotations.replica_status),
            statuses,
        })
    }

    /// Resolve the replica at `index`: live status first, then the annotated
    /// pod phase, then a placeholder.
    pub fn entry(&self, index: usize) -> ReplicaEntry {
        if let Some(desc) = self.statuses.get(&index) {
            let reachable = is_reachable(&desc.address);
            let data_update_index = if desc.data_update_index.trim().is_empty() {
                UNKNOWN_INDEX.to_string()
            } else {
                desc.data_update_index.clone()
            };
            return ReplicaEntry {
                address: normalize_address(&desc.address),
                health: ReplicaHealth::classify_reachable(&desc.raw_status_text, reachable),
                data_update_index,
            };
        }

        match self.pod_statuses.get(index) {
            Some(phase) if !phase.is_empty() => {
                let address = self
                    .addresses
                    .get(index)
                    .map(|a| normalize_address(a))
                    .unwrap_or_else(|| UNREACHABLE.to_string());
                ReplicaEntry {
                    health: ReplicaHealth::classify_reachable(phase, is_reachable(&address)),
                    address,
                    data_update_index: UNKNOWN_INDEX.to_string(),
                }
            }
            _ => ReplicaEntry::placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_healthy_literals() {
        for s in ["Running", "Online", "RW", "Healthy", "running", " Online "] {
            assert_eq!(ReplicaHealth::classify(s), ReplicaHealth::Online, "{s}");
        }
    }

    #[test]
    fn classify_offline() {
        assert_eq!(ReplicaHealth::classify("Offline"), ReplicaHealth::Offline);
        assert_eq!(ReplicaHealth::classify("Terminated"), ReplicaHealth::Offline);
    }

    #[test]
    fn classify_transient_failures_as_degraded() {
        assert_eq!(
            ReplicaHealth::classify("ErrImagePull"),
            ReplicaHealth::Degraded
        );
        assert_eq!(
            ReplicaHealth::classify("CrashLoopBackOff"),
            ReplicaHealth::Degraded
        );
        assert_eq!(
            ReplicaHealth::classify("ImagePullBackOff"),
            ReplicaHealth::Degraded
        );
    }

    #[test]
    fn classify_is_total() {
        for s in ["", "   ", "Pending", "WO", "Unknown", "🔥", "Running,Running"] {
            assert_eq!(ReplicaHealth::classify(s), ReplicaHealth::Unknown, "{s:?}");
        }
    }

    #[test]
    fn unreachable_replica_is_never_online() {
        assert_eq!(
            ReplicaHealth::classify_reachable("Running", false),
            ReplicaHealth::Unknown
        );
        assert_eq!(
            ReplicaHealth::classify_reachable("Offline", false),
            ReplicaHealth::Offline
        );
        assert_eq!(
            ReplicaHealth::classify_reachable("ErrImagePull", false),
            ReplicaHealth::Degraded
        );
        assert_eq!(
            ReplicaHealth::classify_reachable("Running", true),
            ReplicaHealth::Online
        );
    }

    #[test]
    fn reachability_sentinels() {
        assert!(is_reachable("10.10.10.10"));
        assert!(!is_reachable("nil"));
        assert!(!is_reachable(""));
        assert!(!is_reachable("unreachable"));
        assert!(!is_reachable("NIL"));
        assert!(!is_reachable(" Nil "));
        assert!(!is_reachable("Unreachable"));
    }

    fn annotations(count: &str, status: &str, replicas: &str) -> VolumeAnnotations {
        VolumeAnnotations {
            replica_count: count.to_string(),
            replica_status: status.to_string(),
            replicas: replicas.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn from_annotations_splits_lists() {
        let meta = ReplicaMeta::from_annotations(
            &annotations("3", "Running,Running,Offline", "10.10.10.10, 10.10.10.11,nil"),
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(meta.declared_count, 3);
        assert_eq!(meta.addresses, vec!["10.10.10.10", "10.10.10.11", "nil"]);
        assert_eq!(meta.pod_statuses.len(), 3);
    }

    #[test]
    fn from_annotations_rejects_bad_count() {
        let err =
            ReplicaMeta::from_annotations(&annotations("three", "", ""), BTreeMap::new())
                .unwrap_err();
        assert_eq!(
            err,
            StatsError::InvalidReplicaCount {
                value: "three".to_string()
            }
        );
        assert!(
            ReplicaMeta::from_annotations(&annotations("-1", "", ""), BTreeMap::new()).is_err()
        );
    }

    #[test]
    fn entry_prefers_live_status() {
        let mut statuses = BTreeMap::new();
        statuses.insert(0, ReplicaDescriptor::new("10.10.10.10", "Online", "1"));
        let meta = ReplicaMeta::from_annotations(
            &annotations("1", "CrashLoopBackOff", "10.10.10.10"),
            statuses,
        )
        .unwrap();
        let e = meta.entry(0);
        assert_eq!(e.health, ReplicaHealth::Online);
        assert_eq!(e.address, "10.10.10.10");
        assert_eq!(e.data_update_index, "1");
    }

    #[test]
    fn entry_falls_back_to_pod_phase() {
        let meta = ReplicaMeta::from_annotations(
            &annotations("3", "Running,Running,Offline", "10.10.10.10,10.10.10.11,nil"),
            BTreeMap::new(),
        )
        .unwrap();
        let e = meta.entry(2);
        assert_eq!(e.health, ReplicaHealth::Offline);
        assert_eq!(e.address, UNREACHABLE);
        assert_eq!(e.data_update_index, UNKNOWN_INDEX);
    }

    #[test]
    fn empty_data_update_index_is_unknown() {
        let mut statuses = BTreeMap::new();
        statuses.insert(0, ReplicaDescriptor::new("10.10.10.10", "Online", ""));
        statuses.insert(1, ReplicaDescriptor::new("10.10.10.11", "Online", "   "));
        let meta = ReplicaMeta::from_annotations(
            &annotations("2", "Running,Running", "10.10.10.10,10.10.10.11"),
            statuses,
        )
        .unwrap();
        assert_eq!(meta.entry(0).data_update_index, UNKNOWN_INDEX);
        assert_eq!(meta.entry(1).data_update_index, UNKNOWN_INDEX);
        assert_eq!(meta.entry(0).health, ReplicaHealth::Online);
    }

    #[test]
    fn entry_without_any_source_is_placeholder() {
        let meta = ReplicaMeta {
            declared_count: 2,
            ..Default::default()
        };
        assert_eq!(meta.entry(1), ReplicaEntry::placeholder());
    }

    #[test]
    fn descriptor_accepts_upstream_keys() {
        let json = r#"{"Replica": "nil", "Status": "ErrImagePull", "DataUpdateIndex": "Unknown"}"#;
        let d: ReplicaDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.address, "nil");
        assert_eq!(d.raw_status_text, "ErrImagePull");

        let json = r#"{"address": "10.10.10.10", "status": "Online"}"#;
        let d: ReplicaDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.data_update_index, UNKNOWN_INDEX);
    }
}
