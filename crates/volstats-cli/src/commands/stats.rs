//! `volstats stats`: load a sample bundle, reconcile it, render the report.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use volstats_core::{
    InputError, ReconcileConfig, RenderConfig, StatsError, StatsReport, load_inputs,
    reconcile_with, render_to,
};

/// Exit status when the sample file cannot be read or decoded.
pub const EXIT_INPUT: i32 = 1;
/// Exit status when the sample is structurally inconsistent.
pub const EXIT_RECONCILE: i32 = 2;
/// Largest accepted `--interval-sec`, one day.
pub const MAX_INTERVAL_SEC: f64 = 86_400.0;

pub struct StatsCommandConfig<'a> {
    pub sample_path: &'a str,
    pub output: &'a str,
    pub interval_sec: f64,
    pub write_path: Option<&'a str>,
}

#[derive(Debug)]
enum Failure {
    Input(InputError),
    Reconcile(StatsError),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Input(InputError::Invalid { .. }) | Self::Reconcile(_) => EXIT_RECONCILE,
            Self::Input(_) => EXIT_INPUT,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(e) => write!(f, "{e}"),
            Self::Reconcile(e) => write!(f, "{e}"),
        }
    }
}

fn build_report(sample_path: &Path, config: &ReconcileConfig) -> Result<StatsReport, Failure> {
    let inputs = load_inputs(sample_path).map_err(Failure::Input)?;
    reconcile_with(
        config,
        &inputs.meta,
        &inputs.initial,
        &inputs.final_snapshot,
    )
    .map_err(Failure::Reconcile)
}

fn parse_interval(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 && secs <= MAX_INTERVAL_SEC {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

pub fn run(cfg: StatsCommandConfig<'_>) {
    let Some(interval) = parse_interval(cfg.interval_sec) else {
        eprintln!(
            "Invalid --interval-sec value: {}. Expected a finite value in (0, {MAX_INTERVAL_SEC}].",
            cfg.interval_sec
        );
        std::process::exit(EXIT_RECONCILE);
    };
    let reconcile_config = ReconcileConfig { interval };
    let render_config = RenderConfig {
        format: super::parse_output_format(cfg.output),
    };

    let report = match build_report(Path::new(cfg.sample_path), &reconcile_config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("stats for {} failed: {e}", cfg.sample_path);
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = render_to(&report, &render_config, &mut out).and_then(|()| out.flush()) {
        eprintln!("Failed to write report: {e}");
        std::process::exit(EXIT_INPUT);
    }

    if let Some(path) = cfg.write_path
        && !super::write_json(&report, path, "Stats report")
    {
        std::process::exit(EXIT_INPUT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "annotations": {"replicaCount": "1", "replicaStatus": "Running", "replicas": "10.10.10.10"},
        "replicaStats": {"0": {"Replica": "10.10.10.10", "Status": "Online", "DataUpdateIndex": "1"}},
        "initial": {
            "Name": "vol1", "ReadIOPS": "0", "ReplicaCounter": 1, "RevisionCounter": 100,
            "SectorSize": "4096", "Size": "1073741824", "TotalReadBlockCount": "3",
            "TotalReadTime": "10", "TotalWriteTime": "15", "TotalWriteBlockCount": "10",
            "UpTime": 100.0, "UsedBlocks": "1048576", "UsedLogicalBlocks": "1048576",
            "WriteIOPS": "15"
        },
        "final": {
            "Name": "vol1", "ReadIOPS": "0", "ReplicaCounter": 1, "RevisionCounter": 100,
            "SectorSize": "4096", "Size": "SIZE", "TotalReadBlockCount": "4",
            "TotalReadTime": "12", "TotalWriteTime": "16", "TotalWriteBlockCount": "15",
            "UpTime": 108.0, "UsedBlocks": "1048576", "UsedLogicalBlocks": "1048576",
            "WriteIOPS": "20"
        }
    }"#;

    fn write_sample(dir: &tempfile::TempDir, size: &str) -> std::path::PathBuf {
        let path = dir.path().join("sample.json");
        std::fs::write(&path, SAMPLE.replace("SIZE", size)).unwrap();
        path
    }

    #[test]
    fn builds_report_from_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "1073741824");
        let report = build_report(&path, &ReconcileConfig::default()).unwrap();
        assert_eq!(report.replicas.len(), 1);
        assert_eq!(report.deltas.write_blocks, 5);
    }

    #[test]
    fn inconsistent_sample_exits_with_reconcile_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "2147483648");
        let err = build_report(&path, &ReconcileConfig::default()).unwrap_err();
        assert!(matches!(err, Failure::Reconcile(_)));
        assert_eq!(err.exit_code(), EXIT_RECONCILE);
        assert!(err.to_string().contains("size_bytes"));
    }

    #[test]
    fn non_numeric_counter_exits_with_reconcile_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "big");
        let err = build_report(&path, &ReconcileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_RECONCILE);
    }

    #[test]
    fn interval_bounds() {
        assert_eq!(parse_interval(8.0), Some(Duration::from_secs(8)));
        assert_eq!(
            parse_interval(MAX_INTERVAL_SEC),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(parse_interval(MAX_INTERVAL_SEC + 1.0), None);
        assert_eq!(parse_interval(1e300), None);
        assert_eq!(parse_interval(0.0), None);
        assert_eq!(parse_interval(-2.0), None);
        assert_eq!(parse_interval(f64::NAN), None);
        assert_eq!(parse_interval(f64::INFINITY), None);
    }

    #[test]
    fn missing_sample_exits_with_input_status() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            build_report(&dir.path().join("absent.json"), &ReconcileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
