//! Plain-text and structured rendering of a [`StatsReport`].
//!
//! Rendering never mutates the report and is deterministic: the same report
//! rendered twice in the same format yields identical bytes.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::reconcile::StatsReport;

/// Output representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Fixed-order human-readable text (default).
    #[default]
    Plain,
    /// Pretty-printed JSON mirroring the report field set.
    Structured,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" | "table" | "text" => Ok(Self::Plain),
            "structured" | "json" => Ok(Self::Structured),
            _ => Err(format!("unknown output format '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
}

/// Render `report` into a fresh buffer.
pub fn render(report: &StatsReport, config: &RenderConfig) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    render_to(report, config, &mut buf)?;
    Ok(buf)
}

/// Render `report` into `sink`.
pub fn render_to<W: Write>(
    report: &StatsReport,
    config: &RenderConfig,
    sink: &mut W,
) -> std::io::Result<()> {
    match config.format {
        OutputFormat::Plain => sink.write_all(plain(report).as_bytes()),
        OutputFormat::Structured => {
            serde_json::to_writer_pretty(&mut *sink, report)?;
            sink.write_all(b"\n")
        }
    }
}

/// Human-readable byte count with binary units.
pub fn format_bytes(value: f64) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let mut v = value.abs();
    let units = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut idx = 0usize;
    while v >= 1024.0 && idx < units.len() - 1 {
        v /= 1024.0;
        idx += 1;
    }
    format!("{sign}{v:.2}{}", units[idx])
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn plain(r: &StatsReport) -> String {
    let banner = "=".repeat(68);
    let mut out = String::new();
    out.push_str(&format!("{banner}\nVolume Stats ({})\n{banner}\n", r.name));

    out.push_str("\nPortal Details\n");
    out.push_str(&format!("  IQN:         {}\n", or_dash(&r.portal.iqn)));
    out.push_str(&format!("  Volume:      {}\n", r.name));
    out.push_str(&format!(
        "  Portal:      {}\n",
        or_dash(&r.portal.target_portal)
    ));
    out.push_str(&format!("  Size:        {}\n", or_dash(&r.portal.volume_size)));
    out.push_str(&format!(
        "  Controller:  {}\n",
        or_dash(&r.portal.controller_status)
    ));
    out.push_str(&format!(
        "  Uptime:      {:.2}s   revision: {}   replica counter: {}\n",
        r.up_time_seconds, r.revision_counter, r.replica_count
    ));

    out.push_str("\nReplica Stats\n");
    if r.replicas.is_empty() {
        out.push_str("  (no replicas declared)\n");
    } else {
        out.push_str(&format!(
            "  {:<24} {:<10} {}\n",
            "REPLICA", "STATUS", "DATAUPDATEINDEX"
        ));
        for e in &r.replicas {
            out.push_str(&format!(
                "  {:<24} {:<10} {}\n",
                e.address,
                e.health.to_string(),
                e.data_update_index
            ));
        }
    }

    let p = &r.performance;
    out.push_str(&format!(
        "\nPerformance Stats ({:.2}s window)\n",
        p.window_seconds
    ));
    out.push_str(&format!(
        "  {:<8} {:<8} {:<12} {:<12} {:<12} {:<12}\n",
        "r/s", "w/s", "r(/s)", "w(/s)", "rLat(us)", "wLat(us)"
    ));
    out.push_str(&format!(
        "  {:<8} {:<8} {:<12} {:<12} {:<12.3} {:<12.3}\n",
        r.read_iops,
        r.write_iops,
        format_bytes(p.read_bytes_per_sec),
        format_bytes(p.write_bytes_per_sec),
        p.avg_read_latency_micros,
        p.avg_write_latency_micros
    ));
    let d = &r.deltas;
    out.push_str(&format!(
        "  window: read {} blocks / {}us, write {} blocks / {}us\n",
        d.read_blocks, d.read_time_micros, d.write_blocks, d.write_time_micros
    ));

    out.push_str("\nCapacity Stats\n");
    out.push_str(&format!(
        "  sector: {}   size: {}   logical used: {}   actual used: {}\n",
        r.sector_size_bytes,
        format_bytes(r.size_bytes as f64),
        format_bytes(r.capacity.logical_used_bytes as f64),
        format_bytes(r.capacity.actual_used_bytes as f64)
    ));

    if !r.warnings.is_empty() {
        out.push_str("\nWarnings\n");
        for w in &r.warnings {
            out.push_str(&format!("  {w}\n"));
        }
    }
    out
}
