pub mod classify;
pub mod stats;

use volstats_core::OutputFormat;

/// Parse an `--output` value into the render format.
pub fn parse_output_format(s: &str) -> OutputFormat {
    s.parse().unwrap_or_else(|err| {
        log::warn!("{err}, using plain");
        OutputFormat::Plain
    })
}

/// Write a value as pretty JSON to `path`, reporting the outcome on stderr.
pub fn write_json<T: serde::Serialize>(value: &T, path: &str, label: &str) -> bool {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize {label}: {e}");
            return false;
        }
    };
    match std::fs::write(path, json + "\n") {
        Ok(()) => {
            eprintln!("{label} written to {path}");
            true
        }
        Err(e) => {
            eprintln!("Failed to write {label} to {path}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_variants() {
        assert_eq!(parse_output_format("plain"), OutputFormat::Plain);
        assert_eq!(parse_output_format("table"), OutputFormat::Plain);
    }

    #[test]
    fn test_parse_json_variants() {
        assert_eq!(parse_output_format("json"), OutputFormat::Structured);
        assert_eq!(parse_output_format("structured"), OutputFormat::Structured);
    }

    #[test]
    fn test_parse_unknown_defaults_plain() {
        assert_eq!(parse_output_format("yaml"), OutputFormat::Plain);
        assert_eq!(parse_output_format(""), OutputFormat::Plain);
        assert_eq!(parse_output_format("JSON"), OutputFormat::Plain); // case-sensitive
    }

    #[test]
    fn test_write_json_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let path = path.to_str().unwrap();
        assert!(write_json(&vec![1, 2, 3], path, "Numbers"));
        let back: Vec<u32> = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_write_json_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        assert!(!write_json(&1, path.to_str().unwrap(), "Number"));
    }
}
