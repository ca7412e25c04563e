use crate::error::{CardioError, Result};
use crate::metrics::heart_rate::IntervalPolicy;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Analysis settings read from a TOML file.
///
/// ```toml
/// start_time = "2021-02-12T09:30:00"
/// degenerate_intervals = "skip"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub degenerate_intervals: IntervalPolicy,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(text).map_err(|e| CardioError::Config(e.to_string()))?;
        if let Some(raw) = &config.start_time {
            parse_start_time(raw)?;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn start_time(&self) -> Result<Option<NaiveDateTime>> {
        self.start_time.as_deref().map(parse_start_time).transpose()
    }
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a recording start given as an ISO-8601 date-time or a bare date
/// (midnight).
pub fn parse_start_time(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CardioError::Config(format!("unrecognised start time: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_without_start() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config.degenerate_intervals, IntervalPolicy::Reject);
        assert_eq!(config.start_time().unwrap(), None);
    }

    #[test]
    fn reads_policy_and_start() {
        let config = AnalysisConfig::from_toml_str(
            "start_time = \"2021-02-12 09:30:00\"\ndegenerate_intervals = \"skip\"\n",
        )
        .unwrap();
        assert_eq!(config.degenerate_intervals, IntervalPolicy::Skip);
        let start = config.start_time().unwrap().unwrap();
        assert_eq!(start.to_string(), "2021-02-12 09:30:00");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_dates() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("threshold = 3\n"),
            Err(CardioError::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("start_time = \"yesterday\"\n"),
            Err(CardioError::Config(_))
        ));
    }

    #[test]
    fn start_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 2, 12)
            .unwrap()
            .and_hms_milli_opt(9, 30, 0, 250)
            .unwrap();
        assert_eq!(parse_start_time("2021-02-12T09:30:00.250").unwrap(), expected);
        assert_eq!(
            parse_start_time("2021-02-12").unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 12)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "degenerate_intervals = \"reject\"\n").unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
