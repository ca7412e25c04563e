use crate::error::{CardioError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag value marking a wave that arrived ahead of the expected rhythm.
pub const PREMATURE_TAG: &str = "premature";

/// Largest accepted onset/offset, roughly 31 years of recording. Keeps peak
/// offsets representable as nanosecond `Duration`s.
pub const MAX_OFFSET_MS: f64 = 1.0e12;

/// Annotated wave kind. Labels outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WaveType {
    P,
    Qrs,
    T,
    /// Segment marked invalid by the annotator.
    Inv,
    Other(String),
}

impl WaveType {
    pub fn as_str(&self) -> &str {
        match self {
            WaveType::P => "P",
            WaveType::Qrs => "QRS",
            WaveType::T => "T",
            WaveType::Inv => "INV",
            WaveType::Other(label) => label,
        }
    }
}

impl FromStr for WaveType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "P" => WaveType::P,
            "QRS" => WaveType::Qrs,
            "T" => WaveType::T,
            "INV" => WaveType::Inv,
            other => WaveType::Other(other.to_string()),
        })
    }
}

impl From<String> for WaveType {
    fn from(label: String) -> Self {
        match label.parse() {
            Ok(wave_type) => wave_type,
            Err(never) => match never {},
        }
    }
}

impl From<WaveType> for String {
    fn from(wave_type: WaveType) -> Self {
        wave_type.as_str().to_string()
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotated wave, offsets in milliseconds from the recording start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveRecord {
    pub wave_type: WaveType,
    pub onset_ms: f64,
    pub offset_ms: f64,
    pub tag: Option<String>,
}

impl WaveRecord {
    pub fn new(wave_type: WaveType, onset_ms: f64, offset_ms: f64, tag: Option<&str>) -> Self {
        Self {
            wave_type,
            onset_ms,
            offset_ms,
            tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    pub fn is_premature(&self) -> bool {
        self.tag.as_deref() == Some(PREMATURE_TAG)
    }

    /// Check the offsets are finite, within `[0, MAX_OFFSET_MS]`, and that the
    /// wave does not end before it starts. `line` is reported on failure.
    pub fn validate(&self, line: usize) -> Result<()> {
        check_offset(self.onset_ms, "onset", line)?;
        check_offset(self.offset_ms, "offset", line)?;
        if self.offset_ms < self.onset_ms {
            return Err(CardioError::parse(
                line,
                format!(
                    "offset {} ms precedes onset {} ms",
                    self.offset_ms, self.onset_ms
                ),
            ));
        }
        Ok(())
    }
}

fn check_offset(value: f64, name: &str, line: usize) -> Result<()> {
    if !(0.0..=MAX_OFFSET_MS).contains(&value) {
        return Err(CardioError::parse(
            line,
            format!("{name} must be a finite millisecond offset in [0, {MAX_OFFSET_MS}]: {value}"),
        ));
    }
    Ok(())
}

/// A wave together with its peak time, the midpoint of onset and offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedWave {
    #[serde(flatten)]
    pub record: WaveRecord,
    pub peak_time_ms: f64,
}

impl EnrichedWave {
    pub fn from_record(record: WaveRecord) -> Self {
        let peak_time_ms = record.onset_ms + (record.offset_ms - record.onset_ms) / 2.0;
        Self {
            record,
            peak_time_ms,
        }
    }

    pub fn wave_type(&self) -> &WaveType {
        &self.record.wave_type
    }

    pub fn is_premature(&self) -> bool {
        self.record.is_premature()
    }

    /// Peak time as an offset to add to the recording start.
    pub fn peak_offset(&self) -> Duration {
        offset_from_ms(self.peak_time_ms)
    }
}

/// Converts fractional milliseconds to a `Duration` at nanosecond resolution.
/// Offsets accepted by [`WaveRecord::validate`] never saturate.
pub fn offset_from_ms(ms: f64) -> Duration {
    Duration::nanoseconds((ms * 1_000_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_are_case_sensitive() {
        assert_eq!("QRS".parse::<WaveType>().unwrap(), WaveType::Qrs);
        assert_eq!("INV".parse::<WaveType>().unwrap(), WaveType::Inv);
        assert_eq!(
            "qrs".parse::<WaveType>().unwrap(),
            WaveType::Other("qrs".into())
        );
    }

    #[test]
    fn peak_time_is_midpoint() {
        let wave = EnrichedWave::from_record(WaveRecord::new(WaveType::P, 100.0, 151.0, None));
        assert_eq!(wave.peak_time_ms, 125.5);
        assert!(wave.peak_time_ms >= wave.record.onset_ms);
        assert!(wave.peak_time_ms <= wave.record.offset_ms);
        assert_eq!(wave.peak_offset(), Duration::microseconds(125_500));
    }

    #[test]
    fn peak_time_stays_inside_huge_waves() {
        let wave = EnrichedWave::from_record(WaveRecord::new(
            WaveType::Qrs,
            1.7e308,
            1.7e308,
            None,
        ));
        assert!(wave.peak_time_ms.is_finite());
        assert_eq!(wave.peak_time_ms, 1.7e308);
    }

    #[test]
    fn validate_rejects_bad_offsets() {
        let bad = [
            (f64::NAN, 10.0),
            (0.0, f64::INFINITY),
            (-1.0, 10.0),
            (500.0, 100.0),
            (0.0, MAX_OFFSET_MS * 2.0),
        ];
        for (onset, offset) in bad {
            let wave = WaveRecord::new(WaveType::P, onset, offset, None);
            assert!(
                matches!(wave.validate(7), Err(CardioError::Parse { line: 7, .. })),
                "accepted {onset}..{offset}"
            );
        }
        assert!(WaveRecord::new(WaveType::P, 0.0, MAX_OFFSET_MS, None)
            .validate(1)
            .is_ok());
    }

    #[test]
    fn largest_offset_converts_without_saturating() {
        let offset = offset_from_ms(MAX_OFFSET_MS);
        assert_eq!(offset, Duration::milliseconds(1_000_000_000_000));
    }

    #[test]
    fn empty_tag_is_untagged() {
        let wave = WaveRecord::new(WaveType::Qrs, 0.0, 10.0, Some(""));
        assert_eq!(wave.tag, None);
        assert!(!wave.is_premature());
        assert!(WaveRecord::new(WaveType::Qrs, 0.0, 10.0, Some("premature")).is_premature());
    }
}
