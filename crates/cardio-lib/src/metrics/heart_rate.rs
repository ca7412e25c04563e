use crate::error::{CardioError, Result};
use crate::wave::{offset_from_ms, EnrichedWave, WaveType};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// What to do when two consecutive QRS peaks coincide, or sit so close that the
/// rate is not finite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPolicy {
    /// Fail with `CardioError::DegenerateInterval`.
    #[default]
    Reject,
    /// Drop the interval and keep going from the later peak.
    Skip,
}

/// Instantaneous heart rate attributed to the later QRS of an RR pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    pub peak_time_ms: f64,
    pub bpm: f64,
}

impl HeartRatePoint {
    pub fn peak_offset(&self) -> Duration {
        offset_from_ms(self.peak_time_ms)
    }
}

/// Derive beat-to-beat BPM from the QRS waves, in input order.
///
/// Fewer than two QRS waves yield an empty series. Peaks are not re-sorted, so a
/// recording that runs backwards produces negative rates rather than an error.
pub fn derive_heart_rate(
    waves: &[EnrichedWave],
    policy: IntervalPolicy,
) -> Result<Vec<HeartRatePoint>> {
    let mut points = Vec::new();
    let mut previous: Option<f64> = None;
    for (index, wave) in waves
        .iter()
        .filter(|w| *w.wave_type() == WaveType::Qrs)
        .enumerate()
    {
        let current = wave.peak_time_ms;
        if let Some(prev) = previous {
            let delta_s = (current - prev) / 1000.0;
            let bpm = 60.0 / delta_s;
            if !bpm.is_finite() {
                match policy {
                    IntervalPolicy::Reject => {
                        return Err(CardioError::DegenerateInterval {
                            index,
                            peak_time_ms: current,
                        });
                    }
                    IntervalPolicy::Skip => {
                        log::warn!(
                            "skipping degenerate RR interval at QRS wave #{index} ({current} ms)"
                        );
                        previous = Some(current);
                        continue;
                    }
                }
            }
            points.push(HeartRatePoint {
                peak_time_ms: current,
                bpm,
            });
        }
        previous = Some(current);
    }
    Ok(points)
}
