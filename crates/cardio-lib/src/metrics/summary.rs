use crate::dataset::Dataset;
use crate::error::{CardioError, Result};
use crate::metrics::heart_rate::HeartRatePoint;
use crate::wave::WaveType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A heart rate together with the wall-clock time of the QRS peak it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmAtTime {
    pub time: NaiveDateTime,
    pub bpm: f64,
}

/// Every metric of a recording, gathered for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub start_time: NaiveDateTime,
    pub premature_p: usize,
    pub premature_qrs: usize,
    pub mean_bpm: f64,
    pub max: BpmAtTime,
    pub min: BpmAtTime,
}

impl Report {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Ok(Self {
            start_time: dataset.start_time(),
            premature_p: count_premature(dataset, &WaveType::P),
            premature_qrs: count_premature(dataset, &WaveType::Qrs),
            mean_bpm: mean_bpm(dataset)?,
            max: max_bpm(dataset)?,
            min: min_bpm(dataset)?,
        })
    }
}

pub fn mean_bpm(dataset: &Dataset) -> Result<f64> {
    let points = dataset.heart_rate();
    if points.is_empty() {
        return Err(CardioError::EmptySeries);
    }
    Ok(points.iter().map(|p| p.bpm).sum::<f64>() / points.len() as f64)
}

/// Highest rate; on ties the earliest point wins.
pub fn max_bpm(dataset: &Dataset) -> Result<BpmAtTime> {
    extreme(dataset, |candidate, best| candidate > best)
}

/// Lowest rate; on ties the earliest point wins.
pub fn min_bpm(dataset: &Dataset) -> Result<BpmAtTime> {
    extreme(dataset, |candidate, best| candidate < best)
}

/// Number of waves of `wave_type` tagged premature. Zero is a valid answer.
pub fn count_premature(dataset: &Dataset, wave_type: &WaveType) -> usize {
    dataset
        .waves()
        .iter()
        .filter(|w| w.is_premature() && w.wave_type() == wave_type)
        .count()
}

fn extreme(dataset: &Dataset, replaces: impl Fn(f64, f64) -> bool) -> Result<BpmAtTime> {
    let mut points = dataset.heart_rate().iter();
    let first = points.next().ok_or(CardioError::EmptySeries)?;
    let best: &HeartRatePoint = points.fold(first, |best, p| {
        if replaces(p.bpm, best.bpm) {
            p
        } else {
            best
        }
    });
    Ok(BpmAtTime {
        time: dataset.timestamp_at(best.peak_offset()),
        bpm: best.bpm,
    })
}
