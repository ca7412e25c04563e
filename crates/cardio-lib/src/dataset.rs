use crate::error::Result;
use crate::metrics::heart_rate::{derive_heart_rate, HeartRatePoint, IntervalPolicy};
use crate::wave::{EnrichedWave, WaveRecord};
use chrono::{Duration, NaiveDateTime};

/// A loaded recording: every wave with its peak time, plus the heart-rate
/// series derived from the QRS waves. Only produced by [`Dataset::load`] and
/// [`Dataset::load_with`], and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    start_time: NaiveDateTime,
    waves: Vec<EnrichedWave>,
    heart_rate: Vec<HeartRatePoint>,
}

impl Dataset {
    /// Load with [`IntervalPolicy::Reject`].
    pub fn load(rows: Vec<WaveRecord>, start_time: NaiveDateTime) -> Result<Self> {
        Self::load_with(rows, start_time, IntervalPolicy::default())
    }

    /// Rows are checked with [`WaveRecord::validate`]; the first bad row fails
    /// the load with its 1-based position as the line.
    pub fn load_with(
        rows: Vec<WaveRecord>,
        start_time: NaiveDateTime,
        policy: IntervalPolicy,
    ) -> Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            row.validate(index + 1)?;
        }
        let waves: Vec<EnrichedWave> = rows.into_iter().map(EnrichedWave::from_record).collect();
        let heart_rate = derive_heart_rate(&waves, policy)?;
        log::debug!(
            "loaded {} waves, {} heart-rate points (policy {:?})",
            waves.len(),
            heart_rate.len(),
            policy
        );
        Ok(Self {
            start_time,
            waves,
            heart_rate,
        })
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn waves(&self) -> &[EnrichedWave] {
        &self.waves
    }

    pub fn heart_rate(&self) -> &[HeartRatePoint] {
        &self.heart_rate
    }

    /// Wall-clock time of an offset from the recording start.
    pub fn timestamp_at(&self, offset: Duration) -> NaiveDateTime {
        self.start_time + offset
    }
}
