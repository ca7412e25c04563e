use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardioError>;

/// Failures surfaced by loading a recording or querying its metrics.
#[derive(Debug, Error)]
pub enum CardioError {
    /// A row of the recording could not be turned into a wave.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited record: {0}")]
    Csv(#[from] csv::Error),

    /// A BPM reducer was asked about a recording with fewer than two QRS waves.
    #[error("no heart-rate points: at least two QRS waves are required")]
    EmptySeries,

    /// Two consecutive QRS peaks are equal, or so close that the rate is not finite.
    #[error("degenerate RR interval at QRS wave #{index} (peak at {peak_time_ms} ms)")]
    DegenerateInterval { index: usize, peak_time_ms: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CardioError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CardioError::Parse {
            line,
            message: message.into(),
        }
    }
}
