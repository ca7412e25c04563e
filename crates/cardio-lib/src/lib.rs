pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod metrics;
pub mod wave;

pub use dataset::*;
pub use error::{CardioError, Result};
pub use metrics::heart_rate::*;
pub use metrics::summary::*;
pub use wave::*;
