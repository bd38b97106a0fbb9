//! Sample aggregation, latency histograms and the live collector task.
mod aggregate;
mod collector;
mod histogram;
mod types;


pub use aggregate::Aggregator;
pub(crate) use aggregate::{BYTES_PER_MB, percent};
pub use collector::{CollectorConfig, LIVE_UPDATE_INTERVAL, spawn_collector};
pub use histogram::LatencyHistogram;
pub use types::{LiveStats, Outcome, Sample, TestResults, TimelinePoint};
