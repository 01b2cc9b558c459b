//! Core types: intervals, time windows, free-slot computation

pub mod interval;
pub mod time;
pub mod tracing;

pub use interval::{Interval, free_slots, merge_busy};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
