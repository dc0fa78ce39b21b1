// Reports module - movement alignment and performance statistics

pub mod alignment;
pub mod performance;

pub use alignment::{align_movements, AlignedMovement, MatchKind};
pub use performance::{
    calculate_performance, find_extremes, DailyGain, DietzReturn, GainLossExtremes,
    PerformanceReport,
};
