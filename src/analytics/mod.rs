//! Cohort-level analytics with differential privacy.
//!
//! Aggregates per-user therapeutic metrics into cohort findings. A
//! minimum-cohort gate fails closed before any aggregation, and every
//! published statistic is noised independently.

pub mod aggregator;
pub mod report;

pub use aggregator::{AnalyticsError, CohortAnalyticsAggregator, DEFAULT_MIN_COHORT_SIZE};
pub use report::{CohortReport, NoisedStatistic, ReportPeriod, StatisticKind, UserRecord};
