//! Analytics input and report types.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::privacy::PrivacyBudget;

/// Per-user therapeutic metrics supplied by the analytics collaborator.
///
/// Raw records never leave the aggregator; only noised cohort statistics
/// are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    /// Numeric metrics, e.g. `sentiment`, `session_minutes`.
    pub metrics: BTreeMap<String, f64>,
    /// Categorical attributes, e.g. `mood=anxious`.
    pub attributes: BTreeMap<String, String>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            metrics: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Half-open reporting interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The trailing `days`-day window ending now.
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self { start: end - Duration::days(days), end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Kind of aggregate a finding carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatisticKind {
    /// Mean of a numeric metric over the users reporting it.
    Mean,
    /// Share of the cohort reporting a numeric metric.
    Rate,
    /// Number of users with a given attribute value.
    Frequency,
}

/// One noised cohort-level statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoisedStatistic {
    pub metric: String,
    pub kind: StatisticKind,
    pub value: f64,
}

/// Cohort findings for one period, noised and safe to publish.
///
/// The budget is attached for auditability and is immutable once here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReport {
    pub id: Uuid,
    pub period: ReportPeriod,
    /// Noised cohort size; the raw size never leaves the aggregator.
    pub cohort_size: f64,
    pub budget: PrivacyBudget,
    pub findings: Vec<NoisedStatistic>,
    pub generated_at: DateTime<Utc>,
}
