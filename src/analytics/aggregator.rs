//! Cohort aggregation with per-statistic noising.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditOperation, ComplianceAuditor, PrivacyTechnique};
use crate::privacy::{NoiseEngine, NoiseError, PrivacyBudget};

use super::report::{CohortReport, NoisedStatistic, ReportPeriod, StatisticKind, UserRecord};

/// Smallest cohort whose statistics may be published.
pub const DEFAULT_MIN_COHORT_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Report generation aborted; wait for more data, do not retry
    /// automatically.
    #[error("cohort too small to publish: {size} records, minimum {minimum}")]
    InsufficientCohort { size: usize, minimum: usize },
    #[error("minimum cohort size {0} is too small to protect individuals")]
    InvalidMinimumCohort(usize),
    #[error("non-finite value for metric {metric}")]
    InvalidMetric { metric: String },
    #[error(transparent)]
    Noise(#[from] NoiseError),
}

/// Aggregates per-user records into noised cohort findings.
#[derive(Debug)]
pub struct CohortAnalyticsAggregator {
    noise: NoiseEngine,
    budget: PrivacyBudget,
    min_cohort_size: usize,
    auditor: Option<Arc<ComplianceAuditor>>,
}

impl CohortAnalyticsAggregator {
    pub fn new(budget: PrivacyBudget, min_cohort_size: usize) -> Result<Self, AnalyticsError> {
        budget.validate()?;
        if min_cohort_size < 2 {
            return Err(AnalyticsError::InvalidMinimumCohort(min_cohort_size));
        }
        Ok(Self { noise: NoiseEngine::new(), budget, min_cohort_size, auditor: None })
    }

    /// Attach a compliance auditor. Observing only; never blocks.
    pub fn with_auditor(mut self, auditor: Arc<ComplianceAuditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn min_cohort_size(&self) -> usize {
        self.min_cohort_size
    }

    pub fn budget(&self) -> &PrivacyBudget {
        &self.budget
    }

    /// Aggregate `records` into a noised cohort report for `period`.
    ///
    /// The minimum-cohort gate runs before any aggregation or noising, so
    /// a too-small cohort never reaches the noise stage. Per-user raw
    /// values never appear in the report; every published statistic -
    /// including the cohort size - is noised independently.
    pub fn generate_cohort_report(
        &self,
        records: &[UserRecord],
        period: ReportPeriod,
    ) -> Result<CohortReport, AnalyticsError> {
        let size = records.len();
        if size < self.min_cohort_size {
            tracing::warn!(minimum = self.min_cohort_size, "cohort below publishing minimum");
            return Err(AnalyticsError::InsufficientCohort {
                size,
                minimum: self.min_cohort_size,
            });
        }

        for record in records {
            for (metric, value) in &record.metrics {
                if !value.is_finite() {
                    return Err(AnalyticsError::InvalidMetric { metric: metric.clone() });
                }
            }
        }

        // raw aggregates over the cohort; these stay internal
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            for (metric, value) in &record.metrics {
                let slot = sums.entry(metric.as_str()).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
            for (name, value) in &record.attributes {
                *frequencies.entry(format!("{}={}", name, value)).or_insert(0) += 1;
            }
        }

        let mut findings = Vec::new();
        for (metric, (sum, count)) in &sums {
            let mean = sum / *count as f64;
            let rate = *count as f64 / size as f64;
            findings.push(NoisedStatistic {
                metric: (*metric).to_string(),
                kind: StatisticKind::Mean,
                value: self.noise.apply_privacy(mean, &self.budget)?,
            });
            findings.push(NoisedStatistic {
                metric: (*metric).to_string(),
                kind: StatisticKind::Rate,
                value: self.noise.apply_privacy(rate, &self.budget)?,
            });
        }
        for (key, count) in &frequencies {
            findings.push(NoisedStatistic {
                metric: key.clone(),
                kind: StatisticKind::Frequency,
                value: self.noise.apply_privacy(*count as f64, &self.budget)?,
            });
        }

        let report = CohortReport {
            id: Uuid::new_v4(),
            period,
            cohort_size: self.noise.apply_privacy(size as f64, &self.budget)?,
            budget: self.budget,
            findings,
            generated_at: Utc::now(),
        };

        metrics::counter!("mindvault_cohort_reports_total").increment(1);
        tracing::info!(findings = report.findings.len(), "generated cohort report");
        if let Some(auditor) = &self.auditor {
            let mut details = BTreeMap::new();
            details.insert("findings".to_string(), report.findings.len().to_string());
            details.insert("epsilon".to_string(), self.budget.epsilon.to_string());
            auditor.log(
                "cohort",
                AuditOperation::Anonymize,
                "cohort_statistics",
                PrivacyTechnique::DifferentialPrivacy,
                details,
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
