//! Boundary to the external insight collaborator.
//!
//! Natural-language "insight" generation over cohort data is performed by
//! an external service (an LLM behind the application layer). That service
//! must never see raw plaintext, so the only value that crosses this
//! boundary is an [`OpaqueAggregate`] built from an already-noised
//! [`CohortReport`].

use serde::Serialize;

use crate::analytics::CohortReport;

/// Noised, aggregate-only view of cohort data.
///
/// Constructible only from a [`CohortReport`], which contains no per-user
/// values; there is deliberately no constructor taking arbitrary data.
#[derive(Debug, Clone, Serialize)]
pub struct OpaqueAggregate {
    report: serde_json::Value,
}

impl OpaqueAggregate {
    pub fn from_report(report: &CohortReport) -> Result<Self, serde_json::Error> {
        Ok(Self { report: serde_json::to_value(report)? })
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.report
    }
}

/// External collaborator that turns aggregates into human-readable
/// insights. No contract is enforced on the output.
pub trait InsightProvider {
    fn analyze(&self, aggregate: &OpaqueAggregate) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::analytics::{ReportPeriod, UserRecord};
    use crate::analytics::CohortAnalyticsAggregator;
    use crate::privacy::PrivacyBudget;

    struct EchoProvider;

    impl InsightProvider for EchoProvider {
        fn analyze(&self, aggregate: &OpaqueAggregate) -> Vec<String> {
            vec![format!("fields: {}", aggregate.as_json()["findings"])]
        }
    }

    #[test]
    fn test_aggregate_carries_no_user_ids() {
        let records: Vec<UserRecord> = (0..10)
            .map(|i| UserRecord::new(format!("user-{i}")).metric("sentiment", 0.5))
            .collect();
        let aggregator =
            CohortAnalyticsAggregator::new(PrivacyBudget::default(), 10).unwrap();
        let report = aggregator
            .generate_cohort_report(&records, ReportPeriod::new(Utc::now(), Utc::now()))
            .unwrap();

        let aggregate = OpaqueAggregate::from_report(&report).unwrap();
        let text = aggregate.as_json().to_string();
        assert!(!text.contains("user-0"));

        let insights = EchoProvider.analyze(&aggregate);
        assert_eq!(insights.len(), 1);
    }
}
