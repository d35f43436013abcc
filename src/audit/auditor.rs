//! Compliance auditor: append-only log and report generation.
//!
//! The log is held behind a `parking_lot::RwLock` and only ever appended
//! to; nothing in the engine mutates or deletes entries. Retention and
//! pruning are external policy, applied to the output of
//! [`ComplianceAuditor::export_json`].

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::analytics::ReportPeriod;

use super::types::{
    compliance_score, generate_entry_id, AuditEntry, AuditOperation, AuditorConfig,
    ComplianceReport, PrivacyTechnique,
};

/// Records privacy-relevant operations and scores them.
///
/// Logging is infallible and cheap; a caller's operation never fails or
/// blocks because of the auditor.
#[derive(Debug)]
pub struct ComplianceAuditor {
    config: AuditorConfig,
    entries: RwLock<Vec<AuditEntry>>,
}

impl ComplianceAuditor {
    pub fn new(config: AuditorConfig) -> Self {
        Self { config, entries: RwLock::new(Vec::new()) }
    }

    /// Record one operation and return the entry that was appended.
    pub fn log(
        &self,
        owner_id: &str,
        operation: AuditOperation,
        data_type: &str,
        technique: PrivacyTechnique,
        details: BTreeMap<String, String>,
    ) -> AuditEntry {
        let entry = AuditEntry {
            id: generate_entry_id(),
            owner_id: owner_id.to_string(),
            timestamp: Utc::now(),
            operation,
            data_type: data_type.to_string(),
            technique,
            compliance_score: compliance_score(operation, technique),
            details,
        };
        if self.config.log_to_tracing {
            tracing::info!(target: "mindvault::audit", "{}", entry.to_log_string());
        }
        metrics::counter!("mindvault_audit_entries_total").increment(1);
        self.entries.write().push(entry.clone());
        entry
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().clone()
    }

    /// Entries for one owner inside a reporting period.
    pub fn entries_for(&self, owner_id: &str, period: &ReportPeriod) -> Vec<AuditEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.owner_id == owner_id && period.contains(e.timestamp))
            .cloned()
            .collect()
    }

    /// Serialize the full log for external retention tooling.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        let entries = self.entries.read();
        serde_json::to_string_pretty(&*entries)
    }

    /// Aggregate an owner's entries over `period` into a compliance
    /// report. Report generation is itself an audited operation.
    pub fn generate_compliance_report(
        &self,
        owner_id: &str,
        period: ReportPeriod,
    ) -> ComplianceReport {
        let entries = self.entries_for(owner_id, &period);
        let entry_count = entries.len();
        let overall_score = if entry_count == 0 {
            0.0
        } else {
            entries.iter().map(|e| e.compliance_score).sum::<f64>() / entry_count as f64
        };

        let mut flags = Vec::new();
        let mut recommendations = Vec::new();

        if entry_count == 0 {
            flags.push("no audited operations in period".to_string());
        }

        let low = entries
            .iter()
            .filter(|e| e.compliance_score < self.config.flag_threshold)
            .count();
        if low > 0 {
            flags.push(format!(
                "{} operation(s) scored below {:.2}",
                low, self.config.flag_threshold
            ));
            recommendations.push(
                "Prefer encrypted or differentially private operations for user data."
                    .to_string(),
            );
        }

        let violations = entries
            .iter()
            .filter(|e| e.details.get("outcome").is_some_and(|o| o == "integrity_violation"))
            .count();
        if violations > 0 {
            flags.push(format!("{} integrity violation(s) recorded", violations));
            recommendations
                .push("Discard affected backups and investigate storage tampering.".to_string());
        }

        let report = ComplianceReport {
            owner_id: owner_id.to_string(),
            period,
            overall_score,
            entry_count,
            flags,
            recommendations,
            generated_at: Utc::now(),
        };

        let mut details = BTreeMap::new();
        details.insert("entry_count".to_string(), entry_count.to_string());
        self.log(
            owner_id,
            AuditOperation::Audit,
            "compliance_report",
            PrivacyTechnique::None,
            details,
        );

        report
    }
}

impl Default for ComplianceAuditor {
    fn default() -> Self {
        Self::new(AuditorConfig::default())
    }
}

#[cfg(test)]
#[path = "auditor_tests.rs"]
mod tests;
