//! Types and scoring rubric for the compliance audit module.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::ReportPeriod;

/// Owner id used for operations not attributable to a single user.
pub const SYSTEM_PRINCIPAL: &str = "system";

/// Privacy-relevant operations the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOperation {
    Encrypt,
    Decrypt,
    Backup,
    Restore,
    Rotate,
    Cleanup,
    Anonymize,
    Audit,
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditOperation::Encrypt => "encrypt",
            AuditOperation::Decrypt => "decrypt",
            AuditOperation::Backup => "backup",
            AuditOperation::Restore => "restore",
            AuditOperation::Rotate => "rotate",
            AuditOperation::Cleanup => "cleanup",
            AuditOperation::Anonymize => "anonymize",
            AuditOperation::Audit => "audit",
        };
        write!(f, "{}", name)
    }
}

/// Privacy technique applied by the audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyTechnique {
    Aes256Gcm,
    DifferentialPrivacy,
    Sha256Integrity,
    None,
}

impl PrivacyTechnique {
    pub fn involves_encryption(&self) -> bool {
        matches!(self, PrivacyTechnique::Aes256Gcm)
    }
}

impl std::fmt::Display for PrivacyTechnique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrivacyTechnique::Aes256Gcm => "aes-256-gcm",
            PrivacyTechnique::DifferentialPrivacy => "differential-privacy",
            PrivacyTechnique::Sha256Integrity => "sha-256-integrity",
            PrivacyTechnique::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Deterministic compliance scoring rubric.
///
/// Base 0.5; +0.3 if the technique involves encryption; +0.2 for
/// differential privacy; +0.15 for anonymize operations; +0.1 for audit
/// operations; capped at 1.0.
pub fn compliance_score(operation: AuditOperation, technique: PrivacyTechnique) -> f64 {
    let mut score: f64 = 0.5;
    if technique.involves_encryption() {
        score += 0.3;
    }
    if technique == PrivacyTechnique::DifferentialPrivacy {
        score += 0.2;
    }
    if operation == AuditOperation::Anonymize {
        score += 0.15;
    }
    if operation == AuditOperation::Audit {
        score += 0.1;
    }
    score.min(1.0)
}

/// One privacy-relevant operation, recorded once and never mutated.
///
/// Details never contain plaintext, passphrases, or key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub owner_id: String,
    pub timestamp: DateTime<Utc>,
    pub operation: AuditOperation,
    pub data_type: String,
    pub technique: PrivacyTechnique,
    pub compliance_score: f64,
    pub details: BTreeMap<String, String>,
}

impl AuditEntry {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_log_string(&self) -> String {
        format!(
            "[{}] {} owner={} data={} technique={} score={:.2}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.owner_id,
            self.data_type,
            self.technique,
            self.compliance_score,
        )
    }
}

/// Generate a unique audit entry id.
pub fn generate_entry_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes[..]);
    hex::encode(bytes)
}

/// Audit log configuration.
#[derive(Debug, Clone)]
pub struct AuditorConfig {
    /// Mirror entries onto the `tracing` subscriber.
    pub log_to_tracing: bool,
    /// Entries scoring below this value are flagged in compliance reports.
    pub flag_threshold: f64,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self { log_to_tracing: true, flag_threshold: 0.6 }
    }
}

/// Periodic aggregation of an owner's audit entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub owner_id: String,
    pub period: ReportPeriod,
    pub overall_score: f64,
    pub entry_count: usize,
    pub flags: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
