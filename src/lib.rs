//! MindVault privacy engine.
//!
//! The data-protection core of the MindVault wellness platform:
//!
//! - [`privacy`]: calibrated Laplace/Gaussian noise for differential
//!   privacy, drawn from the OS CSPRNG
//! - [`crypto`]: passphrase-based key derivation and AES-256-GCM
//!   authenticated encryption
//! - [`backup`]: encrypted, integrity-checked, time-bounded backup
//!   envelopes
//! - [`analytics`]: cohort aggregation with a minimum-cohort gate and
//!   per-statistic noising
//! - [`audit`]: append-only compliance logging with a deterministic
//!   scoring rubric
//! - [`insight`]: the boundary to the external insight collaborator
//!
//! All services are stateless pure functions over their inputs; the only
//! shared state is the append-only audit log and the backup store. Keys
//! are derived per call and zeroized on drop - there is no key cache.
//!
//! # Example
//!
//! ```
//! use mindvault_core::{EngineConfig, PrivacyEngine};
//!
//! let engine = PrivacyEngine::new(EngineConfig::default()).unwrap();
//! let record = engine
//!     .cipher()
//!     .encrypt(b"journal entry", "user passphrase")
//!     .unwrap();
//! let plaintext = engine.cipher().decrypt(&record, "user passphrase").unwrap();
//! assert_eq!(plaintext, b"journal entry");
//! ```

use std::sync::Arc;

pub mod analytics;
pub mod audit;
pub mod backup;
pub mod config;
pub mod crypto;
pub mod insight;
pub mod privacy;

pub use analytics::{
    AnalyticsError, CohortAnalyticsAggregator, CohortReport, NoisedStatistic, ReportPeriod,
    StatisticKind, UserRecord,
};
pub use audit::{
    AuditEntry, AuditOperation, AuditorConfig, ComplianceAuditor, ComplianceReport,
    PrivacyTechnique,
};
pub use backup::{BackupError, BackupManager, BackupState, EncryptedBackup};
pub use config::{ConfigError, EngineConfig};
pub use crypto::{AuthenticatedCipher, CryptoError, EncryptedRecord};
pub use insight::{InsightProvider, OpaqueAggregate};
pub use privacy::{NoiseEngine, NoiseError, NoiseMechanism, PrivacyBudget};

/// Composition point wiring the cipher, backup manager, aggregator, and a
/// shared auditor from one validated [`EngineConfig`].
///
/// Components stay independently usable; the facade only wires them.
pub struct PrivacyEngine {
    auditor: Arc<ComplianceAuditor>,
    cipher: AuthenticatedCipher,
    backups: BackupManager,
    analytics: CohortAnalyticsAggregator,
}

impl PrivacyEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let auditor = Arc::new(ComplianceAuditor::new(config.audit.clone()));

        let cipher = AuthenticatedCipher::new(config.key_iterations)
            .map_err(|_| ConfigError::IterationsTooLow(config.key_iterations))?
            .with_auditor(Arc::clone(&auditor));
        let backups = BackupManager::new(cipher.clone()).with_auditor(Arc::clone(&auditor));
        let analytics =
            CohortAnalyticsAggregator::new(config.default_budget, config.min_cohort_size)
                .map_err(|_| ConfigError::CohortTooSmall(config.min_cohort_size))?
                .with_auditor(Arc::clone(&auditor));

        Ok(Self { auditor, cipher, backups, analytics })
    }

    pub fn cipher(&self) -> &AuthenticatedCipher {
        &self.cipher
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn analytics(&self) -> &CohortAnalyticsAggregator {
        &self.analytics
    }

    pub fn auditor(&self) -> &Arc<ComplianceAuditor> {
        &self.auditor
    }
}
