// ============================================================================
// AdminDb — Embedded Database (redb)
// ============================================================================
// Persistent storage for the reward configuration singleton.
// Default path: ~/.travel-admin/admin.redb (override via TRAVEL_DB_PATH env var)
// ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::rewards::{
    apply_update, PartialRewardConfiguration, RewardConfiguration, RewardError, RewardRepository,
    ValidationPolicy,
};

// Table definitions
const REWARDS: TableDefinition<&str, &[u8]> = TableDefinition::new("rewards");

/// Key of the single live configuration document
const REWARD_CONFIG_KEY: &str = "rewards:config";

/// Embedded database for the admin backend
#[derive(Clone)]
pub struct AdminDb {
    db: Arc<Database>,
    path: PathBuf,
    policy: ValidationPolicy,
}

impl AdminDb {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses TRAVEL_DB_PATH env var or ~/.travel-admin/admin.redb
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var("TRAVEL_DB_PATH") {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
            let admin_dir = home.join(".travel-admin");
            std::fs::create_dir_all(&admin_dir)
                .map_err(|e| anyhow!("Failed to create .travel-admin directory: {}", e))?;
            admin_dir.join("admin.redb")
        };

        info!("Opening database at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure tables exist by doing a write transaction
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(REWARDS)
                .map_err(|e| anyhow!("Failed to create rewards table: {}", e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        info!("Database ready");

        Ok(Self {
            db: Arc::new(db),
            path: db_path,
            policy: ValidationPolicy::default(),
        })
    }

    /// Use a different validation policy for updates
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    // ========================================================================
    // Reward Configuration Operations
    // ========================================================================

    /// Stored document, if one has been created
    pub fn load_rewards(&self) -> Result<Option<RewardConfiguration>, RewardError> {
        match self.raw_rewards()? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialized document exactly as stored
    pub fn raw_rewards(&self) -> Result<Option<Vec<u8>>, RewardError> {
        let read_txn = self.db.begin_read().map_err(|e| storage("begin read", e))?;
        let table = read_txn.open_table(REWARDS).map_err(|e| storage("open rewards table", e))?;

        let value = table
            .get(REWARD_CONFIG_KEY)
            .map_err(|e| storage("get reward config", e))?
            .map(|v| v.value().to_vec());
        Ok(value)
    }

    /// Stored document, creating the defaulted one on first access
    pub fn get_or_init_rewards(&self) -> Result<RewardConfiguration, RewardError> {
        if let Some(config) = self.load_rewards()? {
            return Ok(config);
        }

        let write_txn = self.db.begin_write().map_err(|e| storage("begin write", e))?;
        let config = {
            let mut table = write_txn
                .open_table(REWARDS)
                .map_err(|e| storage("open rewards table", e))?;
            // Another writer may have created it since the read above
            let existing = table
                .get(REWARD_CONFIG_KEY)
                .map_err(|e| storage("get reward config", e))?
                .map(|v| v.value().to_vec());
            match existing {
                Some(bytes) => decode(&bytes)?,
                None => {
                    let config = RewardConfiguration::default();
                    let value = encode(&config)?;
                    table
                        .insert(REWARD_CONFIG_KEY, value.as_slice())
                        .map_err(|e| storage("insert reward config", e))?;
                    info!("Created default reward configuration");
                    config
                }
            }
        };
        write_txn.commit().map_err(|e| storage("commit", e))?;

        Ok(config)
    }

    /// Merge a patch inside one write transaction. A rejected patch aborts
    /// the transaction, leaving the stored bytes untouched.
    pub fn update_rewards(
        &self,
        patch: &PartialRewardConfiguration,
    ) -> Result<RewardConfiguration, RewardError> {
        let write_txn = self.db.begin_write().map_err(|e| storage("begin write", e))?;
        let outcome = {
            let mut table = write_txn
                .open_table(REWARDS)
                .map_err(|e| storage("open rewards table", e))?;
            let existing = table
                .get(REWARD_CONFIG_KEY)
                .map_err(|e| storage("get reward config", e))?
                .map(|v| v.value().to_vec());
            let current = match existing {
                Some(bytes) => decode(&bytes)?,
                None => RewardConfiguration::default(),
            };

            match apply_update(&current, patch, self.policy, Utc::now()) {
                Ok(next) => {
                    let value = encode(&next)?;
                    table
                        .insert(REWARD_CONFIG_KEY, value.as_slice())
                        .map_err(|e| storage("insert reward config", e))?;
                    Ok(next)
                }
                Err(errors) => Err(errors),
            }
        };

        match outcome {
            Ok(next) => {
                write_txn.commit().map_err(|e| storage("commit", e))?;
                debug!("Stored reward configuration ({})", next.last_updated);
                Ok(next)
            }
            Err(errors) => {
                write_txn.abort().map_err(|e| storage("abort", e))?;
                Err(RewardError::Validation(errors))
            }
        }
    }
}

fn storage(context: &str, err: impl std::fmt::Display) -> RewardError {
    RewardError::Storage(format!("Failed to {}: {}", context, err))
}

fn encode(config: &RewardConfiguration) -> Result<Vec<u8>, RewardError> {
    bincode::serialize(config)
        .map_err(|e| RewardError::Storage(format!("Failed to serialize reward config: {}", e)))
}

fn decode(bytes: &[u8]) -> Result<RewardConfiguration, RewardError> {
    bincode::deserialize(bytes)
        .map_err(|e| RewardError::Storage(format!("Failed to deserialize reward config: {}", e)))
}

#[async_trait]
impl RewardRepository for AdminDb {
    async fn get(&self) -> Result<RewardConfiguration, RewardError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.get_or_init_rewards())
            .await
            .map_err(RewardError::storage)?
    }

    async fn update(
        &self,
        patch: PartialRewardConfiguration,
    ) -> Result<RewardConfiguration, RewardError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.update_rewards(&patch))
            .await
            .map_err(RewardError::storage)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::{
        PartialGoldBenefits, PartialReferralBonus, PartialTierBenefits, RedemptionOption,
    };

    /// Database file removed when the test ends
    struct TempFile(PathBuf);

    impl TempFile {
        fn new() -> Self {
            let name = format!("travel-admin-{}.redb", uuid::Uuid::new_v4());
            Self(std::env::temp_dir().join(name))
        }

        fn open(&self) -> AdminDb {
            AdminDb::open(Some(self.0.to_str().unwrap())).unwrap()
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn temp_db() -> (TempFile, AdminDb) {
        let file = TempFile::new();
        let db = file.open();
        (file, db)
    }

    #[tokio::test]
    async fn test_get_creates_defaults_once() {
        let (_file, db) = temp_db();
        assert!(db.load_rewards().unwrap().is_none());

        let first = db.get().await.unwrap();
        assert_eq!(first.points_per_dollar, 10.0);
        assert_eq!(first.tier_requirements.platinum, 3000.0);

        let second = db.get().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_update_persists_merge() {
        let (_file, db) = temp_db();
        let before = db.get().await.unwrap();

        let patch = PartialRewardConfiguration {
            referral_bonus: Some(PartialReferralBonus {
                referrer: Some(750.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let after = db.update(patch).await.unwrap();

        assert_eq!(after.referral_bonus.referrer, 750.0);
        assert_eq!(after.referral_bonus.user, before.referral_bonus.user);
        assert!(after.last_updated > before.last_updated);
        assert_eq!(db.load_rewards().unwrap(), Some(after));
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_bytes_unchanged() {
        let (_file, db) = temp_db();
        db.get().await.unwrap();
        let before = db.raw_rewards().unwrap().unwrap();

        let patch = PartialRewardConfiguration {
            review_bonus: Some(75.0),
            tier_benefits: Some(PartialTierBenefits {
                gold: Some(PartialGoldBenefits {
                    discount: Some(150.0),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = db.update(patch).await.unwrap_err();
        assert!(err.is_validation());

        let after = db.raw_rewards().unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_without_prior_get_starts_from_defaults() {
        let (_file, db) = temp_db();
        let after = db
            .update(PartialRewardConfiguration {
                redemption_options: Some(vec![RedemptionOption::new(800.0, "Spa credit", 40.0)]),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(after.signup_bonus, 100.0);
        assert_eq!(after.redemption_options.len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_keeps_document() {
        let file = TempFile::new();

        let stored = {
            let db = file.open();
            db.update(PartialRewardConfiguration {
                signup_bonus: Some(125.0),
                ..Default::default()
            })
            .await
            .unwrap()
        };

        let reopened = file.open();
        assert_eq!(reopened.get().await.unwrap(), stored);
    }

    #[test]
    fn test_temp_file_removed_on_drop() {
        let path = {
            let (file, _db) = temp_db();
            assert!(file.0.exists());
            file.0.clone()
        };
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_disjoint_updates_both_survive() {
        let (_file, db) = temp_db();
        db.get().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20u32 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let patch = if i % 2 == 0 {
                    PartialRewardConfiguration {
                        signup_bonus: Some(1_000.0 + i as f64),
                        ..Default::default()
                    }
                } else {
                    PartialRewardConfiguration {
                        review_bonus: Some(2_000.0 + i as f64),
                        ..Default::default()
                    }
                };
                db.update(patch).await.unwrap()
            }));
        }

        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap().last_updated);
        }

        let last = db.get().await.unwrap();
        assert!(last.signup_bonus >= 1_000.0 && last.signup_bonus < 1_020.0);
        assert!(last.review_bonus >= 2_000.0 && last.review_bonus < 2_020.0);

        // Serialized writers never share a stamp
        stamps.sort();
        stamps.dedup();
        assert_eq!(stamps.len(), 20);
        assert_eq!(stamps.last(), Some(&last.last_updated));
    }
}
