//! ============================================================================
//! Reward Store - Repository interface for the configuration singleton
//! ============================================================================
//! Handlers receive a `RewardRepository` explicitly; there is no global
//! accessor. `get` lazily creates the defaulted document, `update` merges a
//! patch, validates the merged document and stamps `lastUpdated`.
//! ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::patch::PartialRewardConfiguration;
use super::types::RewardConfiguration;
use super::validate::{tier_ordering_issues, validate, ValidationErrors, ValidationPolicy};

/// Errors from the reward store
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    /// One or more fields out of bounds; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Persistence layer failure; safe to retry
    #[error("Reward storage error: {0}")]
    Storage(String),
}

impl RewardError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        RewardError::Storage(err.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RewardError::Validation(_))
    }
}

/// Read and patch the loyalty configuration
#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// Current configuration, created with defaults if none exists yet
    async fn get(&self) -> Result<RewardConfiguration, RewardError>;

    /// Merge, validate and persist a partial update, returning the new document
    async fn update(
        &self,
        patch: PartialRewardConfiguration,
    ) -> Result<RewardConfiguration, RewardError>;
}

/// Merge `patch` onto `current` and validate the result.
///
/// `lastUpdated` becomes `now`, or one microsecond past the previous stamp
/// when the clock has not moved forward, so it always advances.
pub fn apply_update(
    current: &RewardConfiguration,
    patch: &PartialRewardConfiguration,
    policy: ValidationPolicy,
    now: DateTime<Utc>,
) -> Result<RewardConfiguration, ValidationErrors> {
    let mut next = current.clone();
    let changed = patch.merge_into(&mut next);

    if let Err(errors) = validate(&next, policy) {
        warn!("Rejected reward update: {}", errors);
        return Err(errors);
    }

    if !policy.strict_tier_ordering {
        for issue in tier_ordering_issues(&next.tier_requirements) {
            warn!("Tier thresholds out of order: {}", issue);
        }
    }

    next.last_updated = if now > current.last_updated {
        now
    } else {
        current.last_updated + Duration::microseconds(1)
    };

    info!("Reward configuration updated: {}", changed.join(", "));
    Ok(next)
}

/// Process-local store, for tests and single-node tooling
pub struct InMemoryRewardStore {
    config: RwLock<Option<RewardConfiguration>>,
    policy: ValidationPolicy,
}

impl InMemoryRewardStore {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            config: RwLock::new(None),
            policy,
        }
    }

    /// Start from an existing document instead of lazily defaulting
    pub fn with_config(config: RewardConfiguration, policy: ValidationPolicy) -> Self {
        Self {
            config: RwLock::new(Some(config)),
            policy,
        }
    }
}

impl Default for InMemoryRewardStore {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

#[async_trait]
impl RewardRepository for InMemoryRewardStore {
    async fn get(&self) -> Result<RewardConfiguration, RewardError> {
        {
            let slot = self.config.read().await;
            if let Some(config) = slot.as_ref() {
                return Ok(config.clone());
            }
        }

        let mut slot = self.config.write().await;
        let config = slot.get_or_insert_with(|| {
            debug!("Creating default reward configuration in memory");
            RewardConfiguration::default()
        });
        Ok(config.clone())
    }

    async fn update(
        &self,
        patch: PartialRewardConfiguration,
    ) -> Result<RewardConfiguration, RewardError> {
        // Write lock held across read-modify-write
        let mut slot = self.config.write().await;
        let current = slot.get_or_insert_with(RewardConfiguration::default);
        let next = apply_update(current, &patch, self.policy, Utc::now())?;
        *current = next.clone();
        Ok(next)
    }
}
