//! ============================================================================
//! Rewards Module - Loyalty program configuration
//! ============================================================================
//! One configuration document drives the loyalty economics for the booking
//! site: points per dollar, signup/referral/review bonuses, tier thresholds,
//! tier benefits and the redemption catalog.
//!
//! ## Tiers (defaults)
//! - **Silver**: 500+ points, 5% discount
//! - **Gold**: 1500+ points, 10% discount, priority, early access
//! - **Platinum**: 3000+ points, 15% discount, priority, early access,
//!   dedicated support
//!
//! ## Usage
//! ```rust,ignore
//! use travel_core::rewards::{InMemoryRewardStore, PartialRewardConfiguration, RewardRepository};
//!
//! let store = InMemoryRewardStore::default();
//! let config = store.get().await?;
//! let patch: PartialRewardConfiguration = serde_json::from_str(r#"{"signupBonus": 150}"#)?;
//! let updated = store.update(patch).await?;
//! ```
//! ============================================================================

mod patch;
mod store;
mod types;
mod validate;

pub use patch::{
    PartialGoldBenefits, PartialPlatinumBenefits, PartialReferralBonus, PartialRewardConfiguration,
    PartialSilverBenefits, PartialTierBenefits, PartialTierRequirements,
};
pub use store::{apply_update, InMemoryRewardStore, RewardError, RewardRepository};
pub use types::{
    GoldBenefits, PlatinumBenefits, RedemptionOption, ReferralBonus, RewardConfiguration,
    SilverBenefits, Tier, TierBenefits, TierRequirements,
};
pub use validate::{
    tier_ordering_issues, validate, FieldViolation, ValidationErrors, ValidationPolicy,
    MAX_DISCOUNT_PERCENT,
};
