//! ============================================================================
//! Reward Types - Loyalty program configuration document
//! ============================================================================
//! Field names serialize as camelCase; they are the storage and JSON contract
//! the admin dashboards read.
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default points earned per dollar spent
pub const DEFAULT_POINTS_PER_DOLLAR: f64 = 10.0;
pub const DEFAULT_SIGNUP_BONUS: f64 = 100.0;
pub const DEFAULT_REFERRAL_USER_BONUS: f64 = 250.0;
pub const DEFAULT_REFERRAL_REFERRER_BONUS: f64 = 500.0;
pub const DEFAULT_REVIEW_BONUS: f64 = 50.0;

/// Cumulative point thresholds
pub const DEFAULT_SILVER_THRESHOLD: f64 = 500.0;
pub const DEFAULT_GOLD_THRESHOLD: f64 = 1_500.0;
pub const DEFAULT_PLATINUM_THRESHOLD: f64 = 3_000.0;

/// Discount percentages
pub const DEFAULT_SILVER_DISCOUNT: f64 = 5.0;
pub const DEFAULT_GOLD_DISCOUNT: f64 = 10.0;
pub const DEFAULT_PLATINUM_DISCOUNT: f64 = 15.0;

/// Loyalty membership level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Silver, Tier::Gold, Tier::Platinum];

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }
}

/// The singleton loyalty program configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfiguration {
    pub points_per_dollar: f64,
    pub signup_bonus: f64,
    pub referral_bonus: ReferralBonus,
    pub review_bonus: f64,
    pub tier_requirements: TierRequirements,
    pub tier_benefits: TierBenefits,
    /// Display order only
    pub redemption_options: Vec<RedemptionOption>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralBonus {
    /// Awarded to the newly referred user
    pub user: f64,
    /// Awarded to the user who made the referral
    pub referrer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirements {
    pub silver: f64,
    pub gold: f64,
    pub platinum: f64,
}

impl TierRequirements {
    pub fn threshold(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Silver => self.silver,
            Tier::Gold => self.gold,
            Tier::Platinum => self.platinum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBenefits {
    pub silver: SilverBenefits,
    pub gold: GoldBenefits,
    pub platinum: PlatinumBenefits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilverBenefits {
    /// Percentage in [0, 100]
    pub discount: f64,
    pub priority: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldBenefits {
    pub discount: f64,
    pub priority: bool,
    pub early_access: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatinumBenefits {
    pub discount: f64,
    pub priority: bool,
    pub early_access: bool,
    pub dedicated_support: bool,
}

/// A catalog row exchanging points for a named reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOption {
    pub points: f64,
    pub reward: String,
    pub value: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RedemptionOption {
    pub fn new(points: f64, reward: impl Into<String>, value: f64) -> Self {
        Self {
            points,
            reward: reward.into(),
            value,
            is_active: true,
        }
    }
}

impl Default for ReferralBonus {
    fn default() -> Self {
        Self {
            user: DEFAULT_REFERRAL_USER_BONUS,
            referrer: DEFAULT_REFERRAL_REFERRER_BONUS,
        }
    }
}

impl Default for TierRequirements {
    fn default() -> Self {
        Self {
            silver: DEFAULT_SILVER_THRESHOLD,
            gold: DEFAULT_GOLD_THRESHOLD,
            platinum: DEFAULT_PLATINUM_THRESHOLD,
        }
    }
}

impl Default for TierBenefits {
    fn default() -> Self {
        Self {
            silver: SilverBenefits {
                discount: DEFAULT_SILVER_DISCOUNT,
                priority: false,
            },
            gold: GoldBenefits {
                discount: DEFAULT_GOLD_DISCOUNT,
                priority: true,
                early_access: true,
            },
            platinum: PlatinumBenefits {
                discount: DEFAULT_PLATINUM_DISCOUNT,
                priority: true,
                early_access: true,
                dedicated_support: true,
            },
        }
    }
}

impl Default for RewardConfiguration {
    fn default() -> Self {
        Self::defaults_at(Utc::now())
    }
}

impl RewardConfiguration {
    /// Fully defaulted document stamped with the given creation time
    pub fn defaults_at(created_at: DateTime<Utc>) -> Self {
        Self {
            points_per_dollar: DEFAULT_POINTS_PER_DOLLAR,
            signup_bonus: DEFAULT_SIGNUP_BONUS,
            referral_bonus: ReferralBonus::default(),
            review_bonus: DEFAULT_REVIEW_BONUS,
            tier_requirements: TierRequirements::default(),
            tier_benefits: TierBenefits::default(),
            redemption_options: Vec::new(),
            last_updated: created_at,
        }
    }

    /// Points earned for a purchase, rounded down to whole points
    pub fn points_for_spend(&self, dollars: f64) -> u64 {
        if !dollars.is_finite() || dollars <= 0.0 {
            return 0;
        }
        (dollars * self.points_per_dollar).floor() as u64
    }

    /// Highest tier whose threshold the cumulative points reach.
    /// Checked from platinum down, so misordered thresholds still resolve.
    pub fn tier_for_points(&self, points: f64) -> Option<Tier> {
        Tier::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| points >= self.tier_requirements.threshold(*tier))
    }

    /// Discount percentage granted by a tier
    pub fn discount_for(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Silver => self.tier_benefits.silver.discount,
            Tier::Gold => self.tier_benefits.gold.discount,
            Tier::Platinum => self.tier_benefits.platinum.discount,
        }
    }

    pub fn has_priority(&self, tier: Tier) -> bool {
        match tier {
            Tier::Silver => self.tier_benefits.silver.priority,
            Tier::Gold => self.tier_benefits.gold.priority,
            Tier::Platinum => self.tier_benefits.platinum.priority,
        }
    }

    pub fn active_redemptions(&self) -> impl Iterator<Item = &RedemptionOption> {
        self.redemption_options.iter().filter(|o| o.is_active)
    }

    /// Active catalog rows a balance can pay for, in display order
    pub fn affordable_redemptions(&self, points: f64) -> Vec<&RedemptionOption> {
        self.active_redemptions()
            .filter(|o| o.points <= points)
            .collect()
    }
}
