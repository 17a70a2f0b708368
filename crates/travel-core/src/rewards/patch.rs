//! ============================================================================
//! Reward Patch - Partial updates merged at the leaf level
//! ============================================================================
//! Every field is optional. Nested objects merge field-by-field; a present
//! `redemptionOptions` list replaces the catalog as a whole.
//! ============================================================================

use serde::{Deserialize, Serialize};

use super::types::{RedemptionOption, RewardConfiguration};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialRewardConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_per_dollar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_bonus: Option<PartialReferralBonus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_requirements: Option<PartialTierRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_benefits: Option<PartialTierBenefits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption_options: Option<Vec<RedemptionOption>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialReferralBonus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialTierRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silver: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platinum: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialTierBenefits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silver: Option<PartialSilverBenefits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<PartialGoldBenefits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platinum: Option<PartialPlatinumBenefits>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialSilverBenefits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialGoldBenefits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_access: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialPlatinumBenefits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_support: Option<bool>,
}

/// Overwrite `target` when the patch carries a value, recording the path
fn merge<T: Clone>(target: &mut T, value: &Option<T>, path: &str, changed: &mut Vec<String>) {
    if let Some(v) = value {
        *target = v.clone();
        changed.push(path.to_string());
    }
}

impl PartialRewardConfiguration {
    /// True when the patch names no field at all
    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Dotted paths of every leaf the patch sets
    pub fn field_paths(&self) -> Vec<String> {
        let mut scratch = RewardConfiguration::default();
        self.merge_into(&mut scratch)
    }

    /// Merge the patch into `config`, returning the dotted paths it touched.
    /// Does not validate and does not touch `lastUpdated`.
    pub fn merge_into(&self, config: &mut RewardConfiguration) -> Vec<String> {
        let mut changed = Vec::new();

        merge(
            &mut config.points_per_dollar,
            &self.points_per_dollar,
            "pointsPerDollar",
            &mut changed,
        );
        merge(&mut config.signup_bonus, &self.signup_bonus, "signupBonus", &mut changed);
        merge(&mut config.review_bonus, &self.review_bonus, "reviewBonus", &mut changed);

        if let Some(referral) = &self.referral_bonus {
            let target = &mut config.referral_bonus;
            merge(&mut target.user, &referral.user, "referralBonus.user", &mut changed);
            merge(&mut target.referrer, &referral.referrer, "referralBonus.referrer", &mut changed);
        }

        if let Some(tiers) = &self.tier_requirements {
            let target = &mut config.tier_requirements;
            merge(&mut target.silver, &tiers.silver, "tierRequirements.silver", &mut changed);
            merge(&mut target.gold, &tiers.gold, "tierRequirements.gold", &mut changed);
            merge(&mut target.platinum, &tiers.platinum, "tierRequirements.platinum", &mut changed);
        }

        if let Some(benefits) = &self.tier_benefits {
            if let Some(silver) = &benefits.silver {
                let target = &mut config.tier_benefits.silver;
                merge(
                    &mut target.discount,
                    &silver.discount,
                    "tierBenefits.silver.discount",
                    &mut changed,
                );
                merge(
                    &mut target.priority,
                    &silver.priority,
                    "tierBenefits.silver.priority",
                    &mut changed,
                );
            }
            if let Some(gold) = &benefits.gold {
                let target = &mut config.tier_benefits.gold;
                merge(
                    &mut target.discount,
                    &gold.discount,
                    "tierBenefits.gold.discount",
                    &mut changed,
                );
                merge(
                    &mut target.priority,
                    &gold.priority,
                    "tierBenefits.gold.priority",
                    &mut changed,
                );
                merge(
                    &mut target.early_access,
                    &gold.early_access,
                    "tierBenefits.gold.earlyAccess",
                    &mut changed,
                );
            }
            if let Some(platinum) = &benefits.platinum {
                let target = &mut config.tier_benefits.platinum;
                merge(
                    &mut target.discount,
                    &platinum.discount,
                    "tierBenefits.platinum.discount",
                    &mut changed,
                );
                merge(
                    &mut target.priority,
                    &platinum.priority,
                    "tierBenefits.platinum.priority",
                    &mut changed,
                );
                merge(
                    &mut target.early_access,
                    &platinum.early_access,
                    "tierBenefits.platinum.earlyAccess",
                    &mut changed,
                );
                merge(
                    &mut target.dedicated_support,
                    &platinum.dedicated_support,
                    "tierBenefits.platinum.dedicatedSupport",
                    &mut changed,
                );
            }
        }

        merge(
            &mut config.redemption_options,
            &self.redemption_options,
            "redemptionOptions",
            &mut changed,
        );

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_merge_keeps_siblings() {
        let mut config = RewardConfiguration::default();
        let patch: PartialRewardConfiguration =
            serde_json::from_str(r#"{"referralBonus": {"user": 300}}"#).unwrap();

        let changed = patch.merge_into(&mut config);

        assert_eq!(changed, vec!["referralBonus.user".to_string()]);
        assert_eq!(config.referral_bonus.user, 300.0);
        assert_eq!(config.referral_bonus.referrer, 500.0);
    }

    #[test]
    fn test_benefit_merge_is_leaf_level() {
        let mut config = RewardConfiguration::default();
        let patch: PartialRewardConfiguration =
            serde_json::from_str(r#"{"tierBenefits": {"platinum": {"discount": 20}}}"#).unwrap();

        patch.merge_into(&mut config);

        assert_eq!(config.tier_benefits.platinum.discount, 20.0);
        assert!(config.tier_benefits.platinum.dedicated_support);
        assert!(config.tier_benefits.platinum.early_access);
        assert_eq!(config.tier_benefits.gold.discount, 10.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<PartialRewardConfiguration, _> =
            serde_json::from_str(r#"{"pointsPerDolar": 3}"#);
        assert!(result.is_err());

        let result: Result<PartialRewardConfiguration, _> =
            serde_json::from_str(r#"{"tierBenefits": {"silver": {"earlyAccess": true}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_patch() {
        let patch = PartialRewardConfiguration::default();
        assert!(patch.is_empty());

        let patch: PartialRewardConfiguration =
            serde_json::from_str(r#"{"tierRequirements": {}}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_redemption_list_replaced() {
        let mut config = RewardConfiguration::default();
        config.redemption_options = vec![RedemptionOption::new(100.0, "Coffee", 4.0)];

        let patch = PartialRewardConfiguration {
            redemption_options: Some(vec![]),
            ..Default::default()
        };
        patch.merge_into(&mut config);

        assert!(config.redemption_options.is_empty());
    }
}
