//! ============================================================================
//! Reward Validation - Declarative per-field bounds
//! ============================================================================
//! Every numeric field must be finite and >= 0; discount percentages must
//! also be <= 100. Redemption rows need a non-empty reward label.
//!
//! Tier threshold ordering (silver < gold < platinum) is a cross-field rule
//! and only enforced when `ValidationPolicy::strict_tier_ordering` is set.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{RewardConfiguration, TierRequirements};

/// Upper bound for discount percentages
pub const MAX_DISCOUNT_PERCENT: f64 = 100.0;

/// A single field that failed its bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted camelCase path, e.g. `tierBenefits.gold.discount`
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Every violation found in one document, reported together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    /// Names of the offending fields, in check order
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid reward configuration: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Reject thresholds that are not strictly increasing by tier
    pub strict_tier_ordering: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self {
            strict_tier_ordering: true,
        }
    }
}

struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.violations.push(FieldViolation::new(field, "must be a finite number"));
        } else if value < 0.0 {
            self.violations.push(FieldViolation::new(field, "must be >= 0"));
        }
    }

    fn percentage(&mut self, field: &str, value: f64) {
        if value.is_finite() && value > MAX_DISCOUNT_PERCENT {
            self.violations.push(FieldViolation::new(field, "must be <= 100"));
        } else {
            self.non_negative(field, value);
        }
    }
}

/// Check every field of a full document against its bound
pub fn validate(
    config: &RewardConfiguration,
    policy: ValidationPolicy,
) -> Result<(), ValidationErrors> {
    let mut check = Checker {
        violations: Vec::new(),
    };

    check.non_negative("pointsPerDollar", config.points_per_dollar);
    check.non_negative("signupBonus", config.signup_bonus);
    check.non_negative("referralBonus.user", config.referral_bonus.user);
    check.non_negative("referralBonus.referrer", config.referral_bonus.referrer);
    check.non_negative("reviewBonus", config.review_bonus);

    let tiers = &config.tier_requirements;
    check.non_negative("tierRequirements.silver", tiers.silver);
    check.non_negative("tierRequirements.gold", tiers.gold);
    check.non_negative("tierRequirements.platinum", tiers.platinum);

    let benefits = &config.tier_benefits;
    check.percentage("tierBenefits.silver.discount", benefits.silver.discount);
    check.percentage("tierBenefits.gold.discount", benefits.gold.discount);
    check.percentage("tierBenefits.platinum.discount", benefits.platinum.discount);

    for (i, option) in config.redemption_options.iter().enumerate() {
        check.non_negative(&format!("redemptionOptions[{}].points", i), option.points);
        check.non_negative(&format!("redemptionOptions[{}].value", i), option.value);
        if option.reward.is_empty() {
            let field = format!("redemptionOptions[{}].reward", i);
            check.violations.push(FieldViolation::new(field, "is required"));
        }
    }

    if policy.strict_tier_ordering {
        check.violations.extend(tier_ordering_issues(tiers));
    }

    if check.violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors {
            violations: check.violations,
        })
    }
}

/// Thresholds that do not strictly increase from silver to platinum
pub fn tier_ordering_issues(tiers: &TierRequirements) -> Vec<FieldViolation> {
    let mut issues = Vec::new();
    if tiers.gold <= tiers.silver {
        issues.push(FieldViolation::new(
            "tierRequirements.gold",
            "must be greater than tierRequirements.silver",
        ));
    }
    if tiers.platinum <= tiers.gold {
        issues.push(FieldViolation::new(
            "tierRequirements.platinum",
            "must be greater than tierRequirements.gold",
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::types::RedemptionOption;

    #[test]
    fn test_defaults_are_valid() {
        let config = RewardConfiguration::default();
        assert!(validate(&config, ValidationPolicy::default()).is_ok());
        assert!(validate(&config, ValidationPolicy::strict()).is_ok());
    }

    #[test]
    fn test_all_violations_aggregated() {
        let mut config = RewardConfiguration::default();
        config.signup_bonus = -1.0;
        config.tier_benefits.gold.discount = 150.0;
        config.tier_benefits.silver.discount = -5.0;
        config.redemption_options = vec![RedemptionOption::new(-10.0, "", 5.0)];

        let err = validate(&config, ValidationPolicy::default()).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                "signupBonus",
                "tierBenefits.silver.discount",
                "tierBenefits.gold.discount",
                "redemptionOptions[0].points",
                "redemptionOptions[0].reward",
            ]
        );
        assert!(err.to_string().contains("tierBenefits.gold.discount must be <= 100"));
    }

    #[test]
    fn test_discount_bounds_inclusive() {
        let mut config = RewardConfiguration::default();
        config.tier_benefits.silver.discount = 0.0;
        config.tier_benefits.platinum.discount = 100.0;
        assert!(validate(&config, ValidationPolicy::default()).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut config = RewardConfiguration::default();
        config.points_per_dollar = f64::INFINITY;
        let err = validate(&config, ValidationPolicy::default()).unwrap_err();
        assert_eq!(err.violations[0].reason, "must be a finite number");
    }

    #[test]
    fn test_tier_ordering_permissive_by_default() {
        let mut config = RewardConfiguration::default();
        config.tier_requirements.silver = 2_000.0;

        assert!(validate(&config, ValidationPolicy::default()).is_ok());

        let err = validate(&config, ValidationPolicy::strict()).unwrap_err();
        assert_eq!(err.fields(), vec!["tierRequirements.gold"]);
    }

    #[test]
    fn test_equal_thresholds_flagged() {
        let tiers = TierRequirements {
            silver: 100.0,
            gold: 100.0,
            platinum: 100.0,
        };
        assert_eq!(tier_ordering_issues(&tiers).len(), 2);
    }
}
