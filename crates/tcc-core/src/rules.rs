//! Reward rule engine.
//!
//! Computes the TCC amount for an earn event from the active
//! `RewardRuleConfig` snapshot. Evaluation is a pure function of its
//! inputs: given the same event and config it always returns the same
//! amount, so issued rewards are reproducible for auditing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};

/// Versioned reward configuration.
///
/// Read-only to the rule engine at evaluation time; mutated only through
/// the administrative surface, which bumps `version` on every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRuleConfig {
    /// Monotonic configuration version, bumped on every update.
    pub version: u64,

    /// Conversion rate: whole TCC per euro. Used for spend-token issuance
    /// (ceiling) and reimbursement payouts (floor).
    pub tcc_per_euro: i64,

    /// Base multiplier (TCC per euro spent) by purchase category.
    pub base_multipliers: HashMap<PurchaseCategory, i64>,

    /// Fallback multiplier for categories without an explicit entry.
    pub default_multiplier: i64,

    /// Additive percentage adjustment by market area, applied first.
    pub area_boosts: HashMap<String, i64>,

    /// Additive percentage adjustment by purchase category, applied after
    /// the area boost.
    pub category_boosts: HashMap<PurchaseCategory, i64>,

    /// Flat TCC base for a check-in, before the transport bonus.
    pub checkin_base: i64,

    /// Flat TCC reward for a resolved civic report.
    pub civic_report_reward: i64,

    /// Who last updated the configuration.
    pub updated_by: String,

    /// When the configuration was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Default for RewardRuleConfig {
    fn default() -> Self {
        let mut base_multipliers = HashMap::new();
        base_multipliers.insert(PurchaseCategory::Bio, 2);
        base_multipliers.insert(PurchaseCategory::KmZero, 2);
        base_multipliers.insert(PurchaseCategory::Generic, 1);

        Self {
            version: 1,
            tcc_per_euro: 2,
            base_multipliers,
            default_multiplier: 1,
            area_boosts: HashMap::new(),
            category_boosts: HashMap::new(),
            checkin_base: 5,
            civic_report_reward: 10,
            updated_by: "default".into(),
            updated_at: Utc::now(),
        }
    }
}

impl RewardRuleConfig {
    /// Base multiplier for a purchase category.
    #[must_use]
    pub fn multiplier(&self, category: PurchaseCategory) -> i64 {
        self.base_multipliers
            .get(&category)
            .copied()
            .unwrap_or(self.default_multiplier)
    }

    /// Convert a euro amount (cents) to TCC, rounding up.
    ///
    /// Ceiling rounding means the citizen never under-pays in TCC terms.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` if the scaled amount does not
    /// fit in an `i64`.
    pub fn euro_to_tcc_ceil(&self, euro_cents: i64) -> Result<i64> {
        euro_cents
            .checked_mul(self.tcc_per_euro)
            .and_then(|v| v.checked_add(99))
            .map(|v| v / 100)
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!("euro amount out of range: {euro_cents}"))
            })
    }

    /// Convert a TCC amount to euro cents, rounding down.
    ///
    /// Floor rounding means shop reimbursements are never over-paid.
    #[must_use]
    pub fn tcc_to_euro_floor(&self, tcc: i64) -> i64 {
        if self.tcc_per_euro == 0 {
            return 0;
        }
        tcc * 100 / self.tcc_per_euro
    }
}

/// A citizen action that earns TCC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EarnEvent {
    /// A qualifying purchase at a participating shop.
    Purchase {
        /// Amount spent, in euro cents.
        euro_cents: i64,
        /// Market area where the purchase happened.
        area: String,
        /// Product category.
        category: PurchaseCategory,
    },

    /// A check-in at a market or civic event.
    CheckIn {
        /// How the citizen travelled there.
        transport: TransportMode,
    },

    /// A resolved civic report (e.g. abandoned waste, broken fixture).
    CivicReport,
}

/// Product category for purchase-based rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseCategory {
    /// Certified organic produce.
    Bio,

    /// Locally sourced ("km 0") produce.
    KmZero,

    /// Everything else.
    Generic,
}

/// Transport mode for check-in rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// On foot.
    Walking,
    /// By bicycle.
    Cycling,
    /// By bus or tram.
    PublicTransit,
    /// By car.
    Car,
}

impl TransportMode {
    /// Fixed check-in bonus table. Not user-editable: walking beats
    /// cycling beats public transit; driving earns nothing extra.
    #[must_use]
    pub const fn checkin_bonus(self) -> i64 {
        match self {
            Self::Walking => 5,
            Self::Cycling => 3,
            Self::PublicTransit => 2,
            Self::Car => 0,
        }
    }
}

/// Compute the TCC credit for an earn event.
///
/// Purchase rewards start from `euro_cents * multiplier(category)`, then
/// the area boost and the category boost are applied in that fixed order,
/// each as a percentage of the running value. The result is floored once
/// at the end — fractional TCC is never rounded up, preventing systematic
/// over-issuance — and clamped at zero.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` if a purchase amount is not
/// positive, or if the scaled amount does not fit in an `i64`.
pub fn compute_earn_amount(event: &EarnEvent, config: &RewardRuleConfig) -> Result<i64> {
    match event {
        EarnEvent::Purchase {
            euro_cents,
            area,
            category,
        } => {
            if *euro_cents <= 0 {
                return Err(LedgerError::InvalidAmount(format!(
                    "purchase amount must be positive, got {euro_cents}"
                )));
            }

            let area_pct = config.area_boosts.get(area).copied().unwrap_or(0);
            let category_pct = config.category_boosts.get(category).copied().unwrap_or(0);

            // A boost below -100% cannot drive the factor negative.
            let area_factor = (100 + area_pct).max(0);
            let category_factor = (100 + category_pct).max(0);

            // Single integer division at the end floors the result exactly
            // once: cents * multiplier * area% * category% / (100 * 100 * 100).
            // The products are overflow-checked; an amount that cannot be
            // scaled within i64 is rejected rather than wrapped.
            let raw = euro_cents
                .checked_mul(config.multiplier(*category))
                .and_then(|v| v.checked_mul(area_factor))
                .and_then(|v| v.checked_mul(category_factor))
                .map(|v| v / 1_000_000)
                .ok_or_else(|| {
                    LedgerError::InvalidAmount(format!(
                        "purchase amount out of range: {euro_cents}"
                    ))
                })?;

            Ok(raw.max(0))
        }
        EarnEvent::CheckIn { transport } => {
            Ok((config.checkin_base + transport.checkin_bonus()).max(0))
        }
        EarnEvent::CivicReport => Ok(config.civic_report_reward.max(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_boosts(area: &str, area_pct: i64, category_pct: i64) -> RewardRuleConfig {
        let mut config = RewardRuleConfig::default();
        config.area_boosts.insert(area.into(), area_pct);
        config
            .category_boosts
            .insert(PurchaseCategory::Bio, category_pct);
        config
    }

    #[test]
    fn bio_purchase_with_category_boost() {
        // EUR 10 bio purchase, multiplier 2 TCC/EUR, +20% category boost,
        // 0% area boost: floor(10 * 2 * 1.2) = 24.
        let config = config_with_boosts("centro", 0, 20);
        let event = EarnEvent::Purchase {
            euro_cents: 1000,
            area: "centro".into(),
            category: PurchaseCategory::Bio,
        };

        assert_eq!(compute_earn_amount(&event, &config).unwrap(), 24);
    }

    #[test]
    fn fractional_reward_is_floored() {
        // EUR 10.01 * 2 * 1.2 = 24.024 -> 24, never rounded up.
        let config = config_with_boosts("centro", 0, 20);
        let event = EarnEvent::Purchase {
            euro_cents: 1001,
            area: "centro".into(),
            category: PurchaseCategory::Bio,
        };

        assert_eq!(compute_earn_amount(&event, &config).unwrap(), 24);
    }

    #[test]
    fn area_boost_applies_before_category_boost() {
        // EUR 5 generic (multiplier 1), +50% area, +10% category:
        // floor(5 * 1 * 1.5 * 1.1) = floor(8.25) = 8.
        let mut config = RewardRuleConfig::default();
        config.area_boosts.insert("mercato".into(), 50);
        config
            .category_boosts
            .insert(PurchaseCategory::Generic, 10);

        let event = EarnEvent::Purchase {
            euro_cents: 500,
            area: "mercato".into(),
            category: PurchaseCategory::Generic,
        };

        assert_eq!(compute_earn_amount(&event, &config).unwrap(), 8);
    }

    #[test]
    fn unknown_area_means_no_boost() {
        let config = config_with_boosts("centro", 30, 0);
        let event = EarnEvent::Purchase {
            euro_cents: 1000,
            area: "periferia".into(),
            category: PurchaseCategory::Bio,
        };

        // 10 EUR * 2, no boosts.
        assert_eq!(compute_earn_amount(&event, &config).unwrap(), 20);
    }

    #[test]
    fn negative_boost_cannot_go_below_zero() {
        let config = config_with_boosts("centro", -150, 0);
        let event = EarnEvent::Purchase {
            euro_cents: 1000,
            area: "centro".into(),
            category: PurchaseCategory::Bio,
        };

        assert_eq!(compute_earn_amount(&event, &config).unwrap(), 0);
    }

    #[test]
    fn non_positive_purchase_rejected() {
        let config = RewardRuleConfig::default();
        let event = EarnEvent::Purchase {
            euro_cents: 0,
            area: "centro".into(),
            category: PurchaseCategory::Generic,
        };

        assert!(matches!(
            compute_earn_amount(&event, &config),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn checkin_transport_bonus_ordering() {
        let config = RewardRuleConfig::default();
        let amount = |transport| {
            compute_earn_amount(&EarnEvent::CheckIn { transport }, &config).unwrap()
        };

        let walking = amount(TransportMode::Walking);
        let cycling = amount(TransportMode::Cycling);
        let transit = amount(TransportMode::PublicTransit);
        let car = amount(TransportMode::Car);

        assert!(walking > cycling);
        assert!(cycling > transit);
        assert!(transit > car);
        assert_eq!(car, config.checkin_base);
    }

    #[test]
    fn civic_report_flat_reward() {
        let config = RewardRuleConfig::default();
        assert_eq!(
            compute_earn_amount(&EarnEvent::CivicReport, &config).unwrap(),
            config.civic_report_reward
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let config = config_with_boosts("centro", 15, 20);
        let event = EarnEvent::Purchase {
            euro_cents: 1234,
            area: "centro".into(),
            category: PurchaseCategory::Bio,
        };

        let first = compute_earn_amount(&event, &config).unwrap();
        for _ in 0..10 {
            assert_eq!(compute_earn_amount(&event, &config).unwrap(), first);
        }
    }

    #[test]
    fn euro_to_tcc_rounds_up() {
        let config = RewardRuleConfig::default(); // 2 TCC/EUR

        assert_eq!(config.euro_to_tcc_ceil(1200).unwrap(), 24); // EUR 12 exact
        assert_eq!(config.euro_to_tcc_ceil(1).unwrap(), 1); // 0.02 TCC -> 1
        assert_eq!(config.euro_to_tcc_ceil(1050).unwrap(), 21); // EUR 10.50 exact
        assert_eq!(config.euro_to_tcc_ceil(1049).unwrap(), 21); // 20.98 -> 21
    }

    #[test]
    fn euro_to_tcc_rejects_out_of_range_amount() {
        let config = RewardRuleConfig::default();

        assert!(matches!(
            config.euro_to_tcc_ceil(i64::MAX / 2),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn oversized_purchase_rejected_instead_of_wrapping() {
        let config = RewardRuleConfig::default();
        let event = EarnEvent::Purchase {
            euro_cents: i64::MAX / 2,
            area: "centro".into(),
            category: PurchaseCategory::Bio,
        };

        assert!(matches!(
            compute_earn_amount(&event, &config),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn tcc_to_euro_rounds_down() {
        let config = RewardRuleConfig::default(); // 2 TCC/EUR

        assert_eq!(config.tcc_to_euro_floor(24), 1200);
        assert_eq!(config.tcc_to_euro_floor(25), 1250);
        assert_eq!(config.tcc_to_euro_floor(1), 50);
    }
}
