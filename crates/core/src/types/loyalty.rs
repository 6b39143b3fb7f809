//! Loyalty points and tiers.
//!
//! Points and tier are stored on the Shopify customer as metafields
//! (`loyalty.points`, `loyalty.tier`). A stored tier wins when it is valid;
//! otherwise the tier is derived from the point balance.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Loyalty tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    const ORDER: [Self; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::Platinum];

    /// Minimum points required for this tier.
    #[must_use]
    pub const fn threshold(self) -> u64 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 500,
            Self::Gold => 1_500,
            Self::Platinum => 5_000,
        }
    }

    /// Highest tier the balance qualifies for.
    #[must_use]
    pub fn for_points(points: u64) -> Self {
        Self::ORDER
            .into_iter()
            .rev()
            .find(|tier| points >= tier.threshold())
            .unwrap_or_default()
    }

    /// The tier above this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }

    /// Parse a metafield value ("gold", "Gold", " GOLD ").
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bronze" => Some(Self::Bronze),
            "silver" => Some(Self::Silver),
            "gold" => Some(Self::Gold),
            "platinum" => Some(Self::Platinum),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's loyalty standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyStatus {
    pub points: u64,
    pub tier: LoyaltyTier,
    pub next_tier: Option<LoyaltyTier>,
    pub points_to_next_tier: Option<u64>,
}

impl LoyaltyStatus {
    /// Status derived purely from a point balance.
    #[must_use]
    pub fn from_points(points: u64) -> Self {
        Self::with_tier(points, LoyaltyTier::for_points(points))
    }

    /// Status from raw metafield values. Missing or malformed points count as
    /// zero; a missing or unknown tier is derived from the points.
    #[must_use]
    pub fn from_metafields(points: Option<&str>, tier: Option<&str>) -> Self {
        let points = points
            .and_then(|p| p.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let tier = tier
            .and_then(LoyaltyTier::parse)
            .unwrap_or_else(|| LoyaltyTier::for_points(points));
        Self::with_tier(points, tier)
    }

    fn with_tier(points: u64, tier: LoyaltyTier) -> Self {
        let next_tier = tier.next();
        Self {
            points,
            tier,
            next_tier,
            points_to_next_tier: next_tier.map(|next| next.threshold().saturating_sub(points)),
        }
    }
}

/// Points earned for a purchase: one point per whole unit of currency spent.
/// Negative or fractional remainders earn nothing.
#[must_use]
pub fn points_for_purchase(amount: Decimal) -> u64 {
    amount.floor().to_u64().unwrap_or(0)
}
