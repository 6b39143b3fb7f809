//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Shipment status milestone.
///
/// Mirrors the milestones reported by the tracking provider. Unknown values
/// map to [`ShipmentStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    InfoReceived,
    InTransit,
    OutForDelivery,
    FailedAttempt,
    AvailableForPickup,
    Delivered,
    Exception,
}

impl ShipmentStatus {
    /// Parse a provider milestone string.
    #[must_use]
    pub fn from_milestone(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "info_received" => Self::InfoReceived,
            "in_transit" => Self::InTransit,
            "out_for_delivery" => Self::OutForDelivery,
            "failed_attempt" => Self::FailedAttempt,
            "available_for_pickup" => Self::AvailableForPickup,
            "delivered" => Self::Delivered,
            "exception" => Self::Exception,
            _ => Self::Pending,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InfoReceived => "Label created",
            Self::InTransit => "In transit",
            Self::OutForDelivery => "Out for delivery",
            Self::FailedAttempt => "Delivery attempted",
            Self::AvailableForPickup => "Ready for pickup",
            Self::Delivered => "Delivered",
            Self::Exception => "Exception",
        }
    }

    /// Whether no further updates are expected.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Exception)
    }
}

/// Order fulfillment status.
///
/// Maps to Shopify's `OrderFulfillmentStatus` values; unknown values map to
/// `Unfulfilled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    #[default]
    Unfulfilled,
    PartiallyFulfilled,
    Fulfilled,
    Restocked,
    InProgress,
    OnHold,
}

impl FulfillmentStatus {
    /// Parse a Shopify enum value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "PARTIALLY_FULFILLED" => Self::PartiallyFulfilled,
            "FULFILLED" => Self::Fulfilled,
            "RESTOCKED" => Self::Restocked,
            "IN_PROGRESS" => Self::InProgress,
            "ON_HOLD" => Self::OnHold,
            _ => Self::Unfulfilled,
        }
    }
}
