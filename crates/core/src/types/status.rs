//! Order status state machine.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the five known statuses.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "invalid status value. Status must be one of: pending, processing, shipped, delivered, cancelled"
)]
pub struct ParseOrderStatusError;

/// Lifecycle status of a customer order.
///
/// Orders are created as [`Pending`](Self::Pending) and move forward through
/// fulfillment: `pending → processing → shipped → delivered`. Transitions are
/// validated against an explicit table via [`can_transition_to`]:
///
/// - Forward movement is allowed, including skipping intermediate steps
///   (an admin may mark a pending order shipped directly).
/// - `cancelled` is reachable from any non-terminal state.
/// - `delivered` and `cancelled` are terminal; nothing leaves them, and no
///   transition moves backwards.
///
/// [`can_transition_to`]: Self::can_transition_to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the transition `self → target` is legal.
    ///
    /// Re-asserting the current status is not a transition and is rejected.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            // Terminal states are frozen
            (Self::Delivered | Self::Cancelled, _) => false,
            // Any live order can be cancelled
            (_, Self::Cancelled) => true,
            // Otherwise only forward movement along the fulfillment chain
            (from, to) => to.rank() > from.rank(),
        }
    }

    /// Position along the fulfillment chain; `cancelled` sits outside it.
    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
            Self::Cancelled => 4,
        }
    }

    /// The lowercase wire name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseOrderStatusError),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        use OrderStatus::{Delivered, Pending, Processing, Shipped};

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        // Skipping intermediate steps is legal
        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Delivered));
        assert!(Processing.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancel_from_any_live_state() {
        use OrderStatus::{Cancelled, Pending, Processing, Shipped};

        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        use OrderStatus::{Cancelled, Delivered};

        for target in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(target));
            assert!(!Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn test_backward_and_noop_transitions_rejected() {
        use OrderStatus::{Pending, Processing, Shipped};

        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Processing.can_transition_to(Pending));
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("refunded".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }
}
