//! Statuses an order goes through, from the counter to the customer's door

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an order. The discriminant is the code sent over the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Received = 0,
    Preparing = 1,
    Cooking = 2,
    ReadyForDelivery = 3,
    OutForDelivery = 4,
    Delivered = 5,
    Canceled = 6,
}

impl OrderStatus {
    /// Returns all the possible values of OrderStatus, in pipeline order
    pub fn values() -> Vec<OrderStatus> {
        vec![
            OrderStatus::Received,
            OrderStatus::Preparing,
            OrderStatus::Cooking,
            OrderStatus::ReadyForDelivery,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Canceled,
        ]
    }

    /// The wire code of this status
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps a wire code back to its status, `None` for codes outside 0..=6
    pub fn from_code(code: i32) -> Option<OrderStatus> {
        OrderStatus::values()
            .into_iter()
            .find(|status| status.code() == code)
    }

    /// Delivered and Canceled orders never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// The status that follows this one when nothing goes wrong
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::ReadyForDelivery),
            OrderStatus::ReadyForDelivery => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Canceled => None,
        }
    }

    /// Whether an order in this status may move to `next`.
    /// Cancellation is allowed from every non terminal status.
    pub fn can_become(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == OrderStatus::Canceled || self.next() == Some(next)
    }

    /// Human readable text used in the transition log
    pub fn description(self) -> &'static str {
        match self {
            OrderStatus::Received => "Order received",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Cooking => "Cooking",
            OrderStatus::ReadyForDelivery => "Ready for delivery",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_pipeline_order() {
        let codes: Vec<i32> = OrderStatus::values().into_iter().map(OrderStatus::code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_code_has_no_status() {
        assert_eq!(OrderStatus::from_code(4), Some(OrderStatus::OutForDelivery));
        assert_eq!(OrderStatus::from_code(7), None);
        assert_eq!(OrderStatus::from_code(-1), None);
    }

    #[test]
    fn test_no_status_can_be_skipped() {
        assert!(OrderStatus::Received.can_become(OrderStatus::Preparing));
        assert!(!OrderStatus::Received.can_become(OrderStatus::Cooking));
        assert!(!OrderStatus::Cooking.can_become(OrderStatus::Cooking));
        assert!(!OrderStatus::OutForDelivery.can_become(OrderStatus::ReadyForDelivery));
    }

    #[test]
    fn test_cancel_allowed_until_terminal() {
        for status in OrderStatus::values() {
            assert_eq!(status.can_become(OrderStatus::Canceled), !status.is_terminal());
        }
        assert_eq!(OrderStatus::Delivered.next(), None);
    }
}
