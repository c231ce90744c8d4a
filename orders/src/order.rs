//! Represents an order from a customer asking for a pide to be delivered at some address
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinates::Coordinates;
use crate::order_status::OrderStatus;

/// Returned when an order is asked to skip, repeat or leave a terminal status
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("order {order_id} cannot go from {from:?} to {to:?}")]
pub struct TransitionError {
    pub order_id: usize,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    order_id: usize,
    coordinates: Coordinates,
    ordered_at: DateTime<Local>,
    status: OrderStatus,
    canceled: bool,
}

impl Order {
    /// Creates a new order, in the Received status
    /// # Arguments
    /// * `order_id` - A usize representing the id of the order, starting at 1
    /// * `coordinates` - Where the order has to be delivered
    /// # Returns
    /// * An Order
    pub fn new(order_id: usize, coordinates: Coordinates) -> Order {
        Order {
            order_id,
            coordinates,
            ordered_at: Local::now(),
            status: OrderStatus::Received,
            canceled: false,
        }
    }

    /// To obtain the id of this order
    pub fn id(&self) -> usize {
        self.order_id
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn ordered_at(&self) -> DateTime<Local> {
        self.ordered_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves the order one step forward in the pipeline.
    /// Fails without touching the order if `next` is not the status right after the current one.
    pub fn advance_to(&mut self, next: OrderStatus) -> Result<(), TransitionError> {
        if next == OrderStatus::Canceled || !self.status.can_become(next) {
            return Err(TransitionError {
                order_id: self.order_id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Marks the order as canceled. Returns false if it already was.
    ///
    /// This only looks at the canceled flag: a delivery that could not be announced
    /// to the customer is canceled too, so callers that must leave Delivered orders
    /// alone check `is_terminal` first.
    pub fn cancel(&mut self) -> bool {
        if self.canceled {
            return false;
        }
        self.canceled = true;
        self.status = OrderStatus::Canceled;
        true
    }
}
