//! FIFO of order ids between two stages of the pipeline.
//! Only touched while the shop state lock is held.
use std::collections::VecDeque;

use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{stage} queue is full ({capacity} orders)")]
pub struct QueueFull {
    pub stage: &'static str,
    pub capacity: usize,
}

#[derive(Debug)]
pub struct StageQueue {
    stage: &'static str,
    orders: VecDeque<usize>,
    capacity: usize,
}

impl StageQueue {
    /// Creates an empty queue holding at most `capacity` orders
    pub fn new(stage: &'static str, capacity: usize) -> Self {
        StageQueue {
            stage,
            orders: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, order_id: usize) -> Result<(), QueueFull> {
        if self.orders.len() >= self.capacity {
            return Err(QueueFull {
                stage: self.stage,
                capacity: self.capacity,
            });
        }
        self.orders.push_back(order_id);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.orders.pop_front()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_leave_in_arrival_order() {
        let mut queue = StageQueue::new("preparation", 3);
        assert_eq!(queue.stage(), "preparation");
        queue.push(4).unwrap();
        queue.push(1).unwrap();
        queue.push(9).unwrap();
        assert_eq!(queue.pop(), Some(4));
        queue.push(2).unwrap();
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(9));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_rejects() {
        let mut queue = StageQueue::new("delivery", 1);
        queue.push(1).unwrap();
        let err = queue.push(2).unwrap_err();
        assert_eq!(err.stage, "delivery");
        assert_eq!(queue.len(), 1);
        assert_eq!(err.to_string(), "delivery queue is full (1 orders)");
    }
}
