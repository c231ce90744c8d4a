//! Cooks take orders from the preparation queue and leave them, cooked, in the delivery queue.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use orders::order_status::OrderStatus;
use tracing::{debug, info, warn};

use crate::shop::Shop;
use crate::status_emitter::Checkpoint;
use crate::transition_log::Agent;
use crate::work;

/// A member of the cook pool
#[derive(Debug)]
pub struct Cook {
    id: usize,
    prepared_orders: AtomicUsize,
}

impl Cook {
    pub fn new(id: usize) -> Self {
        Cook {
            id,
            prepared_orders: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Orders this cook left ready for delivery
    pub fn prepared_orders(&self) -> usize {
        self.prepared_orders.load(Ordering::Relaxed)
    }

    fn count_prepared(&self) {
        self.prepared_orders.fetch_add(1, Ordering::Relaxed);
    }
}

/// How an order left a cook's hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookOutcome {
    ReadyForDelivery(usize),
    /// Canceled before or while reaching `during`
    Dropped { order_id: usize, during: OrderStatus },
}

/// The thread body of one cook
pub struct CookWorker {
    shop: Arc<Shop>,
    cook_index: usize,
}

impl CookWorker {
    pub fn new(shop: Arc<Shop>, cook_index: usize) -> Self {
        CookWorker { shop, cook_index }
    }

    fn cook(&self) -> &Cook {
        &self.shop.cooks()[self.cook_index]
    }

    fn agent(&self) -> Agent {
        Agent::Cook(self.cook_index)
    }

    /// Cooks orders until the shop closes
    pub fn run(self) {
        info!("[COOK {}] Ready to cook", self.cook_index);
        while let Some(outcome) = self.cook_next() {
            match outcome {
                CookOutcome::ReadyForDelivery(order_id) => {
                    info!("[COOK {}] Order {} ready for delivery", self.cook_index, order_id)
                }
                CookOutcome::Dropped { order_id, during } => {
                    debug!("[COOK {}] Order {} dropped at {}", self.cook_index, order_id, during)
                }
            }
        }
        info!(
            "[COOK {}] Shop closed, leaving after {} orders",
            self.cook_index,
            self.cook().prepared_orders()
        );
    }

    /// Waits for the next order and takes it through preparation and cooking.
    /// # Returns
    /// `None` once the shop is closing, otherwise what happened to the order
    pub fn cook_next(&self) -> Option<CookOutcome> {
        let shop = &self.shop;
        let mut state = shop.lock_state();
        let order_id = loop {
            if state.closing {
                return None;
            }
            if let Some(order_id) = state.preparation.pop() {
                debug!(
                    "[COOK {}] Took order {} from the {} queue",
                    self.cook_index,
                    order_id,
                    state.preparation.stage()
                );
                break order_id;
            }
            state = shop.wait_for_order_placed(state);
        };

        if shop.advance(&mut state, order_id, OrderStatus::Preparing, self.agent()) != Checkpoint::Announced {
            return Some(CookOutcome::Dropped { order_id, during: OrderStatus::Preparing });
        }
        drop(state);
        work::prepare(&shop.config().work);

        let slot = shop.oven().acquire();
        let mut state = shop.lock_state();
        if shop.advance(&mut state, order_id, OrderStatus::Cooking, self.agent()) != Checkpoint::Announced {
            drop(state);
            drop(slot);
            return Some(CookOutcome::Dropped { order_id, during: OrderStatus::Cooking });
        }
        drop(state);
        work::cook(&shop.config().work);

        let mut state = shop.lock_state();
        let outcome = match shop.advance(&mut state, order_id, OrderStatus::ReadyForDelivery, self.agent()) {
            Checkpoint::Announced => match state.delivery.push(order_id) {
                Ok(()) => {
                    self.cook().count_prepared();
                    shop.notify_order_ready();
                    CookOutcome::ReadyForDelivery(order_id)
                }
                Err(e) => {
                    warn!("[COOK {}] {}", self.cook_index, e);
                    shop.cancel_unfinished(&mut state, order_id, self.agent());
                    CookOutcome::Dropped { order_id, during: OrderStatus::ReadyForDelivery }
                }
            },
            _ => CookOutcome::Dropped { order_id, during: OrderStatus::ReadyForDelivery },
        };
        drop(state);
        drop(slot);
        Some(outcome)
    }
}
