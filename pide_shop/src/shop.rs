//! State shared by everybody working in the shop.
//!
//! A single lock protects the order store and both stage queues. Every status
//! change, queue push and queue pop happens while holding it. Two condition
//! variables wake idle workers: `order_placed` for cooks, `order_ready` for
//! delivery people. The oven has its own lock (see [`crate::oven`]).
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use orders::order_status::OrderStatus;
use tracing::warn;

use crate::config::ShopConfig;
use crate::cook::Cook;
use crate::delivery_person::DeliveryPerson;
use crate::error::ShopError;
use crate::order_store::OrderStore;
use crate::oven::Oven;
use crate::stage_queue::StageQueue;
use crate::transition_log::TransitionRecorder;

pub struct ShopState {
    pub(crate) store: OrderStore,
    pub(crate) preparation: StageQueue,
    pub(crate) delivery: StageQueue,
    pub(crate) delivered_count: usize,
    pub(crate) completion_broadcasts: usize,
    pub(crate) closing: bool,
}

pub struct Shop {
    config: ShopConfig,
    state: Mutex<ShopState>,
    order_placed: Condvar,
    order_ready: Condvar,
    oven: Oven,
    cooks: Vec<Cook>,
    delivery_people: Vec<DeliveryPerson>,
    pub(crate) recorder: Arc<dyn TransitionRecorder>,
}

impl Shop {
    /// Opens a shop. No worker is running yet, see [`crate::staff::Staff::hire`].
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if the configuration has an empty pool or capacity.
    pub fn new(config: ShopConfig, recorder: Arc<dyn TransitionRecorder>) -> Result<Shop, ShopError> {
        config.validate()?;
        let state = ShopState {
            store: OrderStore::new(config.max_orders),
            preparation: StageQueue::new("preparation", config.max_orders),
            delivery: StageQueue::new("delivery", config.max_orders),
            delivered_count: 0,
            completion_broadcasts: 0,
            closing: false,
        };
        let cooks = (0..config.cook_pool_size).map(Cook::new).collect();
        let delivery_people = (0..config.delivery_pool_size)
            .map(|id| DeliveryPerson::new(id, config.courier_speed))
            .collect();
        Ok(Shop {
            oven: Oven::new(config.oven_capacity),
            state: Mutex::new(state),
            order_placed: Condvar::new(),
            order_ready: Condvar::new(),
            cooks,
            delivery_people,
            recorder,
            config,
        })
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn oven(&self) -> &Oven {
        &self.oven
    }

    pub fn cooks(&self) -> &[Cook] {
        &self.cooks
    }

    pub fn delivery_people(&self) -> &[DeliveryPerson] {
        &self.delivery_people
    }

    pub fn order_status(&self, order_id: usize) -> Option<OrderStatus> {
        let state = self.lock_state();
        state.store.get(order_id).map(|order| order.order().status())
    }

    /// Orders ever registered
    pub fn order_count(&self) -> usize {
        self.lock_state().store.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.lock_state().delivered_count
    }

    /// Times every order registered so far had been delivered
    pub fn completion_broadcasts(&self) -> usize {
        self.lock_state().completion_broadcasts
    }

    pub fn is_closing(&self) -> bool {
        self.lock_state().closing
    }

    /// Statuses are single assignments, so the state is still consistent after
    /// a worker panicked while holding the lock.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Shop state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub(crate) fn wait_for_order_placed<'a>(
        &self,
        state: MutexGuard<'a, ShopState>,
    ) -> MutexGuard<'a, ShopState> {
        self.order_placed
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_for_order_ready<'a>(
        &self,
        state: MutexGuard<'a, ShopState>,
        timeout: Duration,
    ) -> MutexGuard<'a, ShopState> {
        let (state, _) = self
            .order_ready
            .wait_timeout(state, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        state
    }

    pub(crate) fn notify_order_placed(&self) {
        self.order_placed.notify_one();
    }

    pub(crate) fn notify_order_ready(&self) {
        self.order_ready.notify_one();
    }

    /// Wakes every idle worker so they notice the shop is closing
    pub(crate) fn wake_everybody(&self) {
        self.order_placed.notify_all();
        self.order_ready.notify_all();
    }
}
