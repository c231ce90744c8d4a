//! Knobs of the shop: pool sizes, capacities and the latency model of the simulated work.
use std::time::Duration;

use crate::error::ShopError;

/// Orders accepted over the whole life of the shop
pub const MAX_ORDERS: usize = 1000;
/// Orders that can be cooking at the same time
pub const MAX_OVEN_SIZE: usize = 6;
/// Orders a delivery person carries in one trip
pub const MAX_DELIVERY_BAG: usize = 3;
/// Travel time per unit of distance at speed one
pub const TRAVEL_UNIT: Duration = Duration::from_micros(60);
/// Upper bound for a single leg of a delivery trip
pub const MAX_TRAVEL: Duration = Duration::from_secs(10);
/// How long an idle delivery person waits before checking the queue again
pub const IDLE_POLL: Duration = Duration::from_secs(1);
pub const DEFAULT_LOG_FILE: &str = "pide_shop.log";

/// Stand-in for the variable latency of preparing and cooking.
///
/// Each phase multiplies a random complex matrix by its conjugate transpose
/// (`rows x cols` input) and then sleeps `delay` plus up to `jitter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkModel {
    pub preparation_matrix: (usize, usize),
    pub cooking_matrix: (usize, usize),
    pub preparation_delay: Duration,
    pub cooking_delay: Duration,
    pub jitter: Duration,
}

impl Default for WorkModel {
    fn default() -> Self {
        WorkModel {
            preparation_matrix: (30, 40),
            cooking_matrix: (15, 40),
            preparation_delay: Duration::ZERO,
            cooking_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    pub cook_pool_size: usize,
    pub delivery_pool_size: usize,
    pub courier_speed: u32,
    pub max_orders: usize,
    pub oven_capacity: usize,
    pub bag_capacity: usize,
    pub travel_unit: Duration,
    pub max_travel: Duration,
    pub idle_poll: Duration,
    pub work: WorkModel,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            cook_pool_size: 1,
            delivery_pool_size: 1,
            courier_speed: 1,
            max_orders: MAX_ORDERS,
            oven_capacity: MAX_OVEN_SIZE,
            bag_capacity: MAX_DELIVERY_BAG,
            travel_unit: TRAVEL_UNIT,
            max_travel: MAX_TRAVEL,
            idle_poll: IDLE_POLL,
            work: WorkModel::default(),
        }
    }
}

impl ShopConfig {
    /// Creates a configuration with the given pools and the default capacities
    /// # Arguments
    /// * `cook_pool_size` - number of cook threads
    /// * `delivery_pool_size` - number of delivery person threads
    /// * `courier_speed` - distance units every delivery person covers per travel unit
    pub fn new(cook_pool_size: usize, delivery_pool_size: usize, courier_speed: u32) -> ShopConfig {
        ShopConfig {
            cook_pool_size,
            delivery_pool_size,
            courier_speed,
            ..ShopConfig::default()
        }
    }

    pub fn with_max_orders(mut self, max_orders: usize) -> Self {
        self.max_orders = max_orders;
        self
    }

    pub fn with_oven_capacity(mut self, oven_capacity: usize) -> Self {
        self.oven_capacity = oven_capacity;
        self
    }

    pub fn with_bag_capacity(mut self, bag_capacity: usize) -> Self {
        self.bag_capacity = bag_capacity;
        self
    }

    pub fn with_travel_unit(mut self, travel_unit: Duration) -> Self {
        self.travel_unit = travel_unit;
        self
    }

    pub fn with_max_travel(mut self, max_travel: Duration) -> Self {
        self.max_travel = max_travel;
        self
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn with_work(mut self, work: WorkModel) -> Self {
        self.work = work;
        self
    }

    /// Rejects configurations the shop cannot run with
    pub fn validate(&self) -> Result<(), ShopError> {
        let checks = [
            (self.cook_pool_size, "cook pool size"),
            (self.delivery_pool_size, "delivery pool size"),
            (self.courier_speed as usize, "delivery speed"),
            (self.max_orders, "maximum orders"),
            (self.oven_capacity, "oven capacity"),
            (self.bag_capacity, "delivery bag capacity"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(ShopError::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}
