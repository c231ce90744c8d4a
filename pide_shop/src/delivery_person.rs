//! Delivery people fill a bag from the delivery queue and ride out to every address in it.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use orders::coordinates::Coordinates;
use orders::order_status::OrderStatus;
use tracing::{debug, info};

use crate::shop::Shop;
use crate::status_emitter::Checkpoint;
use crate::transition_log::Agent;

/// A member of the delivery pool
#[derive(Debug)]
pub struct DeliveryPerson {
    id: usize,
    speed: u32,
    delivered_orders: AtomicUsize,
}

impl DeliveryPerson {
    pub fn new(id: usize, speed: u32) -> Self {
        DeliveryPerson {
            id,
            speed,
            delivered_orders: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn delivered_orders(&self) -> usize {
        self.delivered_orders.load(Ordering::Relaxed)
    }

    pub(crate) fn count_delivery(&self) {
        self.delivered_orders.fetch_add(1, Ordering::Relaxed);
    }
}

/// Orders carried in one trip, in the order they were picked up
#[derive(Debug)]
pub struct DeliveryBag {
    orders: Vec<(usize, Coordinates)>,
    capacity: usize,
}

impl DeliveryBag {
    pub fn new(capacity: usize) -> Self {
        DeliveryBag {
            orders: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn has_room(&self) -> bool {
        self.orders.len() < self.capacity
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[(usize, Coordinates)] {
        &self.orders
    }

    fn put(&mut self, order_id: usize, coordinates: Coordinates) {
        debug_assert!(self.has_room());
        self.orders.push((order_id, coordinates));
    }

    fn empty(&mut self) {
        self.orders.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripLeg {
    pub order_id: usize,
    pub travel: Duration,
    /// Whether the customer was told the order arrived
    pub delivered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripReport {
    pub legs: Vec<TripLeg>,
}

impl TripReport {
    pub fn delivered(&self) -> usize {
        self.legs.iter().filter(|leg| leg.delivered).count()
    }
}

/// Time to reach `coordinates` from the shop at `speed`, never more than `max_travel`.
/// # Arguments
/// * `coordinates` - destination of the order
/// * `speed` - distance units covered per travel unit
/// * `travel_unit` - time it takes to cover one distance unit at speed one
/// * `max_travel` - upper bound of the result
pub fn travel_time(
    coordinates: Coordinates,
    speed: u32,
    travel_unit: Duration,
    max_travel: Duration,
) -> Duration {
    let units = coordinates.distance_from_shop() / f64::from(speed.max(1));
    let secs = units * travel_unit.as_secs_f64();
    if !secs.is_finite() || secs >= max_travel.as_secs_f64() {
        return max_travel;
    }
    Duration::from_secs_f64(secs.max(0.0))
}

/// The thread body of one delivery person
pub struct CourierWorker {
    shop: Arc<Shop>,
    courier_index: usize,
}

impl CourierWorker {
    pub fn new(shop: Arc<Shop>, courier_index: usize) -> Self {
        CourierWorker { shop, courier_index }
    }

    fn courier(&self) -> &DeliveryPerson {
        &self.shop.delivery_people()[self.courier_index]
    }

    fn agent(&self) -> Agent {
        Agent::DeliveryPerson(self.courier_index)
    }

    /// Delivers orders until the shop closes
    pub fn run(self) {
        info!("[DELIVERY {}] Ready to deliver", self.courier_index);
        let mut bag = DeliveryBag::new(self.shop.config().bag_capacity);
        while self.fill_bag(&mut bag) {
            if bag.is_empty() {
                self.wait_for_ready_orders();
                continue;
            }
            let report = self.deliver(&mut bag);
            info!(
                "[DELIVERY {}] Back at the shop, {} of {} orders delivered",
                self.courier_index,
                report.delivered(),
                report.legs.len()
            );
        }
        info!(
            "[DELIVERY {}] Shop closed, leaving after {} orders",
            self.courier_index,
            self.courier().delivered_orders()
        );
    }

    /// Moves ready orders into the bag while there is room, announcing each one as out for delivery.
    /// # Returns
    /// `false` if the shop is closing and nothing was taken
    pub fn fill_bag(&self, bag: &mut DeliveryBag) -> bool {
        let shop = &self.shop;
        let mut state = shop.lock_state();
        if state.closing {
            return false;
        }
        while bag.has_room() {
            let Some(order_id) = state.delivery.pop() else {
                break;
            };
            let Some(coordinates) = state.store.get(order_id).map(|o| o.order().coordinates()) else {
                continue;
            };
            match shop.advance(&mut state, order_id, OrderStatus::OutForDelivery, self.agent()) {
                Checkpoint::Announced => bag.put(order_id, coordinates),
                other => debug!("[DELIVERY {}] Order {} left out: {:?}", self.courier_index, order_id, other),
            }
        }
        true
    }

    /// Sleeps until an order is ready, the shop closes or the idle poll interval passes
    pub fn wait_for_ready_orders(&self) {
        let state = self.shop.lock_state();
        if state.delivery.is_empty() && !state.closing {
            let _state = self.shop.wait_for_order_ready(state, self.shop.config().idle_poll);
        }
    }

    /// Takes every order in the bag to its customer, in pick up order, and empties the bag.
    pub fn deliver(&self, bag: &mut DeliveryBag) -> TripReport {
        let shop = &self.shop;
        let config = shop.config();
        let mut report = TripReport::default();
        for &(order_id, coordinates) in bag.orders() {
            let travel = travel_time(coordinates, self.courier().speed(), config.travel_unit, config.max_travel);
            thread::sleep(travel);

            let mut state = shop.lock_state();
            let delivered =
                shop.advance(&mut state, order_id, OrderStatus::Delivered, self.agent()) == Checkpoint::Announced;
            if delivered {
                shop.record_delivery(&mut state, self.courier());
            }
            drop(state);
            debug!(
                "[DELIVERY {}] Order {} at {} after {:?}: delivered {}",
                self.courier_index, order_id, coordinates, travel, delivered
            );
            report.legs.push(TripLeg {
                order_id,
                travel,
                delivered,
            });
        }
        bag.empty();
        report
    }
}
