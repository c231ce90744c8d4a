//! Status changes and how customers hear about them.
//!
//! Every transition is set, recorded and announced, in that order, with the shop
//! state lock held. A customer that cannot be told about a transition is treated as
//! gone: its order is canceled on the spot and never retried. The connection of an
//! order is closed as soon as its last status code is out.
use orders::order::Order;
use orders::order_status::OrderStatus;
use tracing::{debug, error, info};

use crate::connection::OrderConnection;
use crate::delivery_person::DeliveryPerson;
use crate::shop::{Shop, ShopState};
use crate::transition_log::{Agent, TransitionRecord};

/// What happened to an order at a status checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// The new status was recorded and the customer was told
    Announced,
    /// The customer could not be told, so the order was canceled
    Canceled,
    /// The order had been canceled before reaching the checkpoint; nothing was done
    Skipped,
}

impl Shop {
    /// Moves an order to `status` and announces it.
    pub(crate) fn advance(
        &self,
        state: &mut ShopState,
        order_id: usize,
        status: OrderStatus,
        agent: Agent,
    ) -> Checkpoint {
        let Some(shop_order) = state.store.get_mut(order_id) else {
            error!("[{}] Order {} does not exist", agent, order_id);
            return Checkpoint::Skipped;
        };
        let (order, connection) = shop_order.parts_mut();
        if order.is_terminal() {
            debug!("[{}] Order {} is already {}, dropping it", agent, order_id, order.status());
            return Checkpoint::Skipped;
        }
        if let Err(e) = order.advance_to(status) {
            error!("[{}] {}", agent, e);
            return Checkpoint::Skipped;
        }
        self.record_and_announce(order, connection, agent)
    }

    /// Records the current status of a fresh or just advanced order and sends it to the customer.
    /// A delivered order has nothing more to say, so its connection is closed right away.
    pub(crate) fn record_and_announce(
        &self,
        order: &mut Order,
        connection: &mut dyn OrderConnection,
        agent: Agent,
    ) -> Checkpoint {
        self.recorder.record(TransitionRecord::of(order, agent));
        match connection.send_status(order.status()) {
            Ok(()) => {
                if order.is_terminal() {
                    connection.close();
                }
                Checkpoint::Announced
            }
            Err(e) => {
                info!("[{}] Customer of order {} unreachable, canceling: {}", agent, order.id(), e);
                self.cancel_order(order, connection, Agent::Shop);
                Checkpoint::Canceled
            }
        }
    }

    /// Cancels an order once. The customer is told with a last status code
    /// and the connection is closed, whether or not the code got through.
    pub(crate) fn cancel_order(
        &self,
        order: &mut Order,
        connection: &mut dyn OrderConnection,
        agent: Agent,
    ) -> bool {
        if !order.cancel() {
            return false;
        }
        self.recorder.record(TransitionRecord::of(order, agent));
        if let Err(e) = connection.send_status(OrderStatus::Canceled) {
            debug!("Could not tell customer of order {} about the cancellation: {}", order.id(), e);
        }
        connection.close();
        true
    }

    /// Cancels an order that is not finished yet. Delivered and already canceled orders are left alone.
    /// Returns whether this call canceled the order.
    pub fn cancel(&self, order_id: usize, agent: Agent) -> bool {
        let mut state = self.lock_state();
        self.cancel_unfinished(&mut state, order_id, agent)
    }

    pub(crate) fn cancel_unfinished(&self, state: &mut ShopState, order_id: usize, agent: Agent) -> bool {
        let Some(shop_order) = state.store.get_mut(order_id) else {
            return false;
        };
        let (order, connection) = shop_order.parts_mut();
        if order.is_terminal() {
            return false;
        }
        self.cancel_order(order, connection, agent)
    }

    /// Counts a delivered order. Once every order ever taken has been delivered,
    /// every connection still open is closed.
    pub(crate) fn record_delivery(&self, state: &mut ShopState, delivery_person: &DeliveryPerson) {
        state.delivered_count += 1;
        delivery_person.count_delivery();
        if state.delivered_count == state.store.len() {
            self.notify_all_orders_completed(state);
        }
    }

    fn notify_all_orders_completed(&self, state: &mut ShopState) {
        state.completion_broadcasts += 1;
        info!("All {} orders delivered, closing customer connections", state.delivered_count);
        for shop_order in state.store.iter_mut() {
            let connection = shop_order.connection_mut();
            if connection.is_open() {
                connection.close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use crate::connection::{ChannelConnection, EmitError, MockOrderConnection};
    use crate::transition_log::MemoryRecorder;
    use mockall::Sequence;
    use orders::coordinates::Coordinates;
    use std::sync::Arc;

    fn shop() -> (Shop, Arc<MemoryRecorder>) {
        let recorder = Arc::new(MemoryRecorder::new());
        let shop = Shop::new(ShopConfig::new(1, 1, 1), recorder.clone()).unwrap();
        (shop, recorder)
    }

    fn register(shop: &Shop, connection: Box<dyn OrderConnection>) -> usize {
        let mut state = shop.lock_state();
        match state.store.register(Coordinates::new(1, 2), connection) {
            Ok(order_id) => order_id,
            Err(_) => panic!("store is full"),
        }
    }

    #[test]
    fn test_advance_records_then_announces() {
        let (shop, recorder) = shop();
        let (connection, customer) = ChannelConnection::pair();
        let order_id = register(&shop, Box::new(connection));

        let mut state = shop.lock_state();
        let checkpoint = shop.advance(&mut state, order_id, OrderStatus::Preparing, Agent::Cook(0));
        drop(state);

        assert_eq!(checkpoint, Checkpoint::Announced);
        assert_eq!(customer.try_recv().unwrap(), OrderStatus::Preparing);
        assert_eq!(recorder.statuses_of(order_id), vec![OrderStatus::Preparing]);
        assert_eq!(recorder.records()[0].agent, Agent::Cook(0));
    }

    #[test]
    fn test_failed_announcement_cancels_and_closes() {
        let (shop, recorder) = shop();
        let mut connection = MockOrderConnection::new();
        let mut sequence = Sequence::new();
        connection
            .expect_send_status()
            .withf(|status| *status == OrderStatus::Preparing)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(EmitError::HungUp));
        connection
            .expect_send_status()
            .withf(|status| *status == OrderStatus::Canceled)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(EmitError::HungUp));
        connection.expect_close().times(1).return_const(());
        let order_id = register(&shop, Box::new(connection));

        let mut state = shop.lock_state();
        let checkpoint = shop.advance(&mut state, order_id, OrderStatus::Preparing, Agent::Cook(0));
        let again = shop.advance(&mut state, order_id, OrderStatus::Cooking, Agent::Cook(0));
        drop(state);

        assert_eq!(checkpoint, Checkpoint::Canceled);
        assert_eq!(again, Checkpoint::Skipped);
        assert_eq!(
            recorder.statuses_of(order_id),
            vec![OrderStatus::Preparing, OrderStatus::Canceled]
        );
        assert_eq!(shop.order_status(order_id), Some(OrderStatus::Canceled));
    }

    #[test]
    fn test_cancel_happens_once() {
        let (shop, recorder) = shop();
        let mut connection = MockOrderConnection::new();
        connection
            .expect_send_status()
            .withf(|status| *status == OrderStatus::Canceled)
            .times(1)
            .returning(|_| Ok(()));
        connection.expect_close().times(1).return_const(());
        let order_id = register(&shop, Box::new(connection));

        assert!(shop.cancel(order_id, Agent::Customer));
        assert!(!shop.cancel(order_id, Agent::Shop));
        assert_eq!(recorder.statuses_of(order_id), vec![OrderStatus::Canceled]);
    }

    #[test]
    fn test_delivered_orders_are_not_canceled() {
        let (shop, recorder) = shop();
        let (connection, customer) = ChannelConnection::pair();
        let order_id = register(&shop, Box::new(connection));
        {
            let mut state = shop.lock_state();
            for status in [
                OrderStatus::Preparing,
                OrderStatus::Cooking,
                OrderStatus::ReadyForDelivery,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered,
            ] {
                assert_eq!(shop.advance(&mut state, order_id, status, Agent::Shop), Checkpoint::Announced);
            }
        }
        assert!(!shop.cancel(order_id, Agent::Customer));
        assert_eq!(customer.try_iter().last(), Some(OrderStatus::Delivered));
        assert_eq!(recorder.statuses_of(order_id).len(), 5);
    }

    #[test]
    fn test_connection_closes_after_the_last_status() {
        let (shop, _) = shop();
        let (delivered, delivered_customer) = ChannelConnection::pair();
        let (canceled, canceled_customer) = ChannelConnection::pair();
        let (pending, pending_customer) = ChannelConnection::pair();
        let delivered_id = register(&shop, Box::new(delivered));
        let canceled_id = register(&shop, Box::new(canceled));
        let pending_id = register(&shop, Box::new(pending));

        let mut state = shop.lock_state();
        for status in [
            OrderStatus::Preparing,
            OrderStatus::Cooking,
            OrderStatus::ReadyForDelivery,
            OrderStatus::OutForDelivery,
        ] {
            shop.advance(&mut state, delivered_id, status, Agent::Shop);
        }
        shop.advance(&mut state, delivered_id, OrderStatus::Delivered, Agent::Shop);
        assert!(shop.cancel_unfinished(&mut state, canceled_id, Agent::Customer));
        shop.advance(&mut state, pending_id, OrderStatus::Preparing, Agent::Shop);
        drop(state);

        // a closed connection drops its sender, so the customer sees the end of the stream
        assert_eq!(delivered_customer.iter().last(), Some(OrderStatus::Delivered));
        assert_eq!(canceled_customer.iter().collect::<Vec<_>>(), vec![OrderStatus::Canceled]);
        assert_eq!(pending_customer.try_recv().unwrap(), OrderStatus::Preparing);
        assert!(pending_customer.try_recv().is_err());
        assert_eq!(shop.completion_broadcasts(), 0);
        let mut state = shop.lock_state();
        assert!(state.store.get_mut(pending_id).unwrap().connection_mut().is_open());
        assert!(!state.store.get_mut(delivered_id).unwrap().connection_mut().is_open());
    }

    #[test]
    fn test_last_delivery_closes_every_connection() {
        let (shop, _) = shop();
        let (first, first_customer) = ChannelConnection::pair();
        let (second, second_customer) = ChannelConnection::pair();
        let first_id = register(&shop, Box::new(first));
        let second_id = register(&shop, Box::new(second));
        let courier = &shop.delivery_people()[0];

        let mut state = shop.lock_state();
        for order_id in [first_id, second_id] {
            state.store.get_mut(order_id).unwrap().parts_mut().0.cancel();
        }
        shop.record_delivery(&mut state, courier);
        assert_eq!(state.completion_broadcasts, 0);
        shop.record_delivery(&mut state, courier);
        assert_eq!(state.completion_broadcasts, 1);
        drop(state);

        assert_eq!(courier.delivered_orders(), 2);
        // closed connections drop their sender, so the customers see the end of the stream
        assert!(first_customer.recv().is_err());
        assert!(second_customer.recv().is_err());
    }
}
