//! Order intake: the manager registers orders and passes them to the cooks.
use orders::coordinates::Coordinates;
use tracing::{info, warn};

use crate::connection::OrderConnection;
use crate::error::IntakeError;
use crate::shop::Shop;
use crate::status_emitter::Checkpoint;
use crate::transition_log::Agent;

impl Shop {
    /// Takes a new order for the customer behind `connection`.
    /// # Arguments
    /// * `coordinates` - where the order has to be delivered
    /// * `connection` - where the status updates of the order are sent
    /// # Returns
    /// The id of the new order. When the order cannot be taken the connection is closed
    /// and nothing is registered.
    pub fn take_order(
        &self,
        coordinates: Coordinates,
        connection: Box<dyn OrderConnection>,
    ) -> Result<usize, IntakeError> {
        let mut state = self.lock_state();
        if state.closing {
            drop(state);
            let mut connection = connection;
            connection.close();
            return Err(IntakeError::ShuttingDown);
        }
        let order_id = match state.store.register(coordinates, connection) {
            Ok(order_id) => order_id,
            Err(mut connection) => {
                let capacity = state.store.capacity();
                drop(state);
                warn!("[MANAGER] Maximum orders reached ({}), rejecting order", capacity);
                connection.close();
                return Err(IntakeError::CapacityExhausted(capacity));
            }
        };

        let Some(shop_order) = state.store.get_mut(order_id) else {
            return Ok(order_id);
        };
        let (order, connection) = shop_order.parts_mut();
        if self.record_and_announce(order, connection, Agent::Manager) == Checkpoint::Canceled {
            return Ok(order_id);
        }
        if let Err(e) = state.preparation.push(order_id) {
            // cannot happen while the queue is as large as the store
            warn!("[MANAGER] {}", e);
            self.cancel_unfinished(&mut state, order_id, Agent::Manager);
            return Ok(order_id);
        }
        info!("[MANAGER] Order {} received at {}", order_id, coordinates);
        drop(state);
        self.notify_order_placed();
        Ok(order_id)
    }
}
