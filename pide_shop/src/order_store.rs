//! Every order the shop ever took, indexed by id. Orders are never removed:
//! they are needed for the closing report.
use orders::coordinates::Coordinates;
use orders::order::Order;

use crate::connection::OrderConnection;

/// An order together with the connection of the customer waiting for it
pub struct ShopOrder {
    order: Order,
    connection: Box<dyn OrderConnection>,
}

impl ShopOrder {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub(crate) fn connection_mut(&mut self) -> &mut dyn OrderConnection {
        self.connection.as_mut()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Order, &mut dyn OrderConnection) {
        (&mut self.order, self.connection.as_mut())
    }
}

pub struct OrderStore {
    orders: Vec<ShopOrder>,
    capacity: usize,
}

impl OrderStore {
    pub fn new(capacity: usize) -> Self {
        OrderStore {
            orders: Vec::new(),
            capacity,
        }
    }

    /// Registers a new order with the next id (ids start at 1).
    /// When the store is full the connection is handed back untouched.
    pub fn register(
        &mut self,
        coordinates: Coordinates,
        connection: Box<dyn OrderConnection>,
    ) -> Result<usize, Box<dyn OrderConnection>> {
        if self.is_full() {
            return Err(connection);
        }
        let order_id = self.orders.len() + 1;
        self.orders.push(ShopOrder {
            order: Order::new(order_id, coordinates),
            connection,
        });
        Ok(order_id)
    }

    pub fn get(&self, order_id: usize) -> Option<&ShopOrder> {
        let index = order_id.checked_sub(1)?;
        self.orders.get(index)
    }

    pub(crate) fn get_mut(&mut self, order_id: usize) -> Option<&mut ShopOrder> {
        let index = order_id.checked_sub(1)?;
        self.orders.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShopOrder> {
        self.orders.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ShopOrder> {
        self.orders.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.orders.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ChannelConnection;
    use orders::order_status::OrderStatus;

    fn connection() -> Box<dyn OrderConnection> {
        Box::new(ChannelConnection::pair().0)
    }

    #[test]
    fn test_ids_are_assigned_in_intake_order() {
        let mut store = OrderStore::new(10);
        assert_eq!(store.register(Coordinates::new(1, 1), connection()).ok(), Some(1));
        assert_eq!(store.register(Coordinates::new(2, 2), connection()).ok(), Some(2));
        let second = store.get(2).unwrap();
        assert_eq!(second.order().coordinates(), Coordinates::new(2, 2));
        assert_eq!(second.order().status(), OrderStatus::Received);
        assert!(store.get(0).is_none());
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_full_store_hands_the_connection_back() {
        let mut store = OrderStore::new(1);
        assert!(store.register(Coordinates::new(0, 0), connection()).is_ok());
        assert!(store.is_full());
        let rejected = store.register(Coordinates::new(5, 5), connection());
        assert!(rejected.is_err());
        assert_eq!(store.len(), 1);
    }
}
