//! Closing time: every unfinished order is canceled and the best workers are named.
use std::fmt;

use tracing::info;

use crate::shop::Shop;
use crate::transition_log::Agent;

/// A worker and how many orders it finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTally {
    pub id: usize,
    pub orders: usize,
}

/// Worker with the strictly highest count. On a tie the first one wins;
/// nobody wins if no worker finished anything.
pub fn most_efficient<I>(tallies: I) -> Option<WorkerTally>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut best: Option<WorkerTally> = None;
    let mut best_orders = 0;
    for (id, orders) in tallies {
        if orders > best_orders {
            best_orders = orders;
            best = Some(WorkerTally { id, orders });
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EfficiencyReport {
    /// Orders canceled by closing the shop
    pub canceled_orders: usize,
    pub most_efficient_cook: Option<WorkerTally>,
    pub most_efficient_delivery_person: Option<WorkerTally>,
}

impl fmt::Display for EfficiencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orders canceled at closing time: {}", self.canceled_orders)?;
        match self.most_efficient_cook {
            Some(cook) => writeln!(f, "Most efficient cook: Cook {} with {} orders prepared", cook.id, cook.orders)?,
            None => writeln!(f, "Most efficient cook: none, no order was prepared")?,
        }
        match self.most_efficient_delivery_person {
            Some(courier) => write!(
                f,
                "Most efficient delivery person: Delivery Person {} with {} orders delivered",
                courier.id, courier.orders
            ),
            None => write!(f, "Most efficient delivery person: none, no order was delivered"),
        }
    }
}

impl Shop {
    /// Closes the shop. Every order not yet delivered is canceled once, new orders are
    /// rejected from now on and idle workers are woken so they can leave.
    /// Workers in the middle of a delay notice at their next status checkpoint.
    pub fn shut_down(&self) -> EfficiencyReport {
        let mut state = self.lock_state();
        state.closing = true;
        let unfinished: Vec<usize> = state
            .store
            .iter()
            .filter(|shop_order| !shop_order.order().is_terminal())
            .map(|shop_order| shop_order.order().id())
            .collect();
        let canceled_orders = unfinished
            .into_iter()
            .filter(|&order_id| self.cancel_unfinished(&mut state, order_id, Agent::Shop))
            .count();

        let report = EfficiencyReport {
            canceled_orders,
            most_efficient_cook: most_efficient(self.cooks().iter().map(|cook| (cook.id(), cook.prepared_orders()))),
            most_efficient_delivery_person: most_efficient(
                self.delivery_people()
                    .iter()
                    .map(|courier| (courier.id(), courier.delivered_orders())),
            ),
        };
        drop(state);
        self.wake_everybody();
        info!("[SHOP] Closed, {} orders canceled", report.canceled_orders);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use crate::connection::ChannelConnection;
    use crate::error::IntakeError;
    use crate::transition_log::MemoryRecorder;
    use orders::coordinates::Coordinates;
    use orders::order_status::OrderStatus;
    use std::sync::Arc;

    #[test]
    fn test_first_maximum_wins() {
        assert_eq!(
            most_efficient([(0, 2), (1, 5), (2, 5), (3, 1)]),
            Some(WorkerTally { id: 1, orders: 5 })
        );
        assert_eq!(most_efficient([(0, 3), (1, 3)]), Some(WorkerTally { id: 0, orders: 3 }));
        assert_eq!(most_efficient([(0, 0), (1, 0)]), None);
        assert_eq!(most_efficient(Vec::<(usize, usize)>::new()), None);
    }

    #[test]
    fn test_report_lines() {
        let report = EfficiencyReport {
            canceled_orders: 2,
            most_efficient_cook: Some(WorkerTally { id: 1, orders: 4 }),
            most_efficient_delivery_person: None,
        };
        let text = report.to_string();
        assert!(text.contains("Most efficient cook: Cook 1 with 4 orders prepared"));
        assert!(text.contains("Most efficient delivery person: none"));
    }

    #[test]
    fn test_shut_down_cancels_every_unfinished_order_once() {
        let recorder = Arc::new(MemoryRecorder::new());
        let shop = Shop::new(ShopConfig::new(2, 2, 1), recorder.clone()).unwrap();
        let customers: Vec<_> = (0..3)
            .map(|i| {
                let (connection, customer) = ChannelConnection::pair();
                shop.take_order(Coordinates::new(i, i), Box::new(connection)).unwrap();
                customer
            })
            .collect();
        assert!(shop.cancel(2, Agent::Customer));

        let report = shop.shut_down();

        assert_eq!(report.canceled_orders, 2);
        assert_eq!(report.most_efficient_cook, None);
        assert!(shop.is_closing());
        for (index, customer) in customers.iter().enumerate() {
            let statuses: Vec<_> = customer.try_iter().collect();
            assert_eq!(statuses, vec![OrderStatus::Received, OrderStatus::Canceled]);
            assert_eq!(recorder.statuses_of(index + 1).len(), 2);
        }

        let (late, _late_customer) = ChannelConnection::pair();
        assert_eq!(
            shop.take_order(Coordinates::new(1, 1), Box::new(late)),
            Err(IntakeError::ShuttingDown)
        );
        assert_eq!(shop.shut_down().canceled_orders, 0);
    }
}
