//! A town full of hungry customers, each one ordering once.
use std::fmt;

use orders::coordinates::Coordinates;
use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::customer::{follow_order, place_order, LeaveSignal, Outcome};
use crate::error::ClientError;

/// Customers one run can hold at most
pub const MAX_CLIENTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Town {
    pub server: String,
    pub clients: usize,
    pub size_x: i32,
    pub size_y: i32,
}

impl Town {
    /// # Errors
    ///
    /// Returns `ClientError::InvalidTown` unless both sizes are positive.
    pub fn new(server: String, clients: usize, size_x: i32, size_y: i32) -> Result<Town, ClientError> {
        if size_x <= 0 || size_y <= 0 {
            return Err(ClientError::InvalidTown(size_x, size_y));
        }
        let clients = if clients > MAX_CLIENTS {
            warn!("Limiting number of clients to {}", MAX_CLIENTS);
            MAX_CLIENTS
        } else {
            clients
        };
        Ok(Town {
            server,
            clients,
            size_x,
            size_y,
        })
    }
}

/// How every order of a run ended
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub delivered: usize,
    pub canceled: usize,
    pub dropped: usize,
    pub abandoned: usize,
    /// Customers that never got to order
    pub not_placed: usize,
}

impl Summary {
    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Delivered => self.delivered += 1,
            Outcome::Canceled => self.canceled += 1,
            Outcome::Dropped => self.dropped += 1,
            Outcome::Abandoned => self.abandoned += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delivered: {}, canceled: {}, dropped by the shop: {}, abandoned: {}, not placed: {}",
            self.delivered, self.canceled, self.dropped, self.abandoned, self.not_placed
        )
    }
}

/// Places one order per customer, then waits until every order ended.
/// When an order cannot be placed the remaining customers stay home and
/// everybody already waiting cancels.
///
/// # Errors
///
/// Returns an error only if not even the first customer could reach the shop.
pub async fn feed_town(town: &Town, leave: LeaveSignal) -> Result<Summary, ClientError> {
    let mut customers = JoinSet::new();
    let mut summary = Summary::default();
    for client in 1..=town.clients {
        if leave.is_raised() {
            summary.not_placed = town.clients - client + 1;
            break;
        }
        let coordinates = Coordinates::random_within(&mut rand::thread_rng(), town.size_x, town.size_y);
        let stream = match place_order(&town.server, coordinates).await {
            Ok(stream) => stream,
            Err(e) if client == 1 => return Err(e),
            Err(e) => {
                println!("Failed to send order coordinates for client {}", client);
                error!("{}", e);
                leave.raise();
                summary.not_placed = town.clients - client + 1;
                break;
            }
        };
        println!("Order placed at {} for client {}", coordinates, client);
        customers.spawn(follow_order(client, stream, leave.clone()));
    }

    while let Some(outcome) = customers.join_next().await {
        match outcome {
            Ok(outcome) => summary.count(outcome),
            Err(e) => error!("A customer task failed: {}", e),
        }
    }
    if summary.dropped == 0 && summary.abandoned == 0 {
        println!("All orders processed. Shutting down client.");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders::order_status::OrderStatus;
    use orders::wire;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_deliveries(listener: TcpListener, customers: usize) {
        for _ in 0..customers {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                let mut coordinates = [0u8; 8];
                stream.read_exact(&mut coordinates).await.unwrap();
                for status in [OrderStatus::Received, OrderStatus::Delivered] {
                    stream.write_all(&wire::encode_code(status.code())).await.unwrap();
                }
            });
        }
    }

    #[test]
    fn test_town_limits() {
        let town = Town::new("127.0.0.1:1".to_owned(), 5000, 10, 10).unwrap();
        assert_eq!(town.clients, MAX_CLIENTS);
        assert!(matches!(
            Town::new("127.0.0.1:1".to_owned(), 1, 0, 10),
            Err(ClientError::InvalidTown(0, 10))
        ));
    }

    #[tokio::test]
    async fn test_every_customer_is_fed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let town = Town::new(listener.local_addr().unwrap().to_string(), 5, 20, 20).unwrap();
        let shop = tokio::spawn(serve_deliveries(listener, 5));

        let summary = feed_town(&town, LeaveSignal::new()).await.unwrap();

        assert_eq!(summary.delivered, 5);
        assert_eq!(summary, Summary { delivered: 5, ..Summary::default() });
        shop.await.unwrap();
    }

    #[tokio::test]
    async fn test_nobody_orders_once_everybody_left() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let town = Town::new(listener.local_addr().unwrap().to_string(), 3, 5, 5).unwrap();
        let leave = LeaveSignal::new();
        leave.raise();

        let summary = feed_town(&town, leave).await.unwrap();

        assert_eq!(summary.not_placed, 3);
        assert_eq!(summary.delivered + summary.abandoned, 0);
    }
}
