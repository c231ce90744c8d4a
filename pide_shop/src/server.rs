//! TCP front door: one thread per customer connection.
//!
//! A customer sends the coordinates of its order once and then only listens. The
//! thread that took the order keeps reading from the connection: a cancel code, or the
//! customer closing, cancels the order. That thread and the order share one socket.
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use orders::wire::{self, CustomerRequest};
use tracing::{debug, error, info, warn};

use crate::connection::TcpOrderConnection;
use crate::shop::Shop;
use crate::transition_log::Agent;

/// Pause after a failed accept, so running out of descriptors does not turn into a busy loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts customers until the listener fails for good. Never returns in normal operation.
pub fn serve(listener: TcpListener, shop: Arc<Shop>) {
    if let Ok(addr) = listener.local_addr() {
        info!("[SHOP] Taking orders at {}", addr);
    }
    for (customer_number, stream) in listener.incoming().enumerate() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("[SHOP] Failed to accept a customer: {}", e);
                thread::sleep(ACCEPT_BACKOFF);
                continue;
            }
        };
        let shop = Arc::clone(&shop);
        let spawned = thread::Builder::new()
            .name(format!("customer-{}", customer_number))
            .spawn(move || handle_customer(&shop, stream));
        if let Err(e) = spawned {
            error!("[SHOP] Could not attend customer {}: {}", customer_number, e);
        }
    }
}

/// Reads the order of one customer, hands it to the manager and watches the connection
/// until the customer cancels or leaves.
pub fn handle_customer(shop: &Shop, stream: TcpStream) {
    let peer = stream.peer_addr().ok();
    let mut reader = &stream;
    let coordinates = match wire::read_coordinates(&mut reader) {
        Ok(coordinates) => coordinates,
        Err(e) => {
            warn!("[MANAGER] No coordinates from {:?}: {}", peer, e);
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
    };
    let stream = Arc::new(stream);
    match shop.take_order(coordinates, Box::new(TcpOrderConnection::new(Arc::clone(&stream)))) {
        Ok(order_id) => watch_customer(shop, order_id, &stream),
        Err(e) => info!("[MANAGER] Order from {:?} not taken: {}", peer, e),
    }
}

/// Returns once the customer cancels, leaves, or the shop closes the connection.
fn watch_customer(shop: &Shop, order_id: usize, mut stream: &TcpStream) {
    loop {
        match wire::read_customer_request(&mut stream) {
            Ok(CustomerRequest::Cancel) => {
                if shop.cancel(order_id, Agent::Customer) {
                    info!("[MANAGER] Order {} canceled by its customer", order_id);
                }
                return;
            }
            Ok(CustomerRequest::Unknown(code)) => {
                debug!("[MANAGER] Ignoring code {} from customer of order {}", code, order_id);
            }
            Err(e) => {
                if shop.cancel(order_id, Agent::Customer) {
                    info!("[MANAGER] Customer of order {} left ({}), order canceled", order_id, e);
                }
                return;
            }
        }
    }
}
