//! The cook and delivery threads of a running shop.
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::cook::CookWorker;
use crate::delivery_person::CourierWorker;
use crate::error::ShopError;
use crate::shop::Shop;

pub struct Staff {
    workers: Vec<JoinHandle<()>>,
}

impl Staff {
    /// Starts one thread per cook and per delivery person of `shop`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Spawn` if a thread cannot be started. Threads already started
    /// stay up until the shop closes.
    pub fn hire(shop: &Arc<Shop>) -> Result<Staff, ShopError> {
        let mut workers = Vec::with_capacity(shop.cooks().len() + shop.delivery_people().len());
        for cook_index in 0..shop.cooks().len() {
            let worker = CookWorker::new(Arc::clone(shop), cook_index);
            workers.push(spawn(format!("cook-{}", cook_index), move || worker.run())?);
        }
        for courier_index in 0..shop.delivery_people().len() {
            let worker = CourierWorker::new(Arc::clone(shop), courier_index);
            workers.push(spawn(format!("delivery-{}", courier_index), move || worker.run())?);
        }
        info!(
            "[SHOP] {} workers hired, oven fits {} orders",
            workers.len(),
            shop.oven().capacity()
        );
        Ok(Staff { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every worker to leave. Only returns after the shop was shut down.
    pub fn dismiss(self) {
        for worker in self.workers {
            let name = worker.thread().name().unwrap_or("worker").to_owned();
            if worker.join().is_err() {
                error!("[SHOP] {} panicked", name);
            }
        }
    }
}

fn spawn<F>(name: String, body: F) -> Result<JoinHandle<()>, ShopError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source: io::Error| ShopError::Spawn { name, source })
}
