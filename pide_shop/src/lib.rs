pub mod config;
pub mod connection;
pub mod cook;
pub mod delivery_person;
pub mod error;
pub mod logging;
pub mod manager;
pub mod order_store;
pub mod oven;
pub mod server;
pub mod shop;
pub mod shutdown;
pub mod staff;
pub mod stage_queue;
pub mod status_emitter;
pub mod transition_log;
mod work;
