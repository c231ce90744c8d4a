//! Vocabulary shared by the shop and its customers: what an order is,
//! the statuses it goes through and how they travel over the wire.
pub mod coordinates;
pub mod order;
pub mod order_status;
pub mod wire;
