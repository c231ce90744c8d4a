pub mod crowd;
pub mod customer;
pub mod error;
