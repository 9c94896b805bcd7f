pub mod barber;
pub mod config;
pub mod constants;
pub mod customer;
pub mod error;
pub mod events;
pub mod monitor;
pub mod shop;
