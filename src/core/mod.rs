pub mod account;
pub mod amount;
pub mod clock;
pub mod config;
pub mod error;
pub mod reserve;
pub mod state;
pub mod transfer;
pub mod vault;
