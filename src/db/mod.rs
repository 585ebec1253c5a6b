//! Database Module
//!
//! The connection/transaction gateway and the stores behind it.
//!
//! # Stores
//! - `PgStore`: Postgres through a sqlx pool
//! - `MemoryStore`: in-process tables, for development and tests

mod gateway;
mod memory;
mod postgres;
mod store;

pub use gateway::Gateway;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Store, StoreError, StoreResult, Tables, Transaction};
