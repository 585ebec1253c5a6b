//! Cleaning Tasks - REST backend for leisure-centre cleaning checklists
//!
//! Managers define cleaning task templates, group them into template lists
//! and generate dated task lists that staff complete and sign off.

pub mod api;
pub mod auth;
pub mod cleaning;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod staff;

pub use api::{create_router, AppState};
pub use cleaning::CleaningService;
pub use config::Config;
pub use db::Gateway;
