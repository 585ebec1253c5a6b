//! API Module
//!
//! HTTP handlers and routing for the cleaning task REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check, unauthenticated
//! - `/staff-members`, `/areas` - Directory and area lookups
//! - `/cleaning-task-templates` - Template create and get
//! - `/cleaning-task-template-lists` - Template lists and their templates
//! - `/cleaning-task-lists` - Task lists, their tasks and sign-offs
//! - `DELETE /cleaning-tasks/:id` - Task delete

pub mod extract;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
