//! Staff Module
//!
//! Read-only staff projection over the external identity directory.

mod directory;
mod members;

pub use directory::{DirectoryError, DirectoryUser, StaffDirectory, StaticStaffDirectory};
pub use members::StaffMembers;
