//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Input DTOs used by the repository layer for inserts and updates

pub mod credit_transaction;
pub mod generated_image;
pub mod product;
pub mod project;
pub mod session;
pub mod user;
