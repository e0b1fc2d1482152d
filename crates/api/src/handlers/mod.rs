//! Request handlers, one module per resource.
//!
//! Handlers validate input with the rules in `modiste_core`, delegate
//! persistence to the repositories in `modiste_db` and map errors via
//! [`crate::error::AppError`].

pub mod auth;
pub mod generation;
pub mod images;
pub mod products;
pub mod projects;
pub mod users;
