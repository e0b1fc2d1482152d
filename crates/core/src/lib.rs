//! Domain types, constants and pure business rules for Modiste.
//!
//! Nothing in this crate touches the database or the network, so the rules
//! here (credit accounting, request validation, graph shape checks) can be
//! unit-tested in isolation and reused by every other crate.

pub mod account;
pub mod catalog;
pub mod credits;
pub mod error;
pub mod generation;
pub mod project;
pub mod roles;
pub mod types;
