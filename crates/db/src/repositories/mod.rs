//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` (or an open transaction) as the first argument.
//! Owner-scoped entities take the requesting user's id and never return
//! rows belonging to someone else.

pub mod credit_repo;
pub mod generated_image_repo;
pub mod product_repo;
pub mod project_repo;
pub mod session_repo;
pub mod user_repo;

pub use credit_repo::CreditRepo;
pub use generated_image_repo::GeneratedImageRepo;
pub use product_repo::ProductRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

/// Open Postgres transaction, as passed to the `*_in_tx` helpers.
pub type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
