//! # Database module, PostgreSQL persistence
//!
//! - [`connect`] opens the shared connection pool and [`migrate`] applies the
//!   embedded migrations under `packages/api/migrations`.
//! - [`PgStore`] implements both [`store::PersonStore`] and
//!   [`store::AccountStore`] on top of that pool with plain runtime queries,
//!   so no database is needed at compile time.
//!
//! `accounts.username` carries a `UNIQUE` constraint; a violation surfaces as
//! [`store::StoreError::Conflict`].

mod pool;
mod postgres;

pub use pool::{connect, migrate};
pub use postgres::PgStore;
