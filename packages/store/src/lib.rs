//! Record models and storage traits for OpenMed.
//!
//! The API server only talks to persistence through the [`PersonStore`] and
//! [`AccountStore`] traits. The Postgres implementation lives in the `api`
//! crate next to its connection pool; [`MemoryStore`] lives here and backs the
//! test suites and database-less development runs.

pub mod models;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use models::{Account, AccountAttributes, NewAccount, NewPerson, Person};
pub use repo::{AccountStore, PersonStore, StoreError, StoreResult};
