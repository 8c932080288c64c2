//! # Storage traits
//!
//! Two async traits split persistence along record lines:
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`PersonStore`] | `create_person`, `get_person`, `link_user`, `delete_person` |
//! | [`AccountStore`] | `insert_account`, `get_account`, `find_by_username`, `set_roles` |
//!
//! Implementations must reject a second account with an existing username with
//! [`StoreError::Conflict`]; that is the only uniqueness rule the server relies
//! on. Neither trait offers a multi-record transaction.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, NewAccount, NewPerson, Person};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),

    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person>;

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<Person>>;

    /// Record the owning account on a person. Fails with
    /// [`StoreError::NotFound`] if the person does not exist.
    async fn link_user(&self, person_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_person(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account>;

    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Replace an account's roles and return the updated account. Fails with
    /// [`StoreError::NotFound`] if the account does not exist.
    async fn set_roles(&self, id: Uuid, roles: Vec<String>) -> StoreResult<Account>;
}
