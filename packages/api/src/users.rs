//! Account service: creates and fetches credential-bearing accounts.

use std::sync::Arc;

use store::{Account, AccountAttributes, AccountStore, NewAccount, StoreError};
use thiserror::Error;
use uuid::Uuid;

use crate::auth;
use crate::models::Role;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("{0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct UserService {
    accounts: Arc<dyn AccountStore>,
}

impl UserService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Hash the password and persist a new account with the `patient` role.
    /// Returns the new account id.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        attributes: AccountAttributes,
    ) -> Result<Uuid, UserServiceError> {
        let password_hash = auth::hash_password(password).map_err(UserServiceError::Hash)?;

        let account = self
            .accounts
            .insert_account(NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                attributes,
                roles: vec![Role::Patient.to_string()],
            })
            .await?;

        Ok(account.id)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<Account>, UserServiceError> {
        Ok(self.accounts.get_account(id).await?)
    }

    /// Look up an account by username and check its password.
    ///
    /// Unknown usernames and wrong passwords both return `Ok(None)`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, UserServiceError> {
        let Some(account) = self.accounts.find_by_username(username.trim()).await? else {
            return Ok(None);
        };

        let valid = auth::verify_password(password.trim(), &account.password_hash)
            .map_err(UserServiceError::Hash)?;

        Ok(valid.then_some(account))
    }

    /// Replace an account's roles. Duplicates are dropped.
    pub async fn set_roles(&self, id: Uuid, roles: &[Role]) -> Result<Account, UserServiceError> {
        let mut names: Vec<String> = Vec::new();
        for role in roles {
            let name = role.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(self.accounts.set_roles(id, names).await?)
    }

    /// Add `role` to the account named `username`, keeping its other roles.
    ///
    /// Returns `Ok(None)` if no such account exists.
    pub async fn grant_role(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<Account>, UserServiceError> {
        let Some(account) = self.accounts.find_by_username(username.trim()).await? else {
            return Ok(None);
        };
        if account.roles.iter().any(|r| r == role.as_str()) {
            return Ok(Some(account));
        }

        let mut roles = account.roles;
        roles.push(role.to_string());
        Ok(Some(self.accounts.set_roles(account.id, roles).await?))
    }
}
