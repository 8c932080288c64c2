use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Account, NewAccount, NewPerson, Person};
use crate::repo::{AccountStore, PersonStore, StoreError, StoreResult};

/// In-memory store for testing and database-less development.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    persons: Arc<Mutex<HashMap<Uuid, Person>>>,
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored person.
    pub fn persons(&self) -> Vec<Person> {
        lock(&self.persons)
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every stored account.
    pub fn accounts(&self) -> Vec<Account> {
        lock(&self.accounts)
            .map(|a| a.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person> {
        let person = Person {
            id: Uuid::new_v4(),
            firstname: person.firstname,
            lastname: person.lastname,
            birthdate: person.birthdate,
            user_id: None,
            created_at: Utc::now(),
        };
        lock(&self.persons)?.insert(person.id, person.clone());
        Ok(person)
    }

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<Person>> {
        Ok(lock(&self.persons)?.get(&id).cloned())
    }

    async fn link_user(&self, person_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut persons = lock(&self.persons)?;
        let person = persons
            .get_mut(&person_id)
            .ok_or(StoreError::NotFound(person_id))?;
        person.user_id = Some(user_id);
        Ok(())
    }

    async fn delete_person(&self, id: Uuid) -> StoreResult<bool> {
        Ok(lock(&self.persons)?.remove(&id).is_some())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut accounts = lock(&self.accounts)?;
        if accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}'",
                account.username
            )));
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            attributes: account.attributes,
            roles: account.roles,
            created_at: Utc::now(),
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(lock(&self.accounts)?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(lock(&self.accounts)?
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn set_roles(&self, id: Uuid, roles: Vec<String>) -> StoreResult<Account> {
        let mut accounts = lock(&self.accounts)?;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        account.roles = roles;
        Ok(account.clone())
    }
}
