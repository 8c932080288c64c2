use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use store::{
    Account, AccountAttributes, AccountStore, NewAccount, NewPerson, Person, PersonStore,
    StoreError, StoreResult,
};
use uuid::Uuid;

/// Postgres-backed person and account store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PersonRow {
    id: Uuid,
    firstname: String,
    lastname: String,
    birthdate: NaiveDate,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            birthdate: row.birthdate,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    attributes: Json<AccountAttributes>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            attributes: row.attributes.0,
            roles: row.roles,
            created_at: row.created_at,
        }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl PersonStore for PgStore {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person> {
        let row: PersonRow = sqlx::query_as(
            "INSERT INTO persons (id, firstname, lastname, birthdate) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&person.firstname)
        .bind(&person.lastname)
        .bind(person.birthdate)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<Person>> {
        let row: Option<PersonRow> = sqlx::query_as("SELECT * FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Person::from))
    }

    async fn link_user(&self, person_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE persons SET user_id = $2 WHERE id = $1")
            .bind(person_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(person_id));
        }
        Ok(())
    }

    async fn delete_person(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let row: AccountRow = sqlx::query_as(
            "INSERT INTO accounts (id, username, email, password_hash, attributes, roles)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(Json(&account.attributes))
        .bind(&account.roles)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("username '{}'", account.username))
            }
            other => backend(other),
        })?;

        Ok(row.into())
    }

    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Account::from))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        Ok(row.map(Account::from))
    }

    async fn set_roles(&self, id: Uuid, roles: Vec<String>) -> StoreResult<Account> {
        let row: Option<AccountRow> =
            sqlx::query_as("UPDATE accounts SET roles = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(&roles)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        row.map(Account::from).ok_or(StoreError::NotFound(id))
    }
}
