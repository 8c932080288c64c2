//! # Signup workflow
//!
//! Creates a [`Person`](store::Person) and an account that reference each
//! other, in this order:
//!
//! 1. create the person (no `user_id` yet);
//! 2. create the account with `attributes.personId` set to the person id;
//! 3. link the person to the new account id;
//! 4. re-read the account;
//! 5. build the [`SignupResponse`].
//!
//! The stores offer no multi-record transaction, so a failure part way leaves
//! earlier records behind. [`SignupMode`] decides what happens then:
//!
//! - [`SignupMode::Compatible`] (default): log the failing step and return the
//!   opaque [`SignupError::Internal`]. A person whose account could not be
//!   created stays unlinked, and an account whose link update failed stays.
//! - [`SignupMode::Atomic`]: delete the person when account creation fails,
//!   and report a failed link as [`SignupError::LinkFailed`] with both ids so
//!   the caller can reconcile.

use std::sync::Arc;

use store::{AccountAttributes, NewPerson, PersonStore};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::SignupResponse;
use crate::users::UserService;
use crate::validation::ValidSignup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignupMode {
    #[default]
    Compatible,
    Atomic,
}

#[derive(Debug, Error, PartialEq)]
pub enum SignupError {
    #[error("Signup failed")]
    Internal,

    #[error("account {user_id} was created but could not be linked to person {person_id}")]
    LinkFailed { user_id: Uuid, person_id: Uuid },
}

#[derive(Clone)]
pub struct SignupWorkflow {
    persons: Arc<dyn PersonStore>,
    users: UserService,
    mode: SignupMode,
}

impl SignupWorkflow {
    pub fn new(persons: Arc<dyn PersonStore>, users: UserService, mode: SignupMode) -> Self {
        Self {
            persons,
            users,
            mode,
        }
    }

    pub async fn run(&self, input: ValidSignup) -> Result<SignupResponse, SignupError> {
        let person = self
            .persons
            .create_person(NewPerson {
                firstname: input.firstname,
                lastname: input.lastname,
                birthdate: input.birthdate,
            })
            .await
            .map_err(|e| {
                error!(step = "create_person", error = %e, "signup failed");
                SignupError::Internal
            })?;

        let user_id = match self
            .users
            .create_user(
                &input.username,
                &input.email,
                &input.password,
                AccountAttributes::for_person(person.id),
            )
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(step = "create_user", person_id = %person.id, error = %e, "signup failed");
                if self.mode == SignupMode::Atomic {
                    self.discard_person(person.id).await;
                }
                return Err(SignupError::Internal);
            }
        };

        if let Err(e) = self.persons.link_user(person.id, user_id).await {
            error!(
                step = "link_user",
                person_id = %person.id,
                user_id = %user_id,
                error = %e,
                "signup failed"
            );
            return Err(match self.mode {
                SignupMode::Compatible => SignupError::Internal,
                SignupMode::Atomic => SignupError::LinkFailed {
                    user_id,
                    person_id: person.id,
                },
            });
        }

        let account = self.users.get_user_by_id(user_id).await.map_err(|e| {
            error!(step = "get_user", user_id = %user_id, error = %e, "signup failed");
            SignupError::Internal
        })?;

        info!(user_id = %user_id, person_id = %person.id, "account created");

        Ok(SignupResponse {
            id: user_id.to_string(),
            username: account.as_ref().map(|a| a.username.clone()),
            email: account.as_ref().map(|a| a.email.clone()),
            person_id: person.id.to_string(),
        })
    }

    async fn discard_person(&self, person_id: Uuid) {
        match self.persons.delete_person(person_id).await {
            Ok(_) => info!(person_id = %person_id, "removed person of failed signup"),
            Err(e) => warn!(
                person_id = %person_id,
                error = %e,
                "could not remove person of failed signup"
            ),
        }
    }
}
