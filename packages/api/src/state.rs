use std::sync::Arc;

use store::{AccountStore, PersonStore};

use crate::geocode::Geocoder;
use crate::signup::{SignupMode, SignupWorkflow};
use crate::users::UserService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub signup: SignupWorkflow,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn new(
        persons: Arc<dyn PersonStore>,
        accounts: Arc<dyn AccountStore>,
        geocoder: Arc<dyn Geocoder>,
        signup_mode: SignupMode,
    ) -> Self {
        let users = UserService::new(accounts);
        let signup = SignupWorkflow::new(persons, users.clone(), signup_mode);

        Self {
            users,
            signup,
            geocoder,
        }
    }
}
