//! Client-side building blocks for the OpenMed single-page app: the
//! navigation guard, the auth context and the REST client.

pub mod client;
pub mod guard;

mod auth;
pub use auth::{use_auth, AuthProvider, AuthState, LogoutButton};

pub use guard::{before_each, evaluate, Navigation, Session};
