//! # API crate: the OpenMed REST server
//!
//! With the default `server` feature this crate holds everything the API
//! server runs; without it only the wire [`models`] remain, which is what the
//! WASM client links against.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`models`] | none | `UserInfo`, `Role`, request bodies, `Place` |
//! | [`auth`] | `server` | Argon2 password hashing, session keys |
//! | [`config`] | `server` | `ServerConfig` from environment / `.env` |
//! | [`db`] | `server` | Postgres pool, migrations, `PgStore` |
//! | [`error`] | `server` | `ApiError` and its HTTP mapping |
//! | [`geocode`] | `server` | `Geocoder` trait and the Nominatim client |
//! | [`routes`] | `server` | axum router for `/v1/users/*` and `/v1/facilities/*` |
//! | [`signup`] | `server` | person + account signup workflow |
//! | [`state`] | `server` | `AppState` shared by handlers |
//! | [`users`] | `server` | `UserService`: create, fetch, authenticate accounts, set roles |
//! | [`validation`] | `server` | signup field rules |

pub mod models;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod db;
#[cfg(feature = "server")]
pub mod error;
#[cfg(feature = "server")]
pub mod geocode;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod signup;
#[cfg(feature = "server")]
pub mod state;
#[cfg(feature = "server")]
pub mod users;
#[cfg(feature = "server")]
pub mod validation;

pub use models::{
    Place, Role, RolesRequest, SigninRequest, SignupRequest, SignupResponse, UserInfo,
};

#[cfg(feature = "server")]
pub use config::ServerConfig;
#[cfg(feature = "server")]
pub use routes::router;
#[cfg(feature = "server")]
pub use state::AppState;
