//! Wire models shared by the server and the client.

mod place;
mod signup;
mod user;

pub use place::Place;
pub use signup::{SigninRequest, SignupRequest, SignupResponse};
pub use user::{Role, RolesRequest, UserInfo};
