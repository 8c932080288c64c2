//! Local password authentication and session handling.

mod password;
mod session;

pub use password::{hash_password, verify_password};
pub use session::{session_user_id, sign_in, SESSION_USER_ID_KEY};
