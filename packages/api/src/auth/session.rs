//! Session keys and accessors.

use tower_sessions::Session;
use uuid::Uuid;

/// Key for storing the signed-in account id in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Account id stored in the session, if any.
///
/// A value that is not a valid UUID is treated as signed out.
pub async fn session_user_id(session: &Session) -> Result<Option<Uuid>, tower_sessions::session::Error> {
    let user_id: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    Ok(user_id.and_then(|id| Uuid::parse_str(&id).ok()))
}

/// Bind the session to an account, rotating the session id first.
pub async fn sign_in(session: &Session, user_id: Uuid) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id.to_string()).await
}
