//! # HTTP routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/users/signup` | [`users::signup`] |
//! | `POST` | `/v1/users/signin` | [`users::signin`] |
//! | `POST` | `/v1/users/signout` | [`users::signout`] |
//! | `GET` | `/v1/users/me` | [`users::current_user`] |
//! | `PUT` | `/v1/users/{id}/roles` | [`users::set_roles`] |
//! | `GET` | `/v1/facilities/search` | [`facilities::search`] |
//!
//! The session layer and CORS depend on runtime configuration and are added by
//! the server binary on top of [`router`].

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod facilities;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/users/signup", post(users::signup))
        .route("/v1/users/signin", post(users::signin))
        .route("/v1/users/signout", post(users::signout))
        .route("/v1/users/me", get(users::current_user))
        .route("/v1/users/{id}/roles", put(users::set_roles))
        .route("/v1/facilities/search", get(facilities::search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use store::{MemoryStore, NewPerson, Person, PersonStore, StoreError, StoreResult};
    use tower::ServiceExt;
    use tower_sessions::SessionManagerLayer;
    use uuid::Uuid;

    use crate::geocode::{GeoQuery, GeocodeError, Geocoder};
    use crate::models::{Place, Role};
    use crate::signup::SignupMode;
    use crate::users::UserService;

    /// Returns one fixed place naming the query it was given.
    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(&self, query: &GeoQuery) -> Result<Vec<Place>, GeocodeError> {
            let name = query.q.clone().unwrap_or_else(|| "structured".to_string());
            Ok(vec![serde_json::from_value(json!({
                "place_id": 1,
                "display_name": name,
                "lat": "45.07",
                "lon": "7.68",
                "type": "hospital",
            }))
            .unwrap()])
        }
    }

    struct DownGeocoder;

    #[async_trait]
    impl Geocoder for DownGeocoder {
        async fn search(&self, _query: &GeoQuery) -> Result<Vec<Place>, GeocodeError> {
            Err(GeocodeError::Status(503))
        }
    }

    fn app_with(store: &MemoryStore, geocoder: Arc<dyn Geocoder>) -> Router {
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            geocoder,
            SignupMode::Compatible,
        );
        router(state).layer(SessionManagerLayer::new(
            tower_sessions::MemoryStore::default(),
        ))
    }

    fn app(store: &MemoryStore) -> Router {
        app_with(store, Arc::new(StubGeocoder))
    }

    struct Reply {
        status: StatusCode,
        body: Value,
        cookie: Option<String>,
    }

    async fn send(app: &Router, request: Request<Body>) -> Reply {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply {
            status,
            body,
            cookie,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::put(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn alice() -> Value {
        json!({
            "username": "alice",
            "email": "a@b.com",
            "password": "pass1",
            "firstname": "Alice",
            "lastname": "Doe",
            "birthdate": "1990-01-01",
        })
    }

    fn with(mut body: Value, key: &str, value: &str) -> Value {
        body[key] = json!(value);
        body
    }

    fn error_fields(body: &Value) -> Vec<String> {
        body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_signup_created() {
        let store = MemoryStore::new();
        let reply = send(&app(&store), post_json("/v1/users/signup", alice())).await;

        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body["username"], "alice");
        assert_eq!(reply.body["email"], "a@b.com");

        let persons = store.persons();
        let accounts = store.accounts();
        assert_eq!(persons.len(), 1);
        assert_eq!(reply.body["personId"], persons[0].id.to_string());
        assert_eq!(reply.body["id"], accounts[0].id.to_string());
        assert_eq!(persons[0].user_id, Some(accounts[0].id));
        assert!(reply.body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_signup_short_password() {
        let store = MemoryStore::new();
        let reply = send(
            &app(&store),
            post_json("/v1/users/signup", with(alice(), "password", "pw")),
        )
        .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&reply.body), vec!["password"]);
        assert_eq!(
            reply.body["errors"][0]["message"],
            "Password must be between 4 and 20 characters"
        );
    }

    #[tokio::test]
    async fn test_signup_non_alphabetic_lastname() {
        let store = MemoryStore::new();
        let reply = send(
            &app(&store),
            post_json("/v1/users/signup", with(alice(), "lastname", "Doe3")),
        )
        .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&reply.body), vec!["lastname"]);
    }

    #[tokio::test]
    async fn test_signup_validation_creates_nothing() {
        let store = MemoryStore::new();
        let app = app(&store);
        let invalid = [
            with(alice(), "username", "   "),
            with(alice(), "email", "not-an-email"),
            with(alice(), "password", "x".repeat(21).as_str()),
            with(alice(), "firstname", ""),
            with(alice(), "lastname", "D0e"),
            with(alice(), "birthdate", "yesterday"),
        ];

        for body in invalid {
            let reply = send(&app, post_json("/v1/users/signup", body)).await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
            assert_eq!(error_fields(&reply.body).len(), 1);
        }

        assert!(store.persons().is_empty());
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn test_signup_missing_field_is_validation_error() {
        let store = MemoryStore::new();
        let mut body = alice();
        body.as_object_mut().unwrap().remove("birthdate");

        let reply = send(&app(&store), post_json("/v1/users/signup", body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&reply.body), vec!["birthdate"]);
    }

    #[tokio::test]
    async fn test_signup_duplicate_username_is_opaque_server_error() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, post_json("/v1/users/signup", alice())).await;

        let reply = send(
            &app,
            post_json("/v1/users/signup", with(alice(), "email", "other@b.com")),
        )
        .await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.body["errors"][0]["message"],
            crate::error::INTERNAL_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_signin_and_current_user() {
        let store = MemoryStore::new();
        let app = app(&store);
        let created = send(&app, post_json("/v1/users/signup", alice())).await;

        let signed_in = send(
            &app,
            post_json(
                "/v1/users/signin",
                json!({ "username": "alice", "password": "pass1" }),
            ),
        )
        .await;
        assert_eq!(signed_in.status, StatusCode::OK);
        assert_eq!(signed_in.body["roles"], json!(["patient"]));
        let cookie = signed_in.cookie.expect("session cookie");

        let me = send(&app, get_with_cookie("/v1/users/me", Some(&cookie))).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["id"], created.body["id"]);
        assert_eq!(me.body["personId"], created.body["personId"]);
    }

    #[tokio::test]
    async fn test_current_user_requires_session() {
        let store = MemoryStore::new();
        let reply = send(&app(&store), get_with_cookie("/v1/users/me", None)).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, post_json("/v1/users/signup", alice())).await;

        let reply = send(
            &app,
            post_json(
                "/v1/users/signin",
                json!({ "username": "alice", "password": "nope" }),
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            reply.body["errors"][0]["message"],
            "Invalid username or password"
        );
    }

    #[tokio::test]
    async fn test_signout_ends_session() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, post_json("/v1/users/signup", alice())).await;
        let signed_in = send(
            &app,
            post_json(
                "/v1/users/signin",
                json!({ "username": "alice", "password": "pass1" }),
            ),
        )
        .await;
        let cookie = signed_in.cookie.unwrap();

        let signout = Request::post("/v1/users/signout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, signout).await.status, StatusCode::NO_CONTENT);

        let me = send(&app, get_with_cookie("/v1/users/me", Some(&cookie))).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_facility_search() {
        let store = MemoryStore::new();
        let reply = send(
            &app(&store),
            get_with_cookie("/v1/facilities/search?q=Ospedale%20Molinette", None),
        )
        .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body[0]["display_name"], "Ospedale Molinette");
        assert_eq!(reply.body[0]["type"], "hospital");
    }

    #[tokio::test]
    async fn test_facility_search_empty_query() {
        let store = MemoryStore::new();
        let reply = send(
            &app(&store),
            get_with_cookie("/v1/facilities/search?q=", None),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_facility_search_provider_down() {
        let store = MemoryStore::new();
        let reply = send(
            &app_with(&store, Arc::new(DownGeocoder)),
            get_with_cookie("/v1/facilities/search?city=Torino", None),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_signup_null_and_non_string_fields_are_field_errors() {
        let store = MemoryStore::new();
        let app = app(&store);

        let mut body = alice();
        body["username"] = Value::Null;
        let reply = send(&app, post_json("/v1/users/signup", body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&reply.body), vec!["username"]);
        assert_eq!(reply.body["errors"][0]["message"], "Username is required");

        let mut body = alice();
        body["password"] = json!(12345);
        let reply = send(&app, post_json("/v1/users/signup", body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&reply.body), vec!["password"]);

        assert!(store.persons().is_empty());
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn test_signup_malformed_json_uses_error_body() {
        let store = MemoryStore::new();
        let request = Request::post("/v1/users/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": "))
            .unwrap();

        let reply = send(&app(&store), request).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.body["errors"][0]["message"].is_string());
    }

    /// Person store whose link updates always fail.
    #[derive(Clone, Default)]
    struct UnlinkablePersons(MemoryStore);

    #[async_trait]
    impl PersonStore for UnlinkablePersons {
        async fn create_person(&self, person: NewPerson) -> StoreResult<Person> {
            self.0.create_person(person).await
        }

        async fn get_person(&self, id: Uuid) -> StoreResult<Option<Person>> {
            self.0.get_person(id).await
        }

        async fn link_user(&self, _person_id: Uuid, _user_id: Uuid) -> StoreResult<()> {
            Err(StoreError::Backend("write timed out".into()))
        }

        async fn delete_person(&self, id: Uuid) -> StoreResult<bool> {
            self.0.delete_person(id).await
        }
    }

    #[tokio::test]
    async fn test_atomic_signup_link_failure_body() {
        let persons = UnlinkablePersons::default();
        let accounts = MemoryStore::new();
        let state = AppState::new(
            Arc::new(persons.clone()),
            Arc::new(accounts.clone()),
            Arc::new(StubGeocoder),
            SignupMode::Atomic,
        );
        let app = router(state).layer(SessionManagerLayer::new(
            tower_sessions::MemoryStore::default(),
        ));

        let reply = send(&app, post_json("/v1/users/signup", alice())).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body["code"], "link_failed");
        assert_eq!(reply.body["userId"], accounts.accounts()[0].id.to_string());
        assert_eq!(reply.body["personId"], persons.0.persons()[0].id.to_string());
        assert!(reply.body["errors"][0]["message"].is_string());
    }

    async fn sign_in_as(app: &Router, username: &str) -> String {
        let reply = send(
            app,
            post_json(
                "/v1/users/signin",
                json!({ "username": username, "password": "pass1" }),
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.cookie.expect("session cookie")
    }

    #[tokio::test]
    async fn test_admin_sets_roles() {
        let store = MemoryStore::new();
        let app = app(&store);
        let alice_id = send(&app, post_json("/v1/users/signup", alice())).await.body["id"]
            .as_str()
            .unwrap()
            .to_string();
        send(&app, post_json("/v1/users/signup", with(alice(), "username", "root"))).await;
        UserService::new(Arc::new(store.clone()))
            .grant_role("root", Role::Admin)
            .await
            .unwrap()
            .unwrap();

        let cookie = sign_in_as(&app, "root").await;
        let uri = format!("/v1/users/{alice_id}/roles");
        let reply = send(
            &app,
            put_json(&uri, Some(&cookie), json!({ "roles": ["doctor", "patient"] })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["roles"], json!(["doctor", "patient"]));

        let alice_cookie = sign_in_as(&app, "alice").await;
        let me = send(&app, get_with_cookie("/v1/users/me", Some(&alice_cookie))).await;
        assert_eq!(me.body["roles"], json!(["doctor", "patient"]));
    }

    #[tokio::test]
    async fn test_set_roles_requires_admin() {
        let store = MemoryStore::new();
        let app = app(&store);
        let alice_id = send(&app, post_json("/v1/users/signup", alice())).await.body["id"]
            .as_str()
            .unwrap()
            .to_string();
        let uri = format!("/v1/users/{alice_id}/roles");
        let body = json!({ "roles": ["admin"] });

        let reply = send(&app, put_json(&uri, None, body.clone())).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let cookie = sign_in_as(&app, "alice").await;
        let reply = send(&app, put_json(&uri, Some(&cookie), body)).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN);
        assert_eq!(store.accounts()[0].roles, vec!["patient"]);
    }

    #[tokio::test]
    async fn test_set_roles_unknown_account() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, post_json("/v1/users/signup", with(alice(), "username", "root"))).await;
        UserService::new(Arc::new(store.clone()))
            .grant_role("root", Role::Admin)
            .await
            .unwrap();

        let cookie = sign_in_as(&app, "root").await;
        let uri = format!("/v1/users/{}/roles", Uuid::new_v4());
        let reply = send(&app, put_json(&uri, Some(&cookie), json!({ "roles": ["doctor"] }))).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["errors"][0]["message"], "User not found");
    }
}
