//! REST server entry point used when the binary is built with `--features server`.

use std::sync::Arc;

use api::geocode::NominatimGeocoder;
use api::{AppState, Role, ServerConfig};
use axum::http::{header, HeaderValue, Method};
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn launch() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    let geocoder = NominatimGeocoder::new(&config.geocoder_url, &config.geocoder_agent)
        .expect("Failed to build geocoder client");

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .client_origin
                .parse::<HeaderValue>()
                .expect("OPENMED_CLIENT_ORIGIN is not a valid header value"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let router = match config.database_url.as_deref() {
        Some(url) => {
            let pool = api::db::connect(url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            api::db::migrate(&pool)
                .await
                .expect("Failed to run migrations");

            let session_store = PostgresStore::new(pool.clone());
            session_store
                .migrate()
                .await
                .expect("Failed to migrate session store");

            let db = Arc::new(api::db::PgStore::new(pool));
            let state = AppState::new(db.clone(), db, Arc::new(geocoder), config.signup_mode);
            bootstrap_admin(&state, &config).await;
            api::router(state).layer(session_layer(session_store, &config))
        }
        None => {
            warn!("DATABASE_URL not set, data is kept in memory and lost on restart");

            let memory = Arc::new(store::MemoryStore::new());
            let state = AppState::new(
                memory.clone(),
                memory,
                Arc::new(geocoder),
                config.signup_mode,
            );
            bootstrap_admin(&state, &config).await;
            api::router(state).layer(session_layer(
                tower_sessions::MemoryStore::default(),
                &config,
            ))
        }
    }
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind listener");
    info!("Server listening on {}", config.addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server stopped");
}

/// Grants the admin role to `OPENMED_ADMIN_USERNAME` if that account exists.
async fn bootstrap_admin(state: &AppState, config: &ServerConfig) {
    let Some(username) = config.admin_username.as_deref() else {
        return;
    };

    match state.users.grant_role(username, Role::Admin).await {
        Ok(Some(account)) => info!(user_id = %account.id, "admin role granted to {}", username),
        Ok(None) => warn!("OPENMED_ADMIN_USERNAME {} has no account yet", username),
        Err(e) => error!("Failed to grant admin role to {}: {}", username, e),
    }
}

fn session_layer<S: SessionStore + Clone>(
    session_store: S,
    config: &ServerConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(
            // session_days is capped by MAX_SESSION_DAYS, well inside the cookie range
            config
                .session_ttl()
                .try_into()
                .expect("Session lifetime out of range"),
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
