//! REST client for the OpenMed API.
//!
//! The session lives in a cookie set by the API server. In the browser each
//! request opts into sending credentials; natively the shared client keeps a
//! cookie jar.

#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;

use api::{SigninRequest, SignupRequest, SignupResponse, UserInfo};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

/// Base URL of the API server, overridable at build time.
pub fn api_base() -> &'static str {
    option_env!("OPENMED_API_URL").unwrap_or("http://localhost:3000")
}

/// Shared client with a cookie jar. A client without one would lose the
/// session, so a build failure is reported on every request instead.
#[cfg(not(target_arch = "wasm32"))]
fn http() -> Result<reqwest::Client, String> {
    static CLIENT: OnceLock<Result<reqwest::Client, String>> = OnceLock::new();
    CLIENT
        .get_or_init(|| {
            reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .map_err(|e| {
                    tracing::error!("Failed to build HTTP client: {}", e);
                    format!("Failed to build HTTP client: {}", e)
                })
        })
        .clone()
}

#[cfg(target_arch = "wasm32")]
fn http() -> Result<reqwest::Client, String> {
    Ok(reqwest::Client::new())
}

fn with_credentials(request: RequestBuilder) -> RequestBuilder {
    #[cfg(target_arch = "wasm32")]
    {
        request.fetch_credentials_include()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        request
    }
}

/// First error message of an API error body, or the status line.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body["errors"][0]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

/// The signed-in user, or `None` when there is no session.
pub async fn current_user() -> Result<Option<UserInfo>, String> {
    let response = with_credentials(http()?.get(format!("{}/v1/users/me", api_base())))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    match response.status() {
        StatusCode::UNAUTHORIZED => Ok(None),
        s if s.is_success() => response.json().await.map(Some).map_err(|e| e.to_string()),
        _ => Err(error_message(response).await),
    }
}

pub async fn sign_in(username: String, password: String) -> Result<UserInfo, String> {
    let response = with_credentials(http()?.post(format!("{}/v1/users/signin", api_base())))
        .json(&SigninRequest { username, password })
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(error_message(response).await);
    }
    response.json().await.map_err(|e| e.to_string())
}

pub async fn sign_out() -> Result<(), String> {
    let response = with_credentials(http()?.post(format!("{}/v1/users/signout", api_base())))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(error_message(response).await);
    }
    Ok(())
}

pub async fn sign_up(request: &SignupRequest) -> Result<SignupResponse, String> {
    let response = with_credentials(http()?.post(format!("{}/v1/users/signup", api_base())))
        .json(request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status() != StatusCode::CREATED {
        return Err(error_message(response).await);
    }
    response.json().await.map_err(|e| e.to_string())
}
