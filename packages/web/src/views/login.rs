//! Login page view with username/password form.

use dioxus::prelude::*;
use ui::{client, use_auth, AuthState};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let mut auth = use_auth();
    let nav = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |_| async move {
        error.set(None);
        loading.set(true);
        match client::sign_in(username(), password()).await {
            Ok(user) => {
                auth.set(AuthState::signed_in(user));
                nav.push(Route::Home {});
            }
            Err(e) => error.set(Some(e)),
        }
        loading.set(false);
    };

    rsx! {
        div {
            class: "login-container",
            h1 { "OpenMed" }

            if let Some(err) = error() {
                div { class: "error", "{err}" }
            }

            input {
                r#type: "text",
                placeholder: "Username",
                value: username(),
                oninput: move |evt: FormEvent| username.set(evt.value()),
            }
            input {
                r#type: "password",
                placeholder: "Password",
                value: password(),
                oninput: move |evt: FormEvent| password.set(evt.value()),
            }
            button {
                disabled: loading(),
                onclick: handle_login,
                if loading() { "Signing in..." } else { "Sign in" }
            }

            p {
                "No account yet? "
                Link { to: Route::Signup {}, "Sign up" }
            }
        }
    }
}
