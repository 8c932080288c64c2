//! Signup page view. Field rules are enforced by the API; its error message is
//! shown as-is.

use api::SignupRequest;
use dioxus::prelude::*;
use ui::client;

use crate::Route;

#[component]
pub fn Signup() -> Element {
    let nav = use_navigator();
    let mut form = use_signal(SignupRequest::default);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_signup = move |_| async move {
        error.set(None);
        loading.set(true);
        match client::sign_up(&form()).await {
            Ok(_) => {
                nav.push(Route::Login {});
            }
            Err(e) => error.set(Some(e)),
        }
        loading.set(false);
    };

    rsx! {
        div {
            class: "signup-container",
            h1 { "Create account" }

            if let Some(err) = error() {
                div { class: "error", "{err}" }
            }

            input {
                r#type: "text",
                placeholder: "Username",
                value: form().username,
                oninput: move |evt: FormEvent| form.write().username = evt.value(),
            }
            input {
                r#type: "email",
                placeholder: "Email",
                value: form().email,
                oninput: move |evt: FormEvent| form.write().email = evt.value(),
            }
            input {
                r#type: "password",
                placeholder: "Password (4 to 20 characters)",
                value: form().password,
                oninput: move |evt: FormEvent| form.write().password = evt.value(),
            }
            input {
                r#type: "text",
                placeholder: "First name",
                value: form().firstname,
                oninput: move |evt: FormEvent| form.write().firstname = evt.value(),
            }
            input {
                r#type: "text",
                placeholder: "Last name",
                value: form().lastname,
                oninput: move |evt: FormEvent| form.write().lastname = evt.value(),
            }
            input {
                r#type: "date",
                value: form().birthdate,
                oninput: move |evt: FormEvent| form.write().birthdate = evt.value(),
            }
            button {
                disabled: loading(),
                onclick: handle_signup,
                if loading() { "Creating account..." } else { "Sign up" }
            }

            p {
                "Already have an account? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
