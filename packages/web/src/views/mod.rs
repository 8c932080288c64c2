use dioxus::prelude::*;
use ui::{use_auth, LogoutButton};

use crate::Route;

mod login;
pub use login::Login;

mod signup;
pub use signup::Signup;

#[component]
fn Page(title: String, children: Element) -> Element {
    rsx! {
        div {
            class: "page",
            nav {
                Link { to: Route::Home {}, "Home" }
                " | "
                Link { to: Route::Surveys {}, "Surveys" }
                " | "
                Link { to: Route::Appointments {}, "Appointments" }
                " | "
                Link { to: Route::Users {}, "Users" }
                " | "
                Link { to: Route::About {}, "About" }
            }
            h1 { "{title}" }
            {children}
        }
    }
}

#[component]
pub fn Home() -> Element {
    let auth = use_auth();
    let username = auth()
        .user
        .map(|u| u.username)
        .unwrap_or_default();

    rsx! {
        Page { title: "OpenMed",
            p { "Signed in as {username}" }
            LogoutButton {}
        }
    }
}

#[component]
pub fn About() -> Element {
    rsx! {
        Page { title: "About",
            p { "Book and manage medical appointments." }
        }
    }
}

#[component]
pub fn Users() -> Element {
    rsx! {
        Page { title: "Users",
            p { "Registered accounts." }
        }
    }
}

#[component]
pub fn Surveys() -> Element {
    rsx! {
        Page { title: "Surveys",
            p { "Patient surveys." }
        }
    }
}

#[component]
pub fn Appointments() -> Element {
    rsx! {
        Page { title: "Appointments",
            p { "Upcoming appointments." }
        }
    }
}

#[component]
pub fn AppointmentsEdit() -> Element {
    rsx! {
        Page { title: "Edit appointment",
            p { "Change the time or facility of an appointment." }
        }
    }
}

#[component]
pub fn AppointmentsOk() -> Element {
    rsx! {
        Page { title: "Appointment confirmed",
            p { "The appointment has been booked." }
        }
    }
}
