use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use ui::{use_auth, AuthProvider, Navigation};
use views::{
    About, Appointments, AppointmentsEdit, AppointmentsOk, Home, Login, Signup, Surveys, Users,
};

#[cfg(feature = "server")]
mod server;
mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Guarded)]
        #[route("/")]
        Home {},
        #[route("/login")]
        Login {},
        #[route("/signup")]
        Signup {},
        #[route("/about")]
        About {},
        #[route("/users")]
        Users {},
        #[route("/surveys")]
        Surveys {},
        #[route("/appointments")]
        Appointments {},
        #[route("/appointments/edit")]
        AppointmentsEdit {},
        #[route("/appointments/ok")]
        AppointmentsOk {},
}

fn main() {
    #[cfg(feature = "server")]
    {
        tokio::runtime::Runtime::new()
            .expect("Failed to start Tokio runtime")
            .block_on(server::launch());
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[component]
fn App() -> Element {
    rsx! {
        AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Runs the navigation guard before rendering any page.
///
/// The previous path is the last route this layout allowed; the first
/// navigation counts as coming from `/`.
#[component]
fn Guarded() -> Element {
    let route = use_route::<Route>();
    let nav = use_navigator();
    let auth = use_auth();
    let previous = use_hook(|| Rc::new(RefCell::new(String::from("/"))));

    let to = route.to_string();
    let from = previous.borrow().clone();

    match ui::evaluate(&to, &from, auth().session().as_ref()) {
        Navigation::Evaluating => rsx! {},
        Navigation::Allowed => {
            *previous.borrow_mut() = to;
            rsx! {
                Outlet::<Route> {}
            }
        }
        Navigation::Redirected(target) => {
            let target = target.parse::<Route>().unwrap_or(Route::Home {});
            nav.replace(target);
            rsx! {}
        }
    }
}
