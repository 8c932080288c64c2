//! # Navigation guard
//!
//! Decides, before a page renders, whether a navigation proceeds. The caller
//! passes the signed-in state explicitly as a [`Session`]; nothing here reads
//! shared state.
//!
//! Checks run in order and the first failing one wins:
//!
//! 1. a page outside [`PUBLIC_PAGES`] needs an authenticated session, else
//!    redirect to `/login`;
//! 2. [`ADMIN_PAGES`] need the admin role;
//! 3. [`PATIENT_PAGES`] need the patient role;
//! 4. [`DOCTOR_PAGES`] need the doctor role.
//!
//! A failed role check sends the user back to the page they came from. The
//! sets overlap (`/appointments` is both a patient and a doctor page), so a
//! page can require several roles at once.

use api::{Role, UserInfo};

pub const LOGIN_PAGE: &str = "/login";
pub const HOME_PAGE: &str = "/";

pub const PUBLIC_PAGES: &[&str] = &["/login", "/about", "/signup"];
pub const ADMIN_PAGES: &[&str] = &["/users"];
pub const PATIENT_PAGES: &[&str] = &["/appointments"];
pub const DOCTOR_PAGES: &[&str] = &["/appointments", "/appointments/edit", "/appointments/ok"];

/// Authentication and role flags consulted by the guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub is_doctor: bool,
    pub is_patient: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_user(user: Option<&UserInfo>) -> Self {
        match user {
            None => Self::anonymous(),
            Some(user) => Self {
                is_authenticated: true,
                is_admin: user.has_role(Role::Admin),
                is_doctor: user.has_role(Role::Doctor),
                is_patient: user.has_role(Role::Patient),
            },
        }
    }
}

/// Outcome of evaluating one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The session is not known yet; render nothing.
    Evaluating,
    Allowed,
    Redirected(String),
}

/// Run the guard for a navigation from `from` to `to`.
///
/// A redirect back to `from` when `from` is the denied page itself would loop,
/// so that case goes to [`HOME_PAGE`] instead.
pub fn before_each(to: &str, from: &str, session: &Session) -> Navigation {
    let authentication_required = !PUBLIC_PAGES.contains(&to);
    if authentication_required && !session.is_authenticated {
        return Navigation::Redirected(LOGIN_PAGE.to_string());
    }

    let back = || {
        if from == to {
            Navigation::Redirected(HOME_PAGE.to_string())
        } else {
            Navigation::Redirected(from.to_string())
        }
    };

    if ADMIN_PAGES.contains(&to) && !session.is_admin {
        return back();
    }
    if PATIENT_PAGES.contains(&to) && !session.is_patient {
        return back();
    }
    if DOCTOR_PAGES.contains(&to) && !session.is_doctor {
        return back();
    }

    Navigation::Allowed
}

/// Like [`before_each`], but yields [`Navigation::Evaluating`] while the
/// session is still loading.
pub fn evaluate(to: &str, from: &str, session: Option<&Session>) -> Navigation {
    match session {
        None => Navigation::Evaluating,
        Some(session) => before_each(to, from, session),
    }
}
