//! Signup request validation.
//!
//! Runs before any persistence. Every failing field produces one
//! [`FieldError`]; the request is rejected if the list is non-empty.
//!
//! | Field | Rule |
//! |-------|------|
//! | `username` | non-empty after trimming |
//! | `email` | syntactically valid address |
//! | `password` | 4 to 20 characters after trimming |
//! | `firstname`, `lastname` | non-empty after trimming, ASCII letters only |
//! | `birthdate` | ISO-8601 calendar date, optionally with a time part |

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use crate::models::SignupRequest;

pub const PASSWORD_MIN: usize = 4;
pub const PASSWORD_MAX: usize = 20;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Signup input that passed validation, already trimmed and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: NaiveDate,
}

pub fn validate_signup(req: &SignupRequest) -> Result<ValidSignup, Vec<FieldError>> {
    let mut errors = Vec::new();

    let username = req.username.trim();
    if username.is_empty() {
        errors.push(FieldError {
            field: "username",
            message: "Username is required",
        });
    }

    if !is_valid_email(&req.email) {
        errors.push(FieldError {
            field: "email",
            message: "Email must be valid",
        });
    }

    let password = req.password.trim();
    let password_len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&password_len) {
        errors.push(FieldError {
            field: "password",
            message: "Password must be between 4 and 20 characters",
        });
    }

    let firstname = req.firstname.trim();
    if !is_alpha(firstname) {
        errors.push(FieldError {
            field: "firstname",
            message: "Firstname is required",
        });
    }

    let lastname = req.lastname.trim();
    if !is_alpha(lastname) {
        errors.push(FieldError {
            field: "lastname",
            message: "Lastname is required",
        });
    }

    let birthdate = parse_iso8601_date(&req.birthdate);
    if birthdate.is_none() {
        errors.push(FieldError {
            field: "birthdate",
            message: "Birthdate is required",
        });
    }

    match birthdate {
        Some(birthdate) if errors.is_empty() => Ok(ValidSignup {
            username: username.to_string(),
            email: req.email.clone(),
            password: password.to_string(),
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            birthdate,
        }),
        _ => Err(errors),
    }
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Calendar date of an ISO-8601 date or date-time string.
///
/// Accepts extended and basic formats (`1990-01-01`, `19900101`), reduced
/// precision (`1990`, `1990-01`), ordinal dates (`1990-001`) and week dates
/// (`1990-W01-1`). A time part may follow a full date after `T` or a space,
/// with an optional `Z` or `±hh[[:]mm]` offset. Reduced forms resolve to the
/// first day of the period. The date is taken as written; an offset does not
/// move it to another day.
pub fn parse_iso8601_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let (date, time) = match s.find(['T', 't', ' ']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let (date, full_day) = parse_date_part(date)?;
    match time {
        None => Some(date),
        Some(time) if full_day && is_valid_time(time) => Some(date),
        Some(_) => None,
    }
}

/// Parses the date part and reports whether it named a single day.
fn parse_date_part(d: &str) -> Option<(NaiveDate, bool)> {
    let year: i32 = digits(d.get(..4)?, 4)?.try_into().ok()?;
    let rest = &d[4..];
    let (rest, extended) = match rest.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (rest, false),
    };

    if rest.is_empty() {
        return if extended {
            None
        } else {
            Some((NaiveDate::from_ymd_opt(year, 1, 1)?, false))
        };
    }

    if let Some(week) = rest.strip_prefix('W') {
        let (week, day) = if extended {
            match week.split_once('-') {
                Some((week, day)) => (week, Some(day)),
                None => (week, None),
            }
        } else {
            (week.get(..2)?, week.get(2..).filter(|day| !day.is_empty()))
        };
        let weekday = match day.map(|day| digits(day, 1)).unwrap_or(Some(1))? {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            7 => Weekday::Sun,
            _ => return None,
        };
        let date = NaiveDate::from_isoywd_opt(year, digits(week, 2)?, weekday)?;
        return Some((date, day.is_some()));
    }

    match (extended, rest.len()) {
        (_, 3) => Some((NaiveDate::from_yo_opt(year, digits(rest, 3)?)?, true)),
        (true, 2) => Some((NaiveDate::from_ymd_opt(year, digits(rest, 2)?, 1)?, false)),
        (true, 5) => {
            let (month, day) = rest.split_once('-')?;
            let date = NaiveDate::from_ymd_opt(year, digits(month, 2)?, digits(day, 2)?)?;
            Some((date, true))
        }
        (false, 4) if rest.is_ascii() => {
            let date =
                NaiveDate::from_ymd_opt(year, digits(&rest[..2], 2)?, digits(&rest[2..], 2)?)?;
            Some((date, true))
        }
        _ => None,
    }
}

/// `hh[:mm[:ss]]` or `hh[mm[ss]]`, optional fraction, optional offset.
fn is_valid_time(t: &str) -> bool {
    let clock = if let Some(clock) = t.strip_suffix(['Z', 'z']) {
        clock
    } else if let Some(i) = t.rfind(['+', '-']) {
        if !is_valid_offset(&t[i + 1..]) {
            return false;
        }
        &t[..i]
    } else {
        t
    };

    let clock = match clock.split_once(['.', ',']) {
        Some((clock, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            clock
        }
        None => clock,
    };

    let fields: Vec<&str> = if clock.contains(':') {
        clock.split(':').collect()
    } else if clock.is_ascii() && clock.len() % 2 == 0 {
        (0..clock.len()).step_by(2).map(|i| &clock[i..i + 2]).collect()
    } else {
        return false;
    };

    (1..=3).contains(&fields.len())
        && fields
            .iter()
            .zip([23, 59, 59])
            .all(|(field, max)| digits(field, 2).is_some_and(|v| v <= max))
}

fn is_valid_offset(offset: &str) -> bool {
    let (hours, minutes) = match offset.len() {
        2 => (offset, "00"),
        4 if offset.is_ascii() => offset.split_at(2),
        5 if offset.as_bytes()[2] == b':' => (&offset[..2], &offset[3..]),
        _ => return false,
    };
    digits(hours, 2).is_some_and(|h| h <= 23) && digits(minutes, 2).is_some_and(|m| m <= 59)
}

/// Value of exactly `len` ASCII digits.
fn digits(s: &str, len: usize) -> Option<u32> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Structural email check, as permissive as express-style `isEmail` defaults:
/// one `@`, a dot-atom local part that may contain UTF-8 letters, and a dotted
/// domain of letter/digit/hyphen labels (internationalised letters included)
/// ending in an alphabetic or punycode (`xn--`) TLD. Quoted local parts and
/// IP-literal domains are rejected.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') || local.is_empty() || local.len() > 64 || domain.len() > 253 {
        return false;
    }

    let local_ok = local.split('.').all(|atom| {
        !atom.is_empty()
            && atom.chars().all(|c| {
                c.is_ascii_alphanumeric()
                    || "!#$%&'*+/=?^_`{|}~-".contains(c)
                    || (!c.is_ascii() && c.is_alphanumeric())
            })
    });
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = (tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic))
        || (tld.len() > 4 && tld.starts_with("xn--"));
    labels_ok && tld_ok
}
