//! Typed decoding of submitted forms.
//!
//! Raw `Form` payloads are plain strings; everything here turns them into
//! domain values or a `FormError` that the handler reports as a flash.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::db::GoalChanges;

lazy_static! {
    /// Deliberately loose: something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

const MAX_EMAIL_LEN: usize = 254;
const MAX_TITLE_LEN: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Goal title must not be empty")]
    EmptyTitle,

    #[error("Goal title is too long (max {} characters)", MAX_TITLE_LEN)]
    TitleTooLong,

    #[error("Completed must be \"true\" or \"false\", got \"{0}\"")]
    InvalidCompleted(String),
}

/// Login and registration both post email + password.
///
/// Missing fields deserialize as empty and fail in `decode`, so the handler
/// can answer with a flash instead of a bare rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl CredentialsForm {
    pub fn decode(self) -> Result<Credentials, FormError> {
        let email = self.email.trim();
        if email.len() > MAX_EMAIL_LEN || !EMAIL_REGEX.is_match(email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::EmptyPassword);
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct NewGoalForm {
    #[serde(default)]
    pub title: String,
}

impl NewGoalForm {
    pub fn decode(self) -> Result<String, FormError> {
        decode_title(&self.title)
    }
}

/// Both fields are optional; absent fields keep the goal's current value.
#[derive(Debug, Default, Deserialize)]
pub struct EditGoalForm {
    pub title: Option<String>,
    pub completed: Option<String>,
}

impl EditGoalForm {
    pub fn decode(self) -> Result<GoalChanges, FormError> {
        let title = self.title.as_deref().map(decode_title).transpose()?;
        let completed = self.completed.as_deref().map(parse_completed).transpose()?;
        Ok(GoalChanges { title, completed })
    }
}

fn decode_title(raw: &str) -> Result<String, FormError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(FormError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(FormError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Only the exact literals `true` and `false` are accepted.
pub fn parse_completed(raw: &str) -> Result<bool, FormError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(FormError::InvalidCompleted(other.to_string())),
    }
}
