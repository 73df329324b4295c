//! Pure field checks shared by every intake funnel.
//!
//! Each helper takes the raw (possibly absent) value of one field together with
//! the field's path as the client sees it (`contact.email`, `issues`, ...), and
//! returns the normalized value or the first failure for that field.

use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::model::choice::Choice;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Digits, optional leading `+`, spaces, parentheses and hyphens; at least 7 characters.
static LOOSE_PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s()\-]{7,}$").expect("phone pattern compiles"));

static STRICT_PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("{0} must be a valid email address")]
    InvalidEmail(String),

    #[error("{0} must be a valid phone number")]
    InvalidPhone(String),

    #[error("{field} contains invalid selection(s): {}", .values.join(", "))]
    InvalidSelection { field: String, values: Vec<String> },

    #[error("{0} must contain at least one selection")]
    EmptySelection(String),

    #[error("{field} {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{0} cannot be modified")]
    NotModifiable(String),
}

impl ValidationError {
    /// The field the failure is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field)
            | ValidationError::InvalidEmail(field)
            | ValidationError::InvalidPhone(field)
            | ValidationError::EmptySelection(field)
            | ValidationError::NotModifiable(field) => field,
            ValidationError::InvalidSelection { field, .. }
            | ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

/// Trims a string; blank strings count as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    optional(value).ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

pub fn required_number<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Required email, trimmed and lower-cased.
pub fn email(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    let email = required(field, value)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail(field.to_string()));
    }
    Ok(email)
}

/// Optional phone number in the permissive shape used by the contact form.
pub fn loose_phone(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match optional(value) {
        Some(phone) if !LOOSE_PHONE_REGEX.is_match(&phone) => {
            Err(ValidationError::InvalidPhone(field.to_string()))
        }
        phone => Ok(phone),
    }
}

/// Required phone number of exactly 10 digits.
pub fn strict_phone(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    let phone = required(field, value)?;
    if !STRICT_PHONE_REGEX.is_match(&phone) {
        return Err(ValidationError::InvalidPhone(field.to_string()));
    }
    Ok(phone)
}

/// Required single selection from `T`'s allow-list.
pub fn choice<T: Choice>(field: &str, value: Option<String>) -> Result<T, ValidationError> {
    let raw = required(field, value)?;
    T::parse(&raw).ok_or_else(|| ValidationError::InvalidSelection {
        field: field.to_string(),
        values: vec![raw],
    })
}

/// Required, non-empty list of selections from `T`'s allow-list.
///
/// Entries are trimmed and passed through `normalize`; order and repeats are
/// kept as submitted. Every unknown entry is reported, not just the first.
pub fn selections<T: Choice>(
    field: &str,
    values: Option<Vec<String>>,
    normalize: fn(&str) -> String,
) -> Result<Vec<T>, ValidationError> {
    let Some(values) = values else {
        return Err(ValidationError::MissingField(field.to_string()));
    };
    let raw: Vec<String> = values
        .iter()
        .map(|v| normalize(v.trim()))
        .filter(|v| !v.is_empty())
        .collect();
    if raw.is_empty() {
        return Err(ValidationError::EmptySelection(field.to_string()));
    }

    let mut picked: Vec<T> = Vec::with_capacity(raw.len());
    let mut unknown: Vec<String> = Vec::new();
    for value in raw {
        match T::parse(&value) {
            Some(parsed) => picked.push(parsed),
            None if !unknown.contains(&value) => unknown.push(value),
            None => {}
        }
    }

    if !unknown.is_empty() {
        return Err(ValidationError::InvalidSelection {
            field: field.to_string(),
            values: unknown,
        });
    }
    Ok(picked)
}

/// Identity normalization for `selections`.
pub fn as_is(value: &str) -> String {
    value.to_string()
}

pub fn upper_case(value: &str) -> String {
    value.to_uppercase()
}

/// Runs the `validator` length/range bounds of a submission part.
///
/// `prefix` is prepended to the reported field path, e.g. `contact`.
pub fn bounds<T: Validate>(prefix: &str, value: &T) -> Result<(), ValidationError> {
    let Err(errors) = value.validate() else {
        return Ok(());
    };
    let field_errors = errors.field_errors();
    let first = field_errors
        .into_iter()
        .min_by(|a, b| a.0.cmp(&b.0));
    let Some((field, errs)) = first else {
        return Err(ValidationError::InvalidValue {
            field: prefix.to_string(),
            reason: "is invalid".to_string(),
        });
    };
    let reason = errs
        .first()
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", e.code))
        })
        .unwrap_or_else(|| "is invalid".to_string());
    let name = camel_case(&field);
    let field = if prefix.is_empty() { name } else { format!("{prefix}.{name}") };
    Err(ValidationError::InvalidValue { field, reason })
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
