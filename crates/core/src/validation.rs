//! Payload validation rules shared by request creation and donor registration.
//!
//! Structural checks (required fields, lengths, email format) are declared on
//! the DTOs with `validator` derives; [`from_validation_errors`] flattens those
//! into a single [`CoreError::Validation`] message. Rules that depend on the
//! clock or on domain types live here as plain functions.

use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::donation::MAX_MESSAGE_CHARS;
use crate::error::CoreError;
use crate::types::Date;

/// Bangladesh mobile number, optionally prefixed with `+88` or `88`.
pub const PHONE_PATTERN: &str = r"^(?:\+88|88)?(01[3-9]\d{8})$";

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_CHARS: usize = 3;
pub const MAX_BIO_CHARS: usize = 200;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// `validator` custom rule for phone fields.
pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(value.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("must be a valid Bangladesh mobile number".into());
        Err(err)
    }
}

/// Reject blank (whitespace-only) strings that pass a plain length check.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// The donation date may be today but never earlier. Only the calendar day is
/// compared.
pub fn validate_donation_date(date: Date, today: Date) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::Validation(format!(
            "donation_date: {date} is in the past"
        )));
    }
    Ok(())
}

pub fn validate_message(message: Option<&str>) -> Result<(), CoreError> {
    match message {
        Some(m) if m.chars().count() > MAX_MESSAGE_CHARS => Err(CoreError::Validation(format!(
            "additional_message: must be at most {MAX_MESSAGE_CHARS} characters"
        ))),
        _ => Ok(()),
    }
}

/// Flatten `validator` output into one message, `field: reason; field: reason`.
/// Fields are sorted so the message is stable.
pub fn from_validation_errors(errors: &ValidationErrors) -> CoreError {
    let mut parts = Vec::new();
    collect(errors, None, &mut parts);
    parts.sort();
    CoreError::Validation(parts.join("; "))
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", e.code));
                    out.push(format!("{path}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, Some(&format!("{path}[{idx}]")), out);
                }
            }
        }
    }
}
