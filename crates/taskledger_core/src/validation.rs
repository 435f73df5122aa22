//! Form field validation.
//!
//! # Responsibility
//! - Check user-supplied field strings before they reach the store.
//! - Report the first failing field with a human-readable reason.
//!
//! # Invariants
//! - Validators are pure: no I/O, no logging.
//! - Name checks run on the trimmed value and count Unicode scalar values.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\s'\-]+$").expect("valid person name regex"));

const NATIONAL_ID_MIN_LEN: usize = 6;
const NATIONAL_ID_MAX_LEN: usize = 10;
const PERSON_NAME_MIN_LEN: usize = 2;

pub const NATIONAL_ID_LABEL: &str = "National ID";
pub const FIRST_NAME_LABEL: &str = "First name";
pub const LAST_NAME_LABEL: &str = "Last name";
pub const COURSE_LABEL: &str = "Course";
pub const SHIFT_LABEL: &str = "Shift";
pub const ACTION_LABEL: &str = "Pending action";

/// Course options offered by the front end. Storage accepts any value.
pub const COURSE_OPTIONS: &[&str] = &[
    "Pre Escolar",
    "1° Grado",
    "2° Grado",
    "3° Grado",
    "4° Grado",
    "5° Grado",
    "6° Grado",
    "7° Grado",
    "8° Grado",
    "9no Grado",
    "1° Curso",
    "2° Curso",
    "3° Curso",
];

/// Shift options offered by the front end. Storage accepts any value.
pub const SHIFT_OPTIONS: &[&str] = &["Mañana", "Tarde"];

/// A single field failure with the field label and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl Error for FieldError {}

/// Raw field strings as submitted by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub shift: String,
    pub pending_action: String,
}

/// Validates a national id: non-empty, ASCII digits only, 6 to 10 long.
pub fn validate_national_id(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new(NATIONAL_ID_LABEL, "cannot be empty"));
    }
    if !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(FieldError::new(NATIONAL_ID_LABEL, "must contain digits only"));
    }
    let len = value.len();
    if !(NATIONAL_ID_MIN_LEN..=NATIONAL_ID_MAX_LEN).contains(&len) {
        return Err(FieldError::new(
            NATIONAL_ID_LABEL,
            format!(
                "must have between {NATIONAL_ID_MIN_LEN} and {NATIONAL_ID_MAX_LEN} digits (got {len})"
            ),
        ));
    }
    Ok(())
}

/// Validates a first or last name.
///
/// Letters (accented included), spaces, apostrophes and hyphens are allowed.
pub fn validate_person_name(value: &str, label: &'static str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(label, "cannot be empty"));
    }
    if !PERSON_NAME_RE.is_match(trimmed) {
        return Err(FieldError::new(
            label,
            "contains invalid characters; only letters, spaces, apostrophes and hyphens are allowed",
        ));
    }
    if trimmed.chars().count() < PERSON_NAME_MIN_LEN {
        return Err(FieldError::new(
            label,
            format!("must have at least {PERSON_NAME_MIN_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validates that a free-form required field is not blank.
pub fn validate_required(value: &str, label: &'static str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(label, "cannot be empty"));
    }
    Ok(())
}

/// Validates a whole form, returning the first failing field.
pub fn validate_form(form: &TaskForm) -> Result<(), FieldError> {
    validate_national_id(&form.national_id)?;
    validate_person_name(&form.first_name, FIRST_NAME_LABEL)?;
    validate_person_name(&form.last_name, LAST_NAME_LABEL)?;
    validate_required(&form.course, COURSE_LABEL)?;
    validate_required(&form.shift, SHIFT_LABEL)?;
    validate_required(&form.pending_action, ACTION_LABEL)?;
    Ok(())
}
