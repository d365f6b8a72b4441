//! Form validation and sanitization shared by the catalog pipelines
//!
//! A submission is checked field by field: trim, length, character class,
//! date parsing. Every failing rule is recorded so the form can be shown
//! again with all problems at once. Text that passes is HTML-escaped before
//! it reaches the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use validator::ValidateLength;

/// Upper bound on author name fields, shared with the `authors` table schema
pub const NAME_MAX_LEN: u64 = 100;

/// One rule violation on one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub msg: String,
}

/// Outcome of a create or update submission
#[derive(Debug)]
pub enum Submission<T, F> {
    /// The record was persisted
    Accepted(T),
    /// Nothing was written; `form` holds the sanitized input for redisplay
    Rejected { form: F, errors: Vec<FieldError> },
}

// Rules run by hand rather than through `#[derive(Validate)]` so messages come out in field order.
/// Collects field errors in the order the rules are applied
#[derive(Debug, Default)]
pub struct FormCheck {
    errors: Vec<FieldError>,
}

impl FormCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim `raw` and require 1..=`max` characters. Returns the trimmed text.
    pub fn required_text(
        &mut self,
        field: &'static str,
        raw: &str,
        max: Option<u64>,
        msg: impl Into<String>,
    ) -> String {
        let value = raw.trim().to_string();
        if !value.validate_length(Some(1), max, None) {
            self.push(field, msg);
        }
        value
    }

    /// Reject non-empty values containing anything outside `[0-9A-Za-z]`
    pub fn alphanumeric(&mut self, field: &'static str, value: &str, msg: impl Into<String>) {
        if !value.is_empty() && !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.push(field, msg);
        }
    }

    /// Empty input is an absent date; anything else must be ISO-8601
    pub fn optional_date(
        &mut self,
        field: &'static str,
        raw: &str,
        msg: impl Into<String>,
    ) -> Option<NaiveDate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        let parsed = parse_iso_date(value);
        if parsed.is_none() {
            self.push(field, msg);
        }
        parsed
    }

    pub fn push(&mut self, field: &'static str, msg: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            msg: msg.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Local timestamps accepted alongside RFC 3339; only the date part is kept
const LOCAL_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD` or basic `YYYYMMDD`), or the
/// date part of an ISO-8601 timestamp
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Escape markup-significant characters before text is persisted
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}
