//! Form validation
//!
//! Forms are validated in full before anything is sent, and every failing field is reported
//! with its own message.

use std::{borrow::Cow, fmt};

use smallvec::SmallVec;
use thiserror::Error;

/// One failing field and the message to show beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name
    pub field: &'static str,

    /// Message for the customer
    pub message: Cow<'static, str>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in a form.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
#[error("{}", join(.0))]
pub struct ValidationErrors(SmallVec<[FieldError; 4]>);

impl ValidationErrors {
    /// No errors yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failing field.
    pub fn add(&mut self, field: &'static str, message: impl Into<Cow<'static, str>>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns `true` if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The failing fields, in form order.
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for `field`, if it failed.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_ref())
    }

    /// `Ok(value)` if nothing failed, otherwise these errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returns `true` if `value` looks like `something@domain.tld`.
pub fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            c == '@' && at > 0 && token.get(at + 1..).is_some_and(has_dotted_domain)
        })
    })
}

fn has_dotted_domain(domain: &str) -> bool {
    domain
        .char_indices()
        .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
}
