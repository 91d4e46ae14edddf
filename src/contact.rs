//! Contact form
//!
//! Client-side checks only. A valid submission turns into a `mailto:` link
//! for the host's mail client; nothing is sent by this crate.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Minimum message length after trimming
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Characters left alone by JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Form inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Sender name
    Name,
    /// Sender address
    Email,
    /// Mail subject
    Subject,
    /// Mail body
    Message,
}

impl Field {
    /// Every field in display order
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        })
    }
}

/// Problem with a single field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Blank after trimming
    #[error("{0} is required")]
    Required(Field),

    /// Not shaped like `local@domain.tld`
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// Message shorter than `min` characters
    #[error("Message must be at least {min} characters")]
    TooShort {
        /// Required length
        min: usize,
    },
}

/// Every failing field at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, FieldError>);

impl FormErrors {
    /// Error for `field`, if any
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }

    /// No field failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.values().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Submission failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// One or more fields failed validation
    #[error("{0}")]
    Invalid(FormErrors),
}

/// Contact form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    /// Sender name
    pub name: String,
    /// Sender address
    pub email: String,
    /// Mail subject
    pub subject: String,
    /// Mail body
    pub message: String,
    errors: FormErrors,
}

impl ContactForm {
    /// Empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `field`
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    /// Edit a field; its previous error is cleared
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
        }
        self.errors.0.remove(&field);
    }

    /// Errors from the last validation, minus fields edited since
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Check every field and remember the result
    pub fn validate(&mut self) -> Result<(), FormErrors> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert(Field::Name, FieldError::Required(Field::Name));
        }

        if self.email.trim().is_empty() {
            errors.insert(Field::Email, FieldError::Required(Field::Email));
        } else if !is_valid_email(&self.email) {
            errors.insert(Field::Email, FieldError::InvalidEmail);
        }

        if self.subject.trim().is_empty() {
            errors.insert(Field::Subject, FieldError::Required(Field::Subject));
        }

        let message = self.message.trim();
        if message.is_empty() {
            errors.insert(Field::Message, FieldError::Required(Field::Message));
        } else if message.chars().count() < MIN_MESSAGE_CHARS {
            errors.insert(
                Field::Message,
                FieldError::TooShort {
                    min: MIN_MESSAGE_CHARS,
                },
            );
        }

        self.errors = FormErrors(errors);
        if self.errors.is_empty() {
            Ok(())
        } else {
            debug!("Contact form invalid: {}", self.errors);
            Err(self.errors.clone())
        }
    }

    /// `mailto:` link carrying the subject and a body naming the sender
    pub fn mailto_link(&self, recipient: &str) -> String {
        let body = format!(
            "From: {} ({})\n\nMessage:\n{}",
            self.name, self.email, self.message
        );
        format!(
            "mailto:{}?subject={}&body={}",
            recipient,
            utf8_percent_encode(&self.subject, COMPONENT),
            utf8_percent_encode(&body, COMPONENT)
        )
    }

    /// Validate, produce the link and reset the form
    pub fn submit(&mut self, recipient: &str) -> Result<String, FormError> {
        self.validate().map_err(FormError::Invalid)?;
        let link = self.mailto_link(recipient);
        info!("Contact form submitted for {}", recipient);
        *self = Self::default();
        Ok(link)
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with characters on both sides
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
