//! User directory records and their validated building blocks.
//!
//! A user is keyed by the email asserted by the identity provider; the email
//! is immutable once the record exists. Favourite and posted listing
//! references are kept as ordered sets so repeated toggles and appends cannot
//! produce duplicates.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::listing::ListingId;

/// Validation errors raised by [`Email`] and [`ContactNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a local part and a domain")]
    MalformedEmail,
    #[error("contact number must not be empty")]
    EmptyContactNumber,
    #[error("contact number may only contain digits, spaces, and + - ( )")]
    MalformedContactNumber,
}

/// Verified email address acting as the user's identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = raw.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Phone number callers use to reach a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactNumber(String);

impl ContactNumber {
    /// Validate and construct a [`ContactNumber`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyContactNumber);
        }
        let allowed =
            |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.');
        if !raw.chars().all(allowed) {
            return Err(UserValidationError::MalformedContactNumber);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for ContactNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ContactNumber> for String {
    fn from(value: ContactNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for ContactNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First-party user record.
///
/// ## Invariants
/// - `email` never changes after the record is created.
/// - `favourite_items` and `items_posted` are sets; membership toggles and
///   appends are idempotent by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userEmail")]
    #[schema(value_type = String, example = "ada@example.edu")]
    pub email: Email,
    #[serde(rename = "userName")]
    pub name: String,
    #[serde(rename = "userPicture")]
    pub picture: String,
    #[schema(value_type = String, example = "+91 555 0100")]
    pub contact_number: ContactNumber,
    #[schema(value_type = Vec<String>)]
    pub favourite_items: BTreeSet<ListingId>,
    #[schema(value_type = Vec<String>)]
    pub items_posted: BTreeSet<ListingId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
}

impl User {
    /// Build the record created on a user's first verified sign-in.
    pub fn first_sight(
        email: Email,
        name: impl Into<String>,
        picture: impl Into<String>,
        contact_number: ContactNumber,
    ) -> Self {
        Self {
            email,
            name: name.into(),
            picture: picture.into(),
            contact_number,
            favourite_items: BTreeSet::new(),
            items_posted: BTreeSet::new(),
            fcm_token: None,
        }
    }
}
