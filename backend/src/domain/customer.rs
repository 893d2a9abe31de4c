//! Customer identity and profile types.
//!
//! The customer record is owned by the directory collaborator; the workflows
//! only reference it. Constructors validate string inputs at the boundary so
//! services never see malformed identifiers or contact channels.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when constructing an [`Npi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpiValidationError {
    /// Identifier is empty after trimming whitespace.
    Empty,
    /// Identifier contains leading or trailing whitespace.
    ContainsWhitespace,
}

impl fmt::Display for NpiValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "npi must not be empty"),
            Self::ContainsWhitespace => write!(f, "npi must not contain surrounding whitespace"),
        }
    }
}

impl std::error::Error for NpiValidationError {}

/// National/personal identifier used as the customer lookup key throughout.
///
/// # Examples
/// ```
/// use backend::domain::Npi;
///
/// let npi = Npi::new("NPI001").expect("valid npi");
/// assert_eq!(npi.as_str(), "NPI001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Npi(String);

impl Npi {
    /// Construct an identifier after validating that it is non-empty and
    /// trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, NpiValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(NpiValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(NpiValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Npi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Npi {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Npi> for String {
    fn from(value: Npi) -> Self {
        value.0
    }
}

impl TryFrom<String> for Npi {
    type Error = NpiValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validation errors returned when constructing an [`EmailAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// Address is empty after trimming whitespace.
    Empty,
    /// Address is missing an `@` or has an empty local/domain part.
    Malformed,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email address must not be empty"),
            Self::Malformed => write!(f, "email address must have the form local@domain"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Customer contact channel used for out-of-band code delivery.
///
/// Validation is deliberately shallow: the dispatcher collaborator owns
/// deliverability, this type only rejects obviously broken input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Construct an address after checking the `local@domain` shape.
    pub fn new(value: impl Into<String>) -> Result<Self, EmailValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailValidationError::Malformed),
        }
    }

    /// Borrow the underlying address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Customer profile as supplied by the directory collaborator.
///
/// Affiliation fields are plain identifiers: the country/front-office graph
/// lives with the directory, the workflows never traverse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Stable record identifier.
    pub id: Uuid,
    /// National/personal identifier, unique within the directory.
    pub npi: Npi,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact channel for out-of-band code delivery.
    pub email: EmailAddress,
    /// Phone number as recorded by the enrolling agent.
    pub phone_number: String,
    /// Zone label within the front office's coverage area.
    pub zone: String,
    /// Owning front office.
    pub front_office_id: Uuid,
    /// ISO country code of the operating country.
    pub country_code: String,
    /// Last computed credit score.
    pub credit_score: f64,
}

impl Customer {
    /// Display name as rendered in account views.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
