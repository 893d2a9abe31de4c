//! Loan records and their value types.
//!
//! A loan links a resolved debtor customer to a free-form creditor
//! identifier. The creditor side is deliberately denormalized: it is stored
//! as the npi string captured at registration time and resolved against the
//! directory only when a receivables view is rendered, so a creditor can be
//! recorded before a full customer record exists under that identifier.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::Npi;

/// Monetary amount in minor units (hundredths).
///
/// Amounts are parsed from decimal strings with at most two fractional
/// digits and must be strictly positive. Minor units keep the arithmetic
/// integral end to end.
///
/// # Examples
/// ```
/// use backend::domain::Money;
///
/// let amount = Money::parse("100.50").expect("valid amount");
/// assert_eq!(amount.minor_units(), 10_050);
/// assert_eq!(amount.to_string(), "100.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

/// Parse errors returned by [`Money::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    /// Input was empty after trimming.
    Empty,
    /// Input was not a plain decimal number.
    Invalid,
    /// More than two fractional digits were supplied.
    TooPrecise,
    /// The amount was zero (negative amounts never parse: the sign is
    /// rejected as [`MoneyParseError::Invalid`]).
    NotPositive,
    /// The amount does not fit in 64-bit minor units.
    Overflow,
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "amount must not be empty"),
            Self::Invalid => write!(f, "amount must be a plain decimal number"),
            Self::TooPrecise => write!(f, "amount must have at most two decimal places"),
            Self::NotPositive => write!(f, "amount must be positive"),
            Self::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for MoneyParseError {}

impl Money {
    /// Parse a decimal string such as `"100"` or `"100.50"`.
    pub fn parse(raw: &str) -> Result<Self, MoneyParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (units, fraction) = match trimmed.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (trimmed, ""),
        };
        if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::Invalid);
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::Invalid);
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise);
        }
        let units: i64 = units.parse().map_err(|_| MoneyParseError::Overflow)?;
        let mut cents: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| MoneyParseError::Invalid)?
        };
        if fraction.len() == 1 {
            cents *= 10;
        }
        let value = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(MoneyParseError::Overflow)?;
        if value == 0 {
            return Err(MoneyParseError::NotPositive);
        }
        Ok(Self(value))
    }

    /// Amount in minor units (hundredths).
    pub fn minor_units(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Repayment cadence of a loan.
///
/// The set is closed; anything else fails to parse and surfaces to the
/// caller as an invalid-periodicity validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    /// Repayment due every day.
    Daily,
    /// Repayment due every week.
    Weekly,
    /// Repayment due every month.
    Monthly,
    /// Repayment due every quarter.
    Quarterly,
    /// Repayment due twice a year.
    Biannual,
    /// Repayment due once a year.
    Annual,
}

impl Periodicity {
    /// Every admissible periodicity, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Biannual,
        Self::Annual,
    ];

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Biannual => "biannual",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error carrying the rejected label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodicityError {
    /// The label that failed to parse.
    pub value: String,
}

impl fmt::Display for ParsePeriodicityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown periodicity: {}", self.value)
    }
}

impl std::error::Error for ParsePeriodicityError {}

impl FromStr for Periodicity {
    type Err = ParsePeriodicityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "biannual" => Ok(Self::Biannual),
            "annual" => Ok(Self::Annual),
            other => Err(ParsePeriodicityError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Settlement state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Repayment outstanding.
    Pending,
    /// Fully repaid.
    Done,
}

/// Loan registration payload accepted by the ledger.
///
/// Status, verification, and solvability are not part of the payload: every
/// freshly registered loan starts pending, unverified, and solvent (see
/// [`Loan::from_new`]).
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    /// Resolved debtor record identifier.
    pub debtor_id: Uuid,
    /// Debtor npi at registration time.
    pub debtor_npi: Npi,
    /// Denormalized creditor identifier (resolved at read time).
    pub creditor_npi: Npi,
    /// Principal amount.
    pub amount: Money,
    /// Repayment cadence.
    pub periodicity: Periodicity,
    /// Total due at the deadline.
    pub deadline_amount: Money,
    /// Settlement deadline.
    pub deadline: NaiveDate,
    /// Registration date, stamped by the workflow clock.
    pub registered_on: NaiveDate,
}

/// Persisted loan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Stable record identifier, assigned by the ledger.
    pub id: Uuid,
    /// Resolved debtor record identifier.
    pub debtor_id: Uuid,
    /// Debtor npi at registration time.
    pub debtor_npi: Npi,
    /// Denormalized creditor identifier (resolved at read time).
    pub creditor_npi: Npi,
    /// Principal amount.
    pub amount: Money,
    /// Repayment cadence.
    pub periodicity: Periodicity,
    /// Total due at the deadline.
    pub deadline_amount: Money,
    /// Settlement deadline.
    pub deadline: NaiveDate,
    /// Registration date.
    pub registered_on: NaiveDate,
    /// Settlement state.
    pub status: LoanStatus,
    /// Whether a back-office review confirmed the loan.
    pub verified: bool,
    /// Whether the debtor is currently considered solvent.
    pub solvability: bool,
}

impl Loan {
    /// Materialize a registration payload into a record under `id`.
    pub fn from_new(id: Uuid, new: NewLoan) -> Self {
        Self {
            id,
            debtor_id: new.debtor_id,
            debtor_npi: new.debtor_npi,
            creditor_npi: new.creditor_npi,
            amount: new.amount,
            periodicity: new.periodicity,
            deadline_amount: new.deadline_amount,
            deadline: new.deadline,
            registered_on: new.registered_on,
            status: LoanStatus::Pending,
            verified: false,
            solvability: true,
        }
    }

    /// Whether the loan is past `as_of` without being settled.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status != LoanStatus::Done && self.deadline < as_of
    }
}
