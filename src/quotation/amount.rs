//! Cost and quantity values with the "at actual" sentinel.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::calculators::format_money;

/// Text stored for a value that is still to be determined.
pub const AT_ACTUAL: &str = "at actual";

/// Displayed in place of a line total that cannot be computed.
pub const NOT_APPLICABLE: &str = "N/A";

/// Whole digits accepted in a cost or quantity. Any product of two such
/// values, and any realistic sum of them, fits in a `Decimal`.
pub const MAX_WHOLE_DIGITS: u32 = 12;

/// A unit cost or quantity: a concrete decimal, or "at actual".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Amount {
    Concrete(Decimal),
    #[default]
    AtActual,
}

/// Rejected cost/quantity input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Unit cost must be positive")]
    Negative,

    #[error("Please enter a valid number or \"at actual\"")]
    Invalid,

    #[error("Ensure that there are no more than 12 digits before the decimal point")]
    TooLarge,
}

/// Spellings that collapse to the sentinel before any number parsing.
fn is_at_actual_spelling(input: &str) -> bool {
    input.is_empty() || input == "0" || input == "0.00" || input.eq_ignore_ascii_case(AT_ACTUAL)
}

fn parse_decimal(input: &str) -> Result<Decimal, AmountError> {
    let value = Decimal::from_str(input).map_err(|_| AmountError::Invalid)?;
    if value.abs() >= Decimal::from(10_i64.pow(MAX_WHOLE_DIGITS)) {
        return Err(AmountError::TooLarge);
    }
    Ok(value)
}

impl Amount {
    /// Normalize user input for a unit cost.
    ///
    /// Negative numbers are rejected. A concrete zero written any other way
    /// than `0` or `0.00` (e.g. `0.0`) stays a concrete zero.
    pub fn parse_cost(input: &str) -> Result<Amount, AmountError> {
        let input = input.trim();
        if is_at_actual_spelling(input) {
            return Ok(Amount::AtActual);
        }
        let value = parse_decimal(input)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        Ok(Amount::Concrete(value.normalize()))
    }

    /// Normalize user input for a quantity.
    ///
    /// Any quantity that is not strictly positive means "at actual"; zero
    /// units and unknown units are indistinguishable here.
    pub fn parse_quantity(input: &str) -> Result<Amount, AmountError> {
        let input = input.trim();
        if is_at_actual_spelling(input) {
            return Ok(Amount::AtActual);
        }
        let value = parse_decimal(input)?;
        if value <= Decimal::ZERO {
            return Ok(Amount::AtActual);
        }
        Ok(Amount::Concrete(value.normalize()))
    }

    /// Lenient read of a previously stored value. Unreadable text is
    /// treated as "at actual".
    pub fn from_stored(value: &str) -> Amount {
        let value = value.trim();
        if is_at_actual_spelling(value) {
            return Amount::AtActual;
        }
        match parse_decimal(value) {
            Ok(d) if d >= Decimal::ZERO => Amount::Concrete(d),
            _ => Amount::AtActual,
        }
    }

    /// Text form used for storage.
    pub fn to_stored(&self) -> String {
        match self {
            Amount::Concrete(value) => value.to_string(),
            Amount::AtActual => AT_ACTUAL.to_string(),
        }
    }

    pub fn concrete(&self) -> Option<Decimal> {
        match self {
            Amount::Concrete(value) => Some(*value),
            Amount::AtActual => None,
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_stored())
    }
}

/// Derived total of a line: a two-place amount, or not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTotal {
    Amount(Decimal),
    NotApplicable,
}

impl LineTotal {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            LineTotal::Amount(value) => Some(*value),
            LineTotal::NotApplicable => None,
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, LineTotal::Amount(_))
    }
}

impl std::fmt::Display for LineTotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineTotal::Amount(value) => f.write_str(&format_money(*value)),
            LineTotal::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for LineTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
