//! Amount and currency types shared by the connectors

use std::str::FromStr;

use common_enums::enums::Currency;
use error_stack::{report, ResultExt};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{
    consts::DEFAULT_MINOR_UNIT_SCALE,
    errors::{CustomResult, ValidationError},
};

/// Resolve a currency symbol (`GEL`, `USD`, `EUR`) or an already numeric
/// ISO 4217 code to the numeric code sent on the wire.
pub fn normalize_currency(code_or_symbol: &str) -> CustomResult<&'static str, ValidationError> {
    let code_or_symbol = code_or_symbol.trim();
    Currency::from_iso_4217(code_or_symbol)
        .or_else(|| Currency::from_str(code_or_symbol).ok())
        .map(Currency::iso_4217)
        .ok_or_else(|| {
            report!(ValidationError::InvalidCurrency {
                value: code_or_symbol.to_string(),
            })
        })
}

/// Convert a major-unit amount to minor units at two fractional digits.
///
/// Half-way values round away from zero, so `23.505` becomes `2351` and
/// `-1.005` becomes `-101`.
pub fn to_minor_units(amount: Decimal) -> CustomResult<MinorUnit, ValidationError> {
    MinorUnit::from_major_unit(amount, DEFAULT_MINOR_UNIT_SCALE)
}

/// Amount in the smallest currency unit (tetri for GEL, cents for USD and EUR)
#[derive(
    Default, Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// forms a new minor unit from amount
    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    /// Round `amount` half away from zero to `scale` digits and count the
    /// resulting minor units.
    pub fn from_major_unit(amount: Decimal, scale: u32) -> CustomResult<Self, ValidationError> {
        let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(scale);
        if rounded.scale() != scale {
            return Err(report!(ValidationError::InvalidValue {
                message: format!("amount {amount} cannot be expressed with {scale} fractional digits"),
            }));
        }
        i64::try_from(rounded.mantissa())
            .map(Self)
            .change_context(ValidationError::InvalidValue {
                message: format!("amount {amount} is out of range"),
            })
    }

    pub fn to_major_unit(self, scale: u32) -> Decimal {
        Decimal::new(self.0, scale)
    }
}

impl std::fmt::Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Major-unit amount rendered as a fixed-point string, e.g. `"12.30"`
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    /// Render `amount` with `scale` digits, rounding any excess precision away
    /// from zero so a total never undercharges.
    pub fn round_up(amount: Decimal, scale: u32) -> Self {
        let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::AwayFromZero);
        rounded.rescale(scale);
        Self(rounded.to_string())
    }

    pub fn get_amount_as_string(&self) -> String {
        self.0.clone()
    }
}

impl std::fmt::Display for StringMajorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sum of major-unit amounts, rendered with round-up semantics.
pub fn sum_major_units<I>(amounts: I) -> CustomResult<StringMajorUnit, ValidationError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .map(|total| StringMajorUnit::round_up(total, DEFAULT_MINOR_UNIT_SCALE))
        .ok_or_else(|| {
            report!(ValidationError::InvalidValue {
                message: "sum of item amounts overflows".to_string(),
            })
        })
}
