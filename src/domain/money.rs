//! Unit-tagged fixed-point amounts and the USD/native exchange rate.
//!
//! Native amounts use 18 decimals (wei), USD amounts use the price feed's 8
//! decimals. Amounts of different units never mix: arithmetic across units
//! is an error and conversion goes through an [`ExchangeRate`].

use std::fmt;

use alloy_primitives::{I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Unit of a [`Money`] amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// The ledger's native asset, 18 decimals.
    Native,
    /// US dollars as reported by the price feed, 8 decimals.
    Usd,
}

impl Unit {
    /// Number of fractional digits in the fixed-point representation.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Native => 18,
            Self::Usd => 8,
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Native => "ETH",
            Self::Usd => "USD",
        }
    }

    /// `10^decimals` as a ledger integer.
    #[must_use]
    pub fn scale(self) -> U256 {
        U256::from(10u64).pow(U256::from(self.decimals()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A fixed-point amount tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    raw: U256,
    unit: Unit,
}

impl Money {
    /// Native amount from wei.
    #[must_use]
    pub const fn native(raw: U256) -> Self {
        Self {
            raw,
            unit: Unit::Native,
        }
    }

    /// USD amount from 8-decimal fixed point.
    #[must_use]
    pub const fn usd(raw: U256) -> Self {
        Self {
            raw,
            unit: Unit::Usd,
        }
    }

    /// Zero in the given unit.
    #[must_use]
    pub const fn zero(unit: Unit) -> Self {
        Self {
            raw: U256::ZERO,
            unit,
        }
    }

    /// Parse a human decimal such as `"1500.25"` into the given unit.
    ///
    /// # Errors
    ///
    /// Rejects negative values and values with more fractional digits than
    /// the unit supports.
    pub fn from_decimal(value: Decimal, unit: Unit) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount);
        }
        let value = value.normalize();
        if value.scale() > unit.decimals() {
            return Err(DomainError::ExcessPrecision { unit });
        }

        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let shift = U256::from(10u64).pow(U256::from(unit.decimals() - value.scale()));
        let raw = mantissa.checked_mul(shift).ok_or(DomainError::Overflow)?;
        Ok(Self { raw, unit })
    }

    /// Parse a decimal string into the given unit.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidNumber`] when the string is not a number,
    /// otherwise the errors of [`Money::from_decimal`].
    pub fn parse(input: &str, unit: Unit) -> Result<Self, DomainError> {
        Self::from_decimal(parse_decimal(input)?, unit)
    }

    /// Parse a listing price in USD.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidPrice`] for zero or negative prices,
    /// [`DomainError::InvalidNumber`] for anything that is not a number.
    pub fn parse_price_usd(input: &str) -> Result<Self, DomainError> {
        Self::parse_positive(input, Unit::Usd, |price| DomainError::InvalidPrice { price })
    }

    /// Parse a loan principal in USD.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidPrincipal`] for zero or negative principals,
    /// [`DomainError::InvalidNumber`] for anything that is not a number.
    pub fn parse_principal_usd(input: &str) -> Result<Self, DomainError> {
        Self::parse_positive(input, Unit::Usd, |principal| {
            DomainError::InvalidPrincipal { principal }
        })
    }

    fn parse_positive(
        input: &str,
        unit: Unit,
        not_positive: impl FnOnce(String) -> DomainError,
    ) -> Result<Self, DomainError> {
        let value = parse_decimal(input)?;
        if value <= Decimal::ZERO {
            return Err(not_positive(format!("{value} {unit}")));
        }
        Self::from_decimal(value, unit)
    }

    /// The raw fixed-point integer.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.raw
    }

    /// The unit of this amount.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Convert to a `Decimal` when the raw value fits its 96-bit mantissa.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw: u128 = self.raw.try_into().ok()?;
        let raw = i128::try_from(raw).ok()?;
        Decimal::try_from_i128_with_scale(raw, self.unit.decimals())
            .ok()
            .map(|d| d.normalize())
    }

    /// Add two amounts of the same unit.
    ///
    /// # Errors
    ///
    /// Fails on unit mismatch or overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.ensure_same_unit(other)?;
        let raw = self.raw.checked_add(other.raw).ok_or(DomainError::Overflow)?;
        Ok(Self { raw, ..self })
    }

    /// Subtract an amount of the same unit.
    ///
    /// # Errors
    ///
    /// Fails on unit mismatch or underflow.
    pub fn checked_sub(self, other: Self) -> Result<Self, DomainError> {
        self.ensure_same_unit(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or(DomainError::Overflow)?;
        Ok(Self { raw, ..self })
    }

    /// Fail unless this amount is in `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnitMismatch`].
    pub fn expect_unit(&self, unit: Unit) -> Result<(), DomainError> {
        if self.unit == unit {
            Ok(())
        } else {
            Err(DomainError::UnitMismatch {
                expected: unit,
                actual: self.unit,
            })
        }
    }

    fn ensure_same_unit(&self, other: Self) -> Result<(), DomainError> {
        other.expect_unit(self.unit)
    }

    /// Format the amount as a plain decimal string without the symbol.
    #[must_use]
    pub fn amount_string(&self) -> String {
        let scale = self.unit.scale();
        let whole = self.raw / scale;
        let frac = self.raw % scale;
        if frac.is_zero() {
            return whole.to_string();
        }
        let digits = format!(
            "{:0>width$}",
            frac.to_string(),
            width = self.unit.decimals() as usize
        );
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

fn parse_decimal(input: &str) -> Result<Decimal, DomainError> {
    input.trim().parse().map_err(|_| DomainError::InvalidNumber {
        input: input.to_string(),
    })
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount_string(), self.unit.symbol())
    }
}

/// USD price of one whole native unit, as 8-decimal fixed point.
///
/// Conversions mirror the on-chain arithmetic and round down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    usd_per_native: U256,
}

impl ExchangeRate {
    /// Build a rate from an 8-decimal USD price.
    ///
    /// # Errors
    ///
    /// A zero rate is rejected.
    pub fn new(usd_per_native: U256) -> Result<Self, DomainError> {
        if usd_per_native.is_zero() {
            return Err(DomainError::InvalidPriceFeed {
                answer: "0".into(),
            });
        }
        Ok(Self { usd_per_native })
    }

    /// Build a rate from a signed price feed answer.
    ///
    /// # Errors
    ///
    /// Zero and negative answers are rejected.
    pub fn from_answer(answer: I256) -> Result<Self, DomainError> {
        if answer <= I256::ZERO {
            return Err(DomainError::InvalidPriceFeed {
                answer: answer.to_string(),
            });
        }
        Self::new(answer.into_raw())
    }

    /// The rate as a USD amount per whole native unit.
    #[must_use]
    pub const fn as_money(&self) -> Money {
        Money::usd(self.usd_per_native)
    }

    /// `usd * 10^18 / rate`.
    ///
    /// # Errors
    ///
    /// Fails when `usd` is not a USD amount or on overflow.
    pub fn usd_to_native(&self, usd: Money) -> Result<Money, DomainError> {
        usd.expect_unit(Unit::Usd)?;
        let scaled = usd
            .raw()
            .checked_mul(Unit::Native.scale())
            .ok_or(DomainError::Overflow)?;
        Ok(Money::native(scaled / self.usd_per_native))
    }

    /// `native * rate / 10^18`.
    ///
    /// # Errors
    ///
    /// Fails when `native` is not a native amount or on overflow.
    pub fn native_to_usd(&self, native: Money) -> Result<Money, DomainError> {
        native.expect_unit(Unit::Native)?;
        let scaled = native
            .raw()
            .checked_mul(self.usd_per_native)
            .ok_or(DomainError::Overflow)?;
        Ok(Money::usd(scaled / Unit::Native.scale()))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} USD/ETH", self.as_money().amount_string())
    }
}
