//! Fixed-point token amounts rendered as `"<amount>@<token>"`.
//!
//! Amounts carry eight decimal places: `100.00000000@<id>` is `100 * COIN` base units.

use crate::{AssetKind, ecosystem::Balance};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use core::{fmt, str::FromStr};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// One whole token in base units (8 decimals).
pub const COIN: Balance = 100_000_000;

/// Number of fractional digits carried by every amount.
pub const DECIMALS: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AmountParseError {
  /// Missing `@` separator or empty amount part
  InvalidFormat,
  /// Token part is not a numeric id
  InvalidToken,
  /// More than eight fractional digits
  TooManyDecimals,
  /// Negative, zero where forbidden, or does not fit the balance type
  AmountOutOfRange,
}

impl fmt::Display for AmountParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = match self {
      AmountParseError::InvalidFormat => "Invalid amount format",
      AmountParseError::InvalidToken => "Invalid token",
      AmountParseError::TooManyDecimals => "Invalid amount, too many decimals",
      AmountParseError::AmountOutOfRange => "Amount out of range",
    };
    f.write_str(msg)
  }
}

/// Unsigned amount of a single token
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct TokenAmount {
  pub asset: AssetKind,
  pub amount: Balance,
}

impl TokenAmount {
  pub fn new(asset: AssetKind, amount: Balance) -> Self {
    Self { asset, amount }
  }
}

/// Amount of a single token as it appears in account history: debits are negative.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct SignedTokenAmount {
  pub asset: AssetKind,
  pub amount: i128,
}

impl SignedTokenAmount {
  /// `None` when `amount` does not fit the signed range.
  pub fn credit(asset: AssetKind, amount: Balance) -> Option<Self> {
    let amount = i128::try_from(amount).ok()?;
    Some(Self { asset, amount })
  }

  pub fn debit(asset: AssetKind, amount: Balance) -> Option<Self> {
    let amount = i128::try_from(amount).ok()?;
    Some(Self {
      asset,
      amount: -amount,
    })
  }
}

fn write_fixed(f: &mut fmt::Formatter<'_>, negative: bool, value: u128) -> fmt::Result {
  let sign = if negative { "-" } else { "" };
  write!(
    f,
    "{}{}.{:0width$}",
    sign,
    value / COIN,
    value % COIN,
    width = DECIMALS
  )
}

impl fmt::Display for TokenAmount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_fixed(f, false, self.amount)?;
    write!(f, "@{}", self.asset)
  }
}

impl fmt::Display for SignedTokenAmount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_fixed(f, self.amount < 0, self.amount.unsigned_abs())?;
    write!(f, "@{}", self.asset)
  }
}

/// Parse a decimal string with up to eight fractional digits into base units.
pub fn parse_fixed(value: &str) -> Result<Balance, AmountParseError> {
  if value.starts_with('-') {
    return Err(AmountParseError::AmountOutOfRange);
  }
  let (whole, frac) = match value.split_once('.') {
    Some((w, f)) => (w, f),
    None => (value, ""),
  };
  if whole.is_empty() && frac.is_empty() {
    return Err(AmountParseError::InvalidFormat);
  }
  let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
  if !digits(whole) || !digits(frac) {
    return Err(AmountParseError::InvalidFormat);
  }
  if frac.len() > DECIMALS {
    return Err(AmountParseError::TooManyDecimals);
  }
  let whole: Balance = if whole.is_empty() {
    0
  } else {
    whole
      .parse()
      .map_err(|_| AmountParseError::AmountOutOfRange)?
  };
  let mut scaled_frac: Balance = 0;
  for (i, b) in frac.bytes().enumerate() {
    let digit = Balance::from(b - b'0');
    scaled_frac += digit * 10u128.pow((DECIMALS - 1 - i) as u32);
  }
  whole
    .checked_mul(COIN)
    .and_then(|w| w.checked_add(scaled_frac))
    .ok_or(AmountParseError::AmountOutOfRange)
}

impl FromStr for TokenAmount {
  type Err = AmountParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (amount, token) = s.split_once('@').ok_or(AmountParseError::InvalidFormat)?;
    let amount = parse_fixed(amount)?;
    if amount == 0 {
      return Err(AmountParseError::AmountOutOfRange);
    }
    Ok(TokenAmount {
      asset: token.parse()?,
      amount,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::well_known;

  #[test]
  fn renders_eight_decimals() {
    let amount = TokenAmount::new(AssetKind::Local(well_known::DOGE), 100 * COIN);
    assert_eq!(
      amount.to_string(),
      format!("100.00000000@{}", well_known::DOGE)
    );

    let dust = TokenAmount::new(AssetKind::Native, 1);
    assert_eq!(dust.to_string(), "0.00000001@0");
  }

  #[test]
  fn renders_signed_history_amounts() {
    let doge = AssetKind::Local(well_known::DOGE);
    assert_eq!(
      SignedTokenAmount::debit(doge, 100 * COIN)
        .unwrap()
        .to_string(),
      format!("-100.00000000@{}", well_known::DOGE)
    );
    assert_eq!(
      SignedTokenAmount::credit(doge, 95 * COIN)
        .unwrap()
        .to_string(),
      format!("95.00000000@{}", well_known::DOGE)
    );
  }

  #[test]
  fn signed_amounts_reject_values_beyond_i128() {
    let doge = AssetKind::Local(well_known::DOGE);
    let limit = i128::MAX as u128;
    assert_eq!(
      SignedTokenAmount::credit(doge, limit).map(|a| a.amount),
      Some(i128::MAX)
    );
    assert_eq!(
      SignedTokenAmount::debit(doge, limit).map(|a| a.amount),
      Some(-i128::MAX)
    );
    assert_eq!(SignedTokenAmount::credit(doge, limit + 1), None);
    assert_eq!(SignedTokenAmount::debit(doge, u128::MAX), None);
  }

  #[test]
  fn parses_amount_at_token() {
    let parsed: TokenAmount = format!("10.5@{}", well_known::DOGE).parse().unwrap();
    assert_eq!(parsed.asset, AssetKind::Local(well_known::DOGE));
    assert_eq!(parsed.amount, 10 * COIN + COIN / 2);

    let native: TokenAmount = "1@0".parse().unwrap();
    assert_eq!(native.asset, AssetKind::Native);
  }

  #[test]
  fn rejects_malformed_amounts() {
    assert_eq!(
      "-1@2".parse::<TokenAmount>(),
      Err(AmountParseError::AmountOutOfRange)
    );
    assert_eq!(
      "0@2".parse::<TokenAmount>(),
      Err(AmountParseError::AmountOutOfRange)
    );
    assert_eq!(
      "10".parse::<TokenAmount>(),
      Err(AmountParseError::InvalidFormat)
    );
    assert_eq!(
      "1.123456789@2".parse::<TokenAmount>(),
      Err(AmountParseError::TooManyDecimals)
    );
    assert_eq!(
      "1@DOGE".parse::<TokenAmount>(),
      Err(AmountParseError::InvalidToken)
    );
    assert_eq!(
      "99999999999999999999999999999999999999@2".parse::<TokenAmount>(),
      Err(AmountParseError::AmountOutOfRange)
    );
  }

  #[test]
  fn parse_fixed_handles_fractions() {
    assert_eq!(parse_fixed("0.1"), Ok(COIN / 10));
    assert_eq!(parse_fixed(".05"), Ok(COIN / 20));
    assert_eq!(parse_fixed("3."), Ok(3 * COIN));
    assert_eq!(parse_fixed("."), Err(AmountParseError::InvalidFormat));
  }
}
