use crate::amounts::AmountParseError;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use core::fmt;
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Single source of truth for token identifiers across the future swap engine.
///
/// - `Native`: the chain's native token (managed by pallet-balances), rendered as `0`.
/// - `Local(u32)`: protocol tokens managed by pallet-assets; the top nibble carries the kind.
/// - `Foreign(u32)`: tokens bridged in from another chain.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets via XCM mapping (0xF... namespace)
  Foreign(u32),
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    if asset_id == 0 {
      AssetKind::Native
    } else {
      AssetKind::Local(asset_id)
    }
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AssetKind::Native => write!(f, "0"),
      AssetKind::Local(id) => write!(f, "{}", id),
      AssetKind::Foreign(id) => write!(f, "f{}", id),
    }
  }
}

impl core::str::FromStr for AssetKind {
  type Err = AmountParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (foreign, digits) = match s.strip_prefix('f') {
      Some(rest) => (true, rest),
      None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(AmountParseError::InvalidToken);
    }
    let id: u32 = digits.parse().map_err(|_| AmountParseError::InvalidToken)?;
    Ok(if foreign {
      AssetKind::Foreign(id)
    } else {
      AssetKind::from(id)
    })
  }
}

// Bitmask Architecture for Asset Classification
//
// 32-bit ID Structure:
// [ 4 bits: Type ] [ 28 bits: Index/ID ]
//
// Types:
// 0x1... -> Standard Tokens (collateral, governance)
// 0x2... -> Stablecoins issued outside the loan system
// 0x5... -> Loan Tokens (protocol-issued, the only valid future swap source)
// 0xF... -> Foreign/XCM Assets

pub const MASK_TYPE: u32 = 0xF000_0000;
pub const MASK_INDEX: u32 = 0x0FFF_FFFF;

pub const TYPE_STD: u32 = 0x1000_0000;
pub const TYPE_STABLE: u32 = 0x2000_0000;
pub const TYPE_LOAN: u32 = 0x5000_0000;
pub const TYPE_FOREIGN: u32 = 0xF000_0000;

/// Helper trait to inspect AssetKind properties
pub trait AssetInspector {
  fn is_native(&self) -> bool;
  fn local_id(&self) -> Option<u32>;

  fn is_std(&self) -> bool;
  fn is_stable(&self) -> bool;
  /// Loan tokens carry interest/collateral semantics and may be scheduled for a future swap.
  fn is_loan(&self) -> bool;
  fn is_foreign(&self) -> bool;
}

impl AssetKind {
  fn has_type(&self, type_mask: u32) -> bool {
    match self {
      AssetKind::Local(id) => (id & MASK_TYPE) == type_mask,
      _ => false,
    }
  }
}

impl AssetInspector for AssetKind {
  fn is_native(&self) -> bool {
    matches!(self, AssetKind::Native)
  }

  fn local_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) | AssetKind::Foreign(id) => Some(*id),
      _ => None,
    }
  }

  fn is_std(&self) -> bool {
    self.has_type(TYPE_STD)
  }

  fn is_stable(&self) -> bool {
    self.has_type(TYPE_STABLE)
  }

  fn is_loan(&self) -> bool {
    self.has_type(TYPE_LOAN)
  }

  fn is_foreign(&self) -> bool {
    match self {
      AssetKind::Foreign(_) => true,
      AssetKind::Local(id) => (id & MASK_TYPE) == TYPE_FOREIGN,
      _ => false,
    }
  }
}

/// Helper to construct compile-time IDs
pub const fn make_id(type_mask: u32, index: u32) -> u32 {
  type_mask | (index & MASK_INDEX)
}

/// Well-known asset constants serving as system defaults
pub mod well_known {
  use super::*;

  // Standard Tokens (0x1...)
  pub const BTC: u32 = make_id(TYPE_STD, 1);
  pub const ETH: u32 = make_id(TYPE_STD, 2);

  // Stablecoins (0x2...)
  pub const USDT: u32 = make_id(TYPE_STABLE, 1);

  // Loan Tokens (0x5...)
  pub const DUSD: u32 = make_id(TYPE_LOAN, 1);
  pub const DOGE: u32 = make_id(TYPE_LOAN, 2);
  pub const TSLA: u32 = make_id(TYPE_LOAN, 3);
}

#[cfg(test)]
mod tests {
  use super::*;
  use core::str::FromStr;

  #[test]
  fn test_well_known_ids() {
    assert_eq!(well_known::BTC & MASK_TYPE, TYPE_STD);
    assert_eq!(well_known::USDT & MASK_TYPE, TYPE_STABLE);
    assert_eq!(well_known::DUSD & MASK_TYPE, TYPE_LOAN);
    assert_eq!(well_known::DOGE & MASK_TYPE, TYPE_LOAN);
  }

  #[test]
  fn test_asset_inspection() {
    let doge = AssetKind::Local(well_known::DOGE);
    assert!(doge.is_loan());
    assert!(!doge.is_std());

    let usdt = AssetKind::Local(well_known::USDT);
    assert!(usdt.is_stable());
    assert!(!usdt.is_loan());

    let native = AssetKind::Native;
    assert!(native.is_native());
    assert!(!native.is_loan());
  }

  #[test]
  fn test_loan_namespace_isolation() {
    let max_loan = AssetKind::Local(TYPE_LOAN | MASK_INDEX);
    assert!(max_loan.is_loan());

    // Foreign assets never classify as loans even with a loan-shaped index
    let foreign = AssetKind::Foreign(TYPE_LOAN | 7);
    assert!(!foreign.is_loan());
    assert!(foreign.is_foreign());
  }

  #[test]
  fn test_token_id_display_round_trip() {
    assert_eq!(AssetKind::Native.to_string(), "0");
    assert_eq!(AssetKind::from_str("0"), Ok(AssetKind::Native));
    assert_eq!(
      AssetKind::from_str(&well_known::DOGE.to_string()),
      Ok(AssetKind::Local(well_known::DOGE))
    );
    assert_eq!(AssetKind::from_str("f12"), Ok(AssetKind::Foreign(12)));
    assert_eq!(
      AssetKind::from_str("DOGE"),
      Err(AmountParseError::InvalidToken)
    );
    assert_eq!(AssetKind::from_str(""), Err(AmountParseError::InvalidToken));
  }
}
