//! Governance attributes consumed by the future swap engine.
//!
//! Attributes are stored as typed key/value pairs. The string form used by operators,
//! `v0/params/futureswap/<name>` and `v0/token/<id>/futureswap[_reward_pct]`, is translated
//! here so the pallet only ever sees [`AttributeKey`] and [`AttributeValue`].
//!
//! [`GovernanceParameters`] is the typed snapshot built from every attribute effective at a
//! block. Settlement and deposit validation take it as an argument rather than reading
//! attribute storage directly.

use alloc::collections::BTreeMap;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use core::fmt;
use frame::deps::sp_runtime::Permill;
use primitives::{AmountParseError, AssetKind, COIN, parse_fixed};
use scale_info::TypeInfo;

const VERSION: &str = "v0";
const FEATURE: &str = "futureswap";
const FEATURE_REWARD_PCT: &str = "futureswap_reward_pct";

#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
)]
pub enum AttributeKey {
  /// `v0/params/futureswap/active`
  Active,
  /// `v0/params/futureswap/period_blocks`
  PeriodBlocks,
  /// `v0/params/futureswap/reward_pct`
  RewardPct,
  /// `v0/token/<id>/futureswap`
  TokenEnabled(AssetKind),
  /// `v0/token/<id>/futureswap_reward_pct`
  TokenRewardPct(AssetKind),
}

#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum AttributeValue {
  Bool(bool),
  Blocks(u32),
  Pct(Permill),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttributeError {
  UnsupportedVersion,
  UnknownKey,
  InvalidToken,
  InvalidValue,
  PercentageExceeded,
  TypeMismatch,
}

impl AttributeKey {
  /// Token addressed by a per-token key.
  pub fn token(&self) -> Option<AssetKind> {
    match self {
      AttributeKey::TokenEnabled(token) | AttributeKey::TokenRewardPct(token) => Some(*token),
      _ => None,
    }
  }

  /// Checks that `value` has the shape this key expects.
  pub fn validate(&self, value: &AttributeValue) -> Result<(), AttributeError> {
    match (self, value) {
      (AttributeKey::Active | AttributeKey::TokenEnabled(_), AttributeValue::Bool(_)) => Ok(()),
      (AttributeKey::PeriodBlocks, AttributeValue::Blocks(0)) => Err(AttributeError::InvalidValue),
      (AttributeKey::PeriodBlocks, AttributeValue::Blocks(_)) => Ok(()),
      (AttributeKey::RewardPct | AttributeKey::TokenRewardPct(_), AttributeValue::Pct(_)) => Ok(()),
      _ => Err(AttributeError::TypeMismatch),
    }
  }

  /// Parse the value part of a string attribute according to this key's type.
  pub fn parse_value(&self, raw: &str) -> Result<AttributeValue, AttributeError> {
    let value = match self {
      AttributeKey::Active | AttributeKey::TokenEnabled(_) => match raw {
        "true" => AttributeValue::Bool(true),
        "false" => AttributeValue::Bool(false),
        _ => return Err(AttributeError::InvalidValue),
      },
      AttributeKey::PeriodBlocks => {
        AttributeValue::Blocks(raw.parse().map_err(|_| AttributeError::InvalidValue)?)
      }
      AttributeKey::RewardPct | AttributeKey::TokenRewardPct(_) => {
        AttributeValue::Pct(parse_pct(raw)?)
      }
    };
    self.validate(&value)?;
    Ok(value)
  }
}

impl core::str::FromStr for AttributeKey {
  type Err = AttributeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut parts = s.split('/');
    if parts.next() != Some(VERSION) {
      return Err(AttributeError::UnsupportedVersion);
    }
    let key = match (parts.next(), parts.next(), parts.next()) {
      (Some("params"), Some(FEATURE), Some(name)) => match name {
        "active" => AttributeKey::Active,
        "period_blocks" => AttributeKey::PeriodBlocks,
        "reward_pct" => AttributeKey::RewardPct,
        _ => return Err(AttributeError::UnknownKey),
      },
      (Some("token"), Some(id), Some(name)) => {
        let token: AssetKind = id.parse().map_err(|_| AttributeError::InvalidToken)?;
        match name {
          FEATURE => AttributeKey::TokenEnabled(token),
          FEATURE_REWARD_PCT => AttributeKey::TokenRewardPct(token),
          _ => return Err(AttributeError::UnknownKey),
        }
      }
      _ => return Err(AttributeError::UnknownKey),
    };
    if parts.next().is_some() {
      return Err(AttributeError::UnknownKey);
    }
    Ok(key)
  }
}

impl fmt::Display for AttributeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AttributeKey::Active => write!(f, "{VERSION}/params/{FEATURE}/active"),
      AttributeKey::PeriodBlocks => write!(f, "{VERSION}/params/{FEATURE}/period_blocks"),
      AttributeKey::RewardPct => write!(f, "{VERSION}/params/{FEATURE}/reward_pct"),
      AttributeKey::TokenEnabled(token) => write!(f, "{VERSION}/token/{token}/{FEATURE}"),
      AttributeKey::TokenRewardPct(token) => {
        write!(f, "{VERSION}/token/{token}/{FEATURE_REWARD_PCT}")
      }
    }
  }
}

/// Parse a decimal fraction (`"0.05"`) into a `Permill`, rejecting values above one.
pub fn parse_pct(raw: &str) -> Result<Permill, AttributeError> {
  let scaled = parse_fixed(raw).map_err(|e| match e {
    AmountParseError::AmountOutOfRange => AttributeError::PercentageExceeded,
    _ => AttributeError::InvalidValue,
  })?;
  if scaled > COIN {
    return Err(AttributeError::PercentageExceeded);
  }
  Ok(Permill::from_rational(scaled, COIN))
}

/// Adjustment applied to the gross output of a settled entry.
///
/// Exactly one band applies to any token: a per-token reward, else the global reward, else
/// the default premium charged against the depositor.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum RewardBand {
  DefaultPremium(Permill),
  GlobalReward(Permill),
  TokenReward(Permill),
}

impl RewardBand {
  /// Net output for `gross`. `None` on overflow.
  pub fn apply(&self, gross: u128) -> Option<u128> {
    match self {
      RewardBand::DefaultPremium(premium) => Some(gross.saturating_sub(premium.mul_floor(gross))),
      RewardBand::GlobalReward(reward) | RewardBand::TokenReward(reward) => {
        gross.checked_add(reward.mul_floor(gross))
      }
    }
  }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenParameters {
  pub enabled: Option<bool>,
  pub reward_pct: Option<Permill>,
}

/// Typed view of every future swap attribute effective at one block.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GovernanceParameters {
  pub active: bool,
  pub period_blocks: Option<u32>,
  pub reward_pct: Option<Permill>,
  pub tokens: BTreeMap<AssetKind, TokenParameters>,
}

impl GovernanceParameters {
  pub fn from_attributes<I>(attributes: I) -> Self
  where
    I: IntoIterator<Item = (AttributeKey, AttributeValue)>,
  {
    let mut params = Self::default();
    for (key, value) in attributes {
      match (key, value) {
        (AttributeKey::Active, AttributeValue::Bool(active)) => params.active = active,
        (AttributeKey::PeriodBlocks, AttributeValue::Blocks(blocks)) if blocks > 0 => {
          params.period_blocks = Some(blocks)
        }
        (AttributeKey::RewardPct, AttributeValue::Pct(pct)) => params.reward_pct = Some(pct),
        (AttributeKey::TokenEnabled(token), AttributeValue::Bool(enabled)) => {
          params.tokens.entry(token).or_default().enabled = Some(enabled)
        }
        (AttributeKey::TokenRewardPct(token), AttributeValue::Pct(pct)) => {
          params.tokens.entry(token).or_default().reward_pct = Some(pct)
        }
        (key, value) => log::warn!(
          target: crate::LOG_TARGET,
          "ignoring malformed attribute {} = {:?}",
          key,
          value,
        ),
      }
    }
    params
  }

  /// Tokens take part unless governance explicitly disabled them.
  pub fn is_token_enabled(&self, token: AssetKind) -> bool {
    self
      .tokens
      .get(&token)
      .and_then(|t| t.enabled)
      .unwrap_or(true)
  }

  pub fn reward_band(&self, token: AssetKind, default_premium: Permill) -> RewardBand {
    if let Some(pct) = self.tokens.get(&token).and_then(|t| t.reward_pct) {
      return RewardBand::TokenReward(pct);
    }
    match self.reward_pct {
      Some(pct) => RewardBand::GlobalReward(pct),
      None => RewardBand::DefaultPremium(default_premium),
    }
  }
}
