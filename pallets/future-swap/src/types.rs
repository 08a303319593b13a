use crate::attributes::{AttributeKey, AttributeValue};
use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use primitives::{AssetKind, SignedTokenAmount, TokenAmount};
use scale_info::TypeInfo;

/// Pending deposit of one owner for one source token.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct FutureSwapEntry {
  pub amount: u128,
  pub destination: AssetKind,
}

#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum HistoryTag {
  Deposit,
  SettlementDebit,
  SettlementCredit,
}

/// Account history projection. Debits carry a negative amount.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct HistoryRecord<AccountId, BlockNumber> {
  pub owner: AccountId,
  pub block: BlockNumber,
  pub amount: SignedTokenAmount,
  pub tag: HistoryTag,
}

#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum BurnReason {
  SmartContract,
}

/// Source tokens burned by one settlement, aggregated per token.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct BurnRecord<BlockNumber> {
  pub asset: AssetKind,
  pub amount: u128,
  pub block: BlockNumber,
  pub reason: BurnReason,
}

/// Why an entry stayed pending at a settlement boundary.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum DeferReason {
  PriceUnavailable,
  TokenDisabled,
}

/// Result of attempting one entry: it either settles or remains pending for the next boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryOutcome {
  Settled { credited: u128 },
  Deferred(DeferReason),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SettlementSummary {
  pub settled: u32,
  pub deferred: u32,
}

/// Registry view of the holding account, listed alongside other contract-like features.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct SmartContractInfo<AccountId> {
  pub name: Vec<u8>,
  pub call: Vec<u8>,
  pub address: AccountId,
  pub balances: Vec<TokenAmount>,
}

/// One reversible mutation recorded in the undo journal of the block that made it.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum JournalOp<AccountId> {
  Ledger {
    owner: AccountId,
    source: AssetKind,
    previous: Option<FutureSwapEntry>,
  },
  ContractBalance {
    asset: AssetKind,
    previous: u128,
  },
  Transfer {
    asset: AssetKind,
    from: AccountId,
    to: AccountId,
    amount: u128,
  },
  Mint {
    asset: AssetKind,
    who: AccountId,
    amount: u128,
  },
  Burn {
    asset: AssetKind,
    who: AccountId,
    amount: u128,
  },
  TotalBurned {
    asset: AssetKind,
    previous: u128,
  },
  TotalMinted {
    asset: AssetKind,
    previous: u128,
  },
  HistoryAppended {
    index: u64,
  },
  BurnRecordAppended {
    index: u64,
  },
  Attribute {
    key: AttributeKey,
    previous: Option<AttributeValue>,
  },
  Staged {
    key: AttributeKey,
    previous: Option<AttributeValue>,
  },
}
