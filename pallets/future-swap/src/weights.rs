#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn deposit() -> Weight;
  fn set_attributes(n: u32) -> Weight;
  fn set_attributes_raw(n: u32) -> Weight;
  fn apply_staged_attributes(n: u32) -> Weight;
  fn settle(n: u32) -> Weight;
  fn disconnect_block(n: u32) -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  // Attributes(r: all), FutureSwaps(r/w), Assets(r/w: 4), ContractBalances(r/w),
  // AccountHistoryCount(r/w), AccountHistory(w), UndoLog(w: 6), JournalLength(r/w)
  fn deposit() -> Weight {
    Weight::from_parts(48_000_000, 4200)
      .saturating_add(T::DbWeight::get().reads(10))
      .saturating_add(T::DbWeight::get().writes(14))
  }

  fn set_attributes(n: u32) -> Weight {
    Weight::from_parts(9_000_000, 1500)
      .saturating_add(Weight::from_parts(3_500_000, 0).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes((3_u64).saturating_mul(n.into())))
  }

  fn set_attributes_raw(n: u32) -> Weight {
    Weight::from_parts(10_000_000, 1500)
      .saturating_add(Weight::from_parts(5_000_000, 0).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes((3_u64).saturating_mul(n.into())))
  }

  fn apply_staged_attributes(n: u32) -> Weight {
    Weight::from_parts(4_000_000, 1000)
      .saturating_add(Weight::from_parts(4_000_000, 0).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads((2_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes((6_u64).saturating_mul(n.into())))
  }

  // Per entry: oracle read, two asset mutations, ledger removal, two history records and
  // their journal ops.
  fn settle(n: u32) -> Weight {
    Weight::from_parts(12_000_000, 2000)
      .saturating_add(Weight::from_parts(60_000_000, 4200).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads((12_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes((20_u64).saturating_mul(n.into())))
  }

  fn disconnect_block(n: u32) -> Weight {
    Weight::from_parts(8_000_000, 1000)
      .saturating_add(Weight::from_parts(6_000_000, 600).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes((3_u64).saturating_mul(n.into())))
  }
}

impl WeightInfo for () {
  fn deposit() -> Weight { Weight::from_parts(48_000_000, 4200) }
  fn set_attributes(n: u32) -> Weight { Weight::from_parts(9_000_000, 1500).saturating_add(Weight::from_parts(3_500_000, 0).saturating_mul(n.into())) }
  fn set_attributes_raw(n: u32) -> Weight { Weight::from_parts(10_000_000, 1500).saturating_add(Weight::from_parts(5_000_000, 0).saturating_mul(n.into())) }
  fn apply_staged_attributes(n: u32) -> Weight { Weight::from_parts(4_000_000, 1000).saturating_add(Weight::from_parts(4_000_000, 0).saturating_mul(n.into())) }
  fn settle(n: u32) -> Weight { Weight::from_parts(12_000_000, 2000).saturating_add(Weight::from_parts(60_000_000, 4200).saturating_mul(n.into())) }
  fn disconnect_block(n: u32) -> Weight { Weight::from_parts(8_000_000, 1000).saturating_add(Weight::from_parts(6_000_000, 600).saturating_mul(n.into())) }
}
