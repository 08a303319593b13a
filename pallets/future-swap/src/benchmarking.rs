extern crate alloc;

use crate::*;
use crate::attributes::{AttributeKey, AttributeValue};
use alloc::{format, vec::Vec};
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::{BoundedVec, traits::Get};
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::{Permill, traits::StaticLookup};
use primitives::{AssetKind, COIN, well_known};

const SOURCE: AssetKind = AssetKind::Local(well_known::DOGE);
const DEPOSIT: u128 = 100 * COIN;

fn open_feature<T: Config>() -> polkadot_sdk::frame_system::pallet_prelude::BlockNumberFor<T> {
  let now = T::ActivationBlock::get();
  polkadot_sdk::frame_system::Pallet::<T>::set_block_number(now);
  ConnectedHeight::<T>::put(now);
  Attributes::<T>::insert(AttributeKey::Active, AttributeValue::Bool(true));
  Attributes::<T>::insert(AttributeKey::PeriodBlocks, AttributeValue::Blocks(1));
  T::BenchmarkHelper::create_asset(SOURCE).expect("Failed to create source asset");
  T::BenchmarkHelper::create_asset(T::StableAsset::get()).expect("Failed to create stable asset");
  now
}

fn funded_depositor<T: Config>(index: u32) -> T::AccountId {
  let who: T::AccountId = account("depositor", index, 0);
  T::BenchmarkHelper::ensure_funded(&who, SOURCE, 10 * DEPOSIT)
    .expect("Failed to fund depositor");
  who
}

fn deposit_for<T: Config>(who: &T::AccountId) {
  Pallet::<T>::deposit(
    RawOrigin::Signed(who.clone()).into(),
    T::Lookup::unlookup(who.clone()),
    DEPOSIT,
    SOURCE,
    T::StableAsset::get(),
  )
  .expect("Failed to deposit");
}

fn reward_updates(n: u32) -> Vec<(AttributeKey, AttributeValue)> {
  (0..n)
    .map(|i| {
      (
        AttributeKey::RewardPct,
        AttributeValue::Pct(Permill::from_parts(i)),
      )
    })
    .collect()
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn deposit() {
    open_feature::<T>();
    let caller = funded_depositor::<T>(0);
    // Existing entry makes this the accumulating path
    deposit_for::<T>(&caller);
    let owner = T::Lookup::unlookup(caller.clone());

    #[extrinsic_call]
    deposit(
      RawOrigin::Signed(caller.clone()),
      owner,
      DEPOSIT,
      SOURCE,
      T::StableAsset::get(),
    );

    assert_eq!(
      FutureSwaps::<T>::get(&caller, SOURCE).map(|e| e.amount),
      Some(2 * DEPOSIT)
    );
  }

  #[benchmark]
  fn set_attributes(n: Linear<1, { T::MaxAttributeUpdates::get() }>) {
    let updates: BoundedVec<_, T::MaxAttributeUpdates> =
      reward_updates(n).try_into().expect("Bounded by MaxAttributeUpdates");

    #[extrinsic_call]
    set_attributes(RawOrigin::Root, updates);

    assert!(PendingAttributes::<T>::contains_key(AttributeKey::RewardPct));
  }

  #[benchmark]
  fn set_attributes_raw(n: Linear<1, { T::MaxAttributeUpdates::get() }>) {
    let updates: Vec<(RawAttribute, RawAttribute)> = (0..n)
      .map(|i| {
        let key: RawAttribute = b"v0/params/futureswap/reward_pct"
          .to_vec()
          .try_into()
          .expect("Key fits");
        let value: RawAttribute = format!("0.{:06}", i)
          .into_bytes()
          .try_into()
          .expect("Value fits");
        (key, value)
      })
      .collect();
    let updates: BoundedVec<_, T::MaxAttributeUpdates> =
      updates.try_into().expect("Bounded by MaxAttributeUpdates");

    #[extrinsic_call]
    set_attributes_raw(RawOrigin::Root, updates);

    assert!(PendingAttributes::<T>::contains_key(AttributeKey::RewardPct));
  }

  #[benchmark]
  fn apply_staged_attributes(n: Linear<1, { T::MaxAttributeUpdates::get() }>) {
    T::BenchmarkHelper::create_asset(SOURCE).expect("Failed to create source asset");
    PendingAttributes::<T>::insert(AttributeKey::Active, AttributeValue::Bool(true));
    PendingAttributes::<T>::insert(AttributeKey::PeriodBlocks, AttributeValue::Blocks(n));
    PendingAttributes::<T>::insert(
      AttributeKey::TokenRewardPct(SOURCE),
      AttributeValue::Pct(Permill::from_parts(n)),
    );

    #[block]
    {
      Pallet::<T>::apply_staged_attributes();
    }

    assert!(PendingAttributes::<T>::iter().next().is_none());
  }

  #[benchmark]
  fn settle(n: Linear<1, 100>) {
    let now = open_feature::<T>();
    T::BenchmarkHelper::set_price(SOURCE, T::StableAsset::get(), COIN);
    for i in 0..n {
      let who = funded_depositor::<T>(i);
      deposit_for::<T>(&who);
    }
    let params = Pallet::<T>::governance_parameters();

    #[block]
    {
      Pallet::<T>::settle(now, &params).expect("Settlement failed");
    }

    assert_eq!(FutureSwaps::<T>::iter().count(), 0);
  }

  #[benchmark]
  fn disconnect_block(n: Linear<1, 100>) {
    let now = open_feature::<T>();
    for i in 0..n {
      let who = funded_depositor::<T>(i);
      deposit_for::<T>(&who);
    }

    #[block]
    {
      Pallet::<T>::on_block_disconnected(now).expect("Disconnect failed");
    }

    assert_eq!(FutureSwaps::<T>::iter().count(), 0);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
