extern crate alloc;

use crate as pallet_future_swap;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get, Hooks},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, Permill,
  testing::H256,
  traits::{BlakeTwo256, LookupError, StaticLookup},
};
use primitives::{
  AssetKind, COIN,
  ecosystem::{pallet_ids, params},
  well_known,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CHARLIE: u64 = 3;
/// Address the lookup refuses to resolve
pub const MALFORMED: u64 = 0;

pub const ACTIVATION_BLOCK: u64 = 10;
pub const UNDO_DEPTH: u32 = 5;

pub const DUSD: AssetKind = AssetKind::Local(well_known::DUSD);
pub const DOGE: AssetKind = AssetKind::Local(well_known::DOGE);
pub const TSLA: AssetKind = AssetKind::Local(well_known::TSLA);
pub const BTC: AssetKind = AssetKind::Local(well_known::BTC);
/// Loan-shaped id that was never created
pub const UNKNOWN_LOAN: AssetKind =
  AssetKind::Local(primitives::make_id(primitives::TYPE_LOAN, 9999));

thread_local! {
    // Oracle Prices: (From, To) -> Price; absent means unavailable
    pub static ORACLE_PRICES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };
}

pub fn set_oracle_price(from: AssetKind, to: AssetKind, price: u128) {
  ORACLE_PRICES.with(|p| p.borrow_mut().insert((from, to), price));
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    FutureSwap: pallet_future_swap,
  }
);

/// Identity lookup that rejects `MALFORMED`, standing in for address validation
pub struct CheckedLookup;
impl StaticLookup for CheckedLookup {
  type Source = u64;
  type Target = u64;

  fn lookup(source: u64) -> Result<u64, LookupError> {
    if source == MALFORMED {
      Err(LookupError)
    } else {
      Ok(source)
    }
  }

  fn unlookup(target: u64) -> u64 {
    target
  }
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = CheckedLookup;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

pub struct MockOracle;
impl pallet_future_swap::PriceOracle<AssetKind, u128> for MockOracle {
  fn get_oracle_price(from: AssetKind, to: AssetKind) -> Option<u128> {
    ORACLE_PRICES.with(|p| p.borrow().get(&(from, to)).cloned())
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*pallet_ids::FUTURE_SWAP_PALLET_ID)
  }
}

pub struct StableAssetStub;
impl Get<AssetKind> for StableAssetStub {
  fn get() -> AssetKind {
    DUSD
  }
}

pub struct DefaultPremiumStub;
impl Get<Permill> for DefaultPremiumStub {
  fn get() -> Permill {
    params::FUTURE_SWAP_DEFAULT_PREMIUM
  }
}

impl pallet_future_swap::Config for Test {
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = FutureSwapBenchmarkHelper;
  type Assets = Assets;
  type PriceOracle = MockOracle;
  type PalletId = PalletIdStub;
  type StableAsset = StableAssetStub;
  type ActivationBlock = ConstU64<ACTIVATION_BLOCK>;
  type DefaultPremium = DefaultPremiumStub;
  type Precision = ConstU128<{ params::PRECISION }>;
  type MaxDepositAmount = ConstU128<{ params::FUTURE_SWAP_MAX_DEPOSIT }>;
  type MaxAttributeUpdates = ConstU32<{ params::FUTURE_SWAP_MAX_ATTRIBUTE_UPDATES }>;
  type UndoDepth = ConstU32<UNDO_DEPTH>;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type WeightInfo = ();
}

#[cfg(feature = "runtime-benchmarks")]
pub struct FutureSwapBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AssetKind, u64, u128> for FutureSwapBenchmarkHelper {
  fn create_asset(asset: AssetKind) -> polkadot_sdk::sp_runtime::DispatchResult {
    if let AssetKind::Local(id) = asset {
      if !<Assets as polkadot_sdk::frame_support::traits::fungibles::Inspect<u64>>::asset_exists(
        id,
      ) {
        Assets::force_create(frame_system::RawOrigin::Root.into(), id, 1, true, 1)?;
      }
    }
    Ok(())
  }

  fn ensure_funded(
    who: &u64,
    asset: AssetKind,
    amount: u128,
  ) -> polkadot_sdk::sp_runtime::DispatchResult {
    use polkadot_sdk::frame_support::traits::fungibles::Mutate;
    match asset {
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        Assets::mint_into(id, who, amount)?;
        Ok(())
      }
      AssetKind::Native => Err(DispatchError::Other("native funding unsupported")),
    }
  }

  fn set_price(from: AssetKind, to: AssetKind, price: u128) {
    set_oracle_price(from, to, price);
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    // (id, owner, is_sufficient, min_balance)
    assets: alloc::vec![
      (well_known::DUSD, ALICE, true, 1),
      (well_known::DOGE, ALICE, true, 1),
      (well_known::TSLA, ALICE, true, 1),
      (well_known::BTC, ALICE, true, 1),
    ],
    metadata: alloc::vec![],
    accounts: alloc::vec![
      (well_known::DOGE, ALICE, 1_000 * COIN),
      (well_known::DOGE, BOB, 1_000 * COIN),
      (well_known::DOGE, CHARLIE, 1_000 * COIN),
      (well_known::TSLA, ALICE, 1_000 * COIN),
      (well_known::DUSD, ALICE, 1_000 * COIN),
      (well_known::BTC, ALICE, 1_000 * COIN),
    ],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_future_swap::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  ORACLE_PRICES.with(|p| p.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);
    FutureSwap::on_initialize(1);
  });
  ext
}

/// Finalize the current block and initialize blocks up to `n`.
pub fn run_to_block(n: u64) {
  while System::block_number() < n {
    let now = System::block_number();
    FutureSwap::on_finalize(now);
    System::set_block_number(now + 1);
    FutureSwap::on_initialize(now + 1);
  }
}

/// Run the current block's finalization without opening the next block.
pub fn finalize_block() {
  FutureSwap::on_finalize(System::block_number());
}

/// Disconnect the tip and step the system back to its parent.
pub fn disconnect_tip() -> Result<u32, DispatchError> {
  let tip = System::block_number();
  let reverted = FutureSwap::on_block_disconnected(tip)?;
  System::set_block_number(tip - 1);
  Ok(reverted)
}

pub fn asset_balance(asset: AssetKind, who: u64) -> u128 {
  use polkadot_sdk::frame_support::traits::fungibles::Inspect;
  match asset {
    AssetKind::Local(id) | AssetKind::Foreign(id) => Assets::balance(id, &who),
    AssetKind::Native => Balances::free_balance(who),
  }
}
