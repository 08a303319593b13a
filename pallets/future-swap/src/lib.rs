//! Future Swap Pallet
//!
//! Deferred, batched settlement of loan tokens into the designated stable token.
//!
//! Holders deposit a loan token into the pallet's holding account. At every period boundary
//! set by governance, all pending deposits are priced with the oracle snapshot of that block,
//! adjusted by the default premium or a configured reward, and settled at once: the source
//! tokens are burned and the owner is credited with freshly minted stable tokens.
//!
//! Every mutation is recorded in a per-block undo journal so that disconnecting a block
//! restores the ledger, balances, burn accounting and history exactly.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod attributes;
pub mod types;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::future-swap";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AssetKind, AccountId, Balance> {
  fn create_asset(asset: AssetKind) -> frame::deps::sp_runtime::DispatchResult;
  fn ensure_funded(
    who: &AccountId,
    asset: AssetKind,
    amount: Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
  fn set_price(from: AssetKind, to: AssetKind, price: Balance);
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, WeightInfo};
  use crate::{
    attributes::{AttributeError, AttributeKey, AttributeValue, GovernanceParameters, RewardBand},
    types::*,
  };
  use alloc::{collections::BTreeMap, vec::Vec};
  use frame::deps::{
    frame_support::{
      storage::with_storage_layer,
      traits::{
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::{Fortitude, Precision, Preservation},
      },
    },
    sp_core::U256,
    sp_runtime::{
      DispatchError, Permill,
      traits::{AccountIdConversion, One, Saturating, StaticLookup, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::{AssetInspector, AssetKind, SignedTokenAmount, TokenAmount};

  pub type AccountIdLookupOf<T> = <<T as frame_system::Config>::Lookup as StaticLookup>::Source;

  /// Upper bound on the byte length of a string attribute key or value
  pub const MAX_RAW_ATTRIBUTE_LEN: u32 = 96;

  pub type RawAttribute = BoundedVec<u8, ConstU32<MAX_RAW_ATTRIBUTE_LEN>>;

  /// Configuration trait for the future swap pallet
  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet holding loan and stable tokens
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = u128>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = u128>;

    /// Aggregated oracle price feed
    type PriceOracle: PriceOracle<AssetKind, u128>;

    /// The pallet ID deriving the holding account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// The only destination a future swap may settle into
    #[pallet::constant]
    type StableAsset: Get<AssetKind>;

    /// Network upgrade height from which the feature may be used at all
    #[pallet::constant]
    type ActivationBlock: Get<BlockNumberFor<Self>>;

    /// Premium charged against the depositor when no reward is configured
    #[pallet::constant]
    type DefaultPremium: Get<Permill>;

    /// Precision of oracle prices
    #[pallet::constant]
    type Precision: Get<u128>;

    /// Largest amount accepted by a single deposit
    #[pallet::constant]
    type MaxDepositAmount: Get<u128>;

    /// Maximum attribute updates in a single governance call
    #[pallet::constant]
    type MaxAttributeUpdates: Get<u32>;

    /// Number of recent blocks that can still be disconnected
    #[pallet::constant]
    type UndoDepth: Get<u32>;

    /// Origin that can change governance attributes
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<AssetKind, Self::AccountId, u128>;
  }

  /// Read-only price lookup
  pub trait PriceOracle<AssetId, Balance> {
    /// Price of one `from` unit in `to`, scaled by `Config::Precision`. `None` when no
    /// active price exists.
    fn get_oracle_price(from: AssetId, to: AssetId) -> Option<Balance>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Pending deposits keyed by owner and source token
  #[pallet::storage]
  pub type FutureSwaps<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    AssetKind,
    FutureSwapEntry,
    OptionQuery,
  >;

  /// Tokens held by the holding account on behalf of pending deposits
  #[pallet::storage]
  #[pallet::getter(fn contract_balance)]
  pub type ContractBalances<T: Config> = StorageMap<_, Blake2_128Concat, AssetKind, u128, ValueQuery>;

  /// Effective governance attributes
  #[pallet::storage]
  pub type Attributes<T: Config> =
    StorageMap<_, Blake2_128Concat, AttributeKey, AttributeValue, OptionQuery>;

  /// Attributes set by governance, applied at the start of the next block
  #[pallet::storage]
  pub type PendingAttributes<T: Config> =
    StorageMap<_, Blake2_128Concat, AttributeKey, AttributeValue, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn total_burned)]
  pub type TotalBurned<T: Config> = StorageMap<_, Blake2_128Concat, AssetKind, u128, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn total_minted)]
  pub type TotalMinted<T: Config> = StorageMap<_, Blake2_128Concat, AssetKind, u128, ValueQuery>;

  #[pallet::storage]
  pub type BurnHistory<T: Config> =
    StorageMap<_, Twox64Concat, u64, BurnRecord<BlockNumberFor<T>>, OptionQuery>;

  #[pallet::storage]
  pub type BurnHistoryCount<T: Config> = StorageValue<_, u64, ValueQuery>;

  #[pallet::storage]
  pub type AccountHistory<T: Config> = StorageMap<
    _,
    Twox64Concat,
    u64,
    HistoryRecord<T::AccountId, BlockNumberFor<T>>,
    OptionQuery,
  >;

  #[pallet::storage]
  pub type AccountHistoryCount<T: Config> = StorageValue<_, u64, ValueQuery>;

  /// Undo journal: block height -> op index -> reversible op
  #[pallet::storage]
  pub type UndoLog<T: Config> = StorageDoubleMap<
    _,
    Twox64Concat,
    BlockNumberFor<T>,
    Twox64Concat,
    u32,
    JournalOp<T::AccountId>,
    OptionQuery,
  >;

  #[pallet::storage]
  pub type JournalLength<T: Config> =
    StorageMap<_, Twox64Concat, BlockNumberFor<T>, u32, ValueQuery>;

  /// Tip height as seen by the pallet
  #[pallet::storage]
  #[pallet::getter(fn connected_height)]
  pub type ConnectedHeight<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  /// Oldest height whose journal is still retained
  #[pallet::storage]
  pub type JournalRetainedFrom<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    FutureSwapDeposited {
      owner: T::AccountId,
      source: AssetKind,
      amount: u128,
      destination: AssetKind,
    },
    FutureSwapSettled {
      owner: T::AccountId,
      source: AssetKind,
      amount: u128,
      destination: AssetKind,
      credited: u128,
    },
    /// Entry left pending until the next boundary
    FutureSwapDeferred {
      owner: T::AccountId,
      source: AssetKind,
      amount: u128,
      reason: DeferReason,
    },
    SettlementCompleted {
      height: BlockNumberFor<T>,
      settled: u32,
      deferred: u32,
    },
    /// Settlement rolled back as a whole; every entry stays pending.
    ///
    /// Nothing is skipped on retry: an entry that keeps failing, such as one whose price
    /// overflows the output, aborts every later boundary too until governance disables its
    /// token or the price changes.
    SettlementAborted {
      height: BlockNumberFor<T>,
      error: DispatchError,
    },
    AttributeStaged {
      key: AttributeKey,
      value: AttributeValue,
    },
    AttributeApplied {
      key: AttributeKey,
      old: Option<AttributeValue>,
      new: AttributeValue,
    },
    BlockDisconnected {
      height: BlockNumberFor<T>,
      reverted: u32,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Called before the activation height
    NotYetActivated,
    /// Governance has not enabled the feature
    FeatureNotEnabled,
    /// Amount is zero or above the deposit limit
    AmountOutOfRange,
    /// Owner address does not resolve to an account
    InvalidAddress,
    /// Signer does not own the given address
    NotOwner,
    /// Source token does not exist
    NoSuchLoanToken,
    /// Source token exists but is not a loan token
    NotALoanToken,
    /// The stable token cannot be swapped into itself
    TokenNotAllowed,
    /// Source token is disabled for future swaps
    TokenNotActive,
    /// Destination token does not exist
    DestinationNotFound,
    /// Destination is not the stable token
    DestinationNotAllowed,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
    UnsupportedAttributeVersion,
    UnknownAttribute,
    InvalidAttributeToken,
    InvalidAttributeValue,
    /// Percentage exceeds 100%
    PercentageExceeded,
    AttributeTypeMismatch,
    /// Only the connected tip can be disconnected
    DisconnectOutOfOrder,
    /// Journal for this height is no longer retained
    JournalPruned,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Lock `amount` of a loan token until the next settlement boundary.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(
      origin: OriginFor<T>,
      owner: AccountIdLookupOf<T>,
      amount: u128,
      source: AssetKind,
      destination: AssetKind,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let params = Self::ensure_open()?;
      ensure!(
        !amount.is_zero() && amount <= T::MaxDepositAmount::get(),
        Error::<T>::AmountOutOfRange
      );
      let owner = T::Lookup::lookup(owner).map_err(|_| Error::<T>::InvalidAddress)?;
      ensure!(owner == who, Error::<T>::NotOwner);
      Self::ensure_loan_token(source)?;
      let stable = T::StableAsset::get();
      ensure!(source != stable, Error::<T>::TokenNotAllowed);
      ensure!(params.is_token_enabled(source), Error::<T>::TokenNotActive);
      ensure!(
        Self::token_exists(destination),
        Error::<T>::DestinationNotFound
      );
      ensure!(destination == stable, Error::<T>::DestinationNotAllowed);

      Self::move_tokens(source, &owner, &Self::account_id(), amount)?;

      let accumulated = match FutureSwaps::<T>::get(&owner, source) {
        Some(entry) => entry
          .amount
          .checked_add(amount)
          .ok_or(Error::<T>::ArithmeticOverflow)?,
        None => amount,
      };
      Self::write_entry(
        &owner,
        source,
        Some(FutureSwapEntry {
          amount: accumulated,
          destination,
        }),
      );
      let held = ContractBalances::<T>::get(source)
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      Self::write_contract_balance(source, held);
      let debit =
        SignedTokenAmount::debit(source, amount).ok_or(Error::<T>::ArithmeticOverflow)?;
      Self::push_history(owner.clone(), debit, HistoryTag::Deposit);

      Self::deposit_event(Event::FutureSwapDeposited {
        owner,
        source,
        amount,
        destination,
      });
      Ok(())
    }

    /// Stage typed attribute updates (governance only). They take effect next block.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::set_attributes(updates.len() as u32))]
    pub fn set_attributes(
      origin: OriginFor<T>,
      updates: BoundedVec<(AttributeKey, AttributeValue), T::MaxAttributeUpdates>,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::stage_attributes(updates.into_inner())
    }

    /// Stage string attribute updates such as `v0/params/futureswap/active = true`.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_attributes_raw(updates.len() as u32))]
    pub fn set_attributes_raw(
      origin: OriginFor<T>,
      updates: BoundedVec<(RawAttribute, RawAttribute), T::MaxAttributeUpdates>,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let mut parsed = Vec::with_capacity(updates.len());
      for (raw_key, raw_value) in updates.iter() {
        let key: AttributeKey = core::str::from_utf8(&raw_key[..])
          .map_err(|_| Error::<T>::UnknownAttribute)?
          .parse()
          .map_err(Self::attribute_error)?;
        let value_str =
          core::str::from_utf8(&raw_value[..]).map_err(|_| Error::<T>::InvalidAttributeValue)?;
        let value = key.parse_value(value_str).map_err(Self::attribute_error)?;
        parsed.push((key, value));
      }
      Self::stage_attributes(parsed)
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_initialize(n: BlockNumberFor<T>) -> Weight {
      let mut weight = T::DbWeight::get().reads_writes(2, 1);
      weight = weight.saturating_add(Self::prune_journal(n));
      ConnectedHeight::<T>::put(n);
      weight = weight.saturating_add(Self::apply_staged_attributes());

      let params = Self::governance_parameters();
      if Self::is_settlement_height(n, &params) {
        let pending = FutureSwaps::<T>::iter_keys().count() as u32;
        weight = weight
          .saturating_add(T::DbWeight::get().reads(pending.into()))
          .saturating_add(T::WeightInfo::settle(pending));
      }
      weight
    }

    fn on_finalize(n: BlockNumberFor<T>) {
      let params = Self::governance_parameters();
      if !Self::is_settlement_height(n, &params) {
        return;
      }
      match with_storage_layer(|| Self::settle(n, &params)) {
        Ok(summary) => Self::deposit_event(Event::SettlementCompleted {
          height: n,
          settled: summary.settled,
          deferred: summary.deferred,
        }),
        Err(error) => {
          log::error!(
            target: LOG_TARGET,
            "settlement at block {:?} rolled back: {:?}",
            n,
            error,
          );
          Self::deposit_event(Event::SettlementAborted { height: n, error });
        }
      }
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Typed snapshot of the attributes effective in the current block.
    pub fn governance_parameters() -> GovernanceParameters {
      GovernanceParameters::from_attributes(Attributes::<T>::iter())
    }

    pub fn is_active_at(height: BlockNumberFor<T>) -> bool {
      height >= T::ActivationBlock::get() && Self::governance_parameters().active
    }

    pub fn is_token_enabled(token: AssetKind) -> bool {
      Self::governance_parameters().is_token_enabled(token)
    }

    pub fn reward_band_for(token: AssetKind) -> RewardBand {
      Self::governance_parameters().reward_band(token, T::DefaultPremium::get())
    }

    pub fn is_settlement_height(n: BlockNumberFor<T>, params: &GovernanceParameters) -> bool {
      if n < T::ActivationBlock::get() || !params.active {
        return false;
      }
      match params.period_blocks {
        Some(period) => (n % BlockNumberFor::<T>::from(period)).is_zero(),
        None => false,
      }
    }

    /// Pending deposits of `owner`, ordered by source token.
    pub fn list_future_swaps(owner: &T::AccountId) -> Vec<TokenAmount> {
      let mut entries: Vec<TokenAmount> = FutureSwaps::<T>::iter_prefix(owner)
        .map(|(source, entry)| TokenAmount::new(source, entry.amount))
        .collect();
      entries.sort_by_key(|e| e.asset);
      entries
    }

    /// Like [`Self::list_future_swaps`], for an address that still needs resolving.
    pub fn list_future_swaps_for(
      address: AccountIdLookupOf<T>,
    ) -> Result<Vec<TokenAmount>, DispatchError> {
      let owner = T::Lookup::lookup(address).map_err(|_| Error::<T>::InvalidAddress)?;
      Ok(Self::list_future_swaps(&owner))
    }

    pub fn list_smart_contracts() -> Vec<SmartContractInfo<T::AccountId>> {
      let mut balances: Vec<TokenAmount> = ContractBalances::<T>::iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(asset, amount)| TokenAmount::new(asset, amount))
        .collect();
      balances.sort_by_key(|b| b.asset);
      alloc::vec![SmartContractInfo {
        name: b"FutureSwap".to_vec(),
        call: b"futureswap".to_vec(),
        address: Self::account_id(),
        balances,
      }]
    }

    /// History newest first, optionally filtered by owner and tag.
    pub fn account_history(
      owner: Option<&T::AccountId>,
      tag: Option<HistoryTag>,
      limit: u32,
    ) -> Vec<HistoryRecord<T::AccountId, BlockNumberFor<T>>> {
      (0..AccountHistoryCount::<T>::get())
        .rev()
        .filter_map(|index| AccountHistory::<T>::get(index))
        .filter(|r| owner.map_or(true, |o| &r.owner == o))
        .filter(|r| tag.map_or(true, |t| r.tag == t))
        .take(limit as usize)
        .collect()
    }

    /// Total burned per source token across all settlements.
    pub fn burn_info() -> Vec<TokenAmount> {
      let mut burned: Vec<TokenAmount> = TotalBurned::<T>::iter()
        .map(|(asset, amount)| TokenAmount::new(asset, amount))
        .collect();
      burned.sort_by_key(|b| b.asset);
      burned
    }

    pub fn burn_history(limit: u32) -> Vec<BurnRecord<BlockNumberFor<T>>> {
      (0..BurnHistoryCount::<T>::get())
        .rev()
        .filter_map(|index| BurnHistory::<T>::get(index))
        .take(limit as usize)
        .collect()
    }

    /// Revert every journaled mutation made at height `n`, which must be the connected tip.
    ///
    /// Returns the number of reverted operations.
    pub fn on_block_disconnected(n: BlockNumberFor<T>) -> Result<u32, DispatchError> {
      ensure!(
        ConnectedHeight::<T>::get() == n,
        Error::<T>::DisconnectOutOfOrder
      );
      ensure!(
        n >= JournalRetainedFrom::<T>::get(),
        Error::<T>::JournalPruned
      );
      let reverted = with_storage_layer(|| -> Result<u32, DispatchError> {
        let len = JournalLength::<T>::take(n);
        for index in (0..len).rev() {
          if let Some(op) = UndoLog::<T>::take(n, index) {
            Self::revert(op)?;
          }
        }
        ConnectedHeight::<T>::put(n.saturating_sub(One::one()));
        Ok(len)
      })?;
      log::debug!(
        target: LOG_TARGET,
        "disconnected block {:?}, reverted {} ops",
        n,
        reverted,
      );
      Self::deposit_event(Event::BlockDisconnected {
        height: n,
        reverted,
      });
      Ok(reverted)
    }

    fn ensure_open() -> Result<GovernanceParameters, DispatchError> {
      let now = frame_system::Pallet::<T>::block_number();
      ensure!(
        now >= T::ActivationBlock::get(),
        Error::<T>::NotYetActivated
      );
      let params = Self::governance_parameters();
      ensure!(params.active, Error::<T>::FeatureNotEnabled);
      Ok(params)
    }

    fn token_exists(token: AssetKind) -> bool {
      match token {
        AssetKind::Native => true,
        AssetKind::Local(id) | AssetKind::Foreign(id) => T::Assets::asset_exists(id),
      }
    }

    fn ensure_loan_token(token: AssetKind) -> DispatchResult {
      ensure!(Self::token_exists(token), Error::<T>::NoSuchLoanToken);
      ensure!(token.is_loan(), Error::<T>::NotALoanToken);
      Ok(())
    }

    fn asset_id(asset: AssetKind) -> Result<u32, DispatchError> {
      match asset {
        AssetKind::Local(id) | AssetKind::Foreign(id) => Ok(id),
        AssetKind::Native => Err(Error::<T>::NotALoanToken.into()),
      }
    }

    fn attribute_error(error: AttributeError) -> DispatchError {
      match error {
        AttributeError::UnsupportedVersion => Error::<T>::UnsupportedAttributeVersion,
        AttributeError::UnknownKey => Error::<T>::UnknownAttribute,
        AttributeError::InvalidToken => Error::<T>::InvalidAttributeToken,
        AttributeError::InvalidValue => Error::<T>::InvalidAttributeValue,
        AttributeError::PercentageExceeded => Error::<T>::PercentageExceeded,
        AttributeError::TypeMismatch => Error::<T>::AttributeTypeMismatch,
      }
      .into()
    }

    fn stage_attributes(updates: Vec<(AttributeKey, AttributeValue)>) -> DispatchResult {
      for (key, value) in updates {
        key.validate(&value).map_err(Self::attribute_error)?;
        if let Some(token) = key.token() {
          Self::ensure_loan_token(token)?;
        }
        Self::write_staged(key, Some(value));
        Self::deposit_event(Event::AttributeStaged { key, value });
      }
      Ok(())
    }

    pub(crate) fn apply_staged_attributes() -> Weight {
      let mut staged: Vec<_> = PendingAttributes::<T>::iter().collect();
      if staged.is_empty() {
        return T::DbWeight::get().reads(1);
      }
      staged.sort_by_key(|(key, _)| *key);
      let count = staged.len() as u32;
      for (key, value) in staged {
        Self::write_staged(key, None);
        let old = Attributes::<T>::get(key);
        Self::write_attribute(key, Some(value));
        log::debug!(target: LOG_TARGET, "attribute {} = {:?}", key, value);
        Self::deposit_event(Event::AttributeApplied {
          key,
          old,
          new: value,
        });
      }
      T::WeightInfo::apply_staged_attributes(count)
    }

    fn prune_journal(n: BlockNumberFor<T>) -> Weight {
      let depth = BlockNumberFor::<T>::from(T::UndoDepth::get());
      if n <= depth {
        return Weight::zero();
      }
      let expired = n.saturating_sub(depth);
      let len = JournalLength::<T>::take(expired);
      if len > 0 {
        let _ = UndoLog::<T>::clear_prefix(expired, len, None);
      }
      // Never lowered: a reconnect must not re-expose heights whose journals are gone
      JournalRetainedFrom::<T>::mutate(|retained| {
        *retained = (*retained).max(expired.saturating_add(One::one()))
      });
      T::DbWeight::get().reads_writes(1, u64::from(len).saturating_add(2))
    }

    /// Settle every pending entry in ascending (owner, source) order.
    pub(crate) fn settle(
      n: BlockNumberFor<T>,
      params: &GovernanceParameters,
    ) -> Result<SettlementSummary, DispatchError> {
      let mut entries: Vec<_> = FutureSwaps::<T>::iter().collect();
      entries.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));

      let holding = Self::account_id();
      let mut burned: BTreeMap<AssetKind, u128> = BTreeMap::new();
      let mut summary = SettlementSummary::default();

      for (owner, source, entry) in entries {
        match Self::settle_entry(n, params, &holding, &owner, source, entry)? {
          EntryOutcome::Settled { .. } => {
            let total = burned.entry(source).or_default();
            *total = total.saturating_add(entry.amount);
            summary.settled = summary.settled.saturating_add(1);
          }
          EntryOutcome::Deferred(reason) => {
            Self::deposit_event(Event::FutureSwapDeferred {
              owner,
              source,
              amount: entry.amount,
              reason,
            });
            summary.deferred = summary.deferred.saturating_add(1);
          }
        }
      }

      for (asset, amount) in burned {
        Self::add_total_burned(asset, amount)?;
        Self::push_burn_record(BurnRecord {
          asset,
          amount,
          block: n,
          reason: BurnReason::SmartContract,
        });
      }
      Ok(summary)
    }

    fn settle_entry(
      n: BlockNumberFor<T>,
      params: &GovernanceParameters,
      holding: &T::AccountId,
      owner: &T::AccountId,
      source: AssetKind,
      entry: FutureSwapEntry,
    ) -> Result<EntryOutcome, DispatchError> {
      if !params.is_token_enabled(source) {
        return Ok(EntryOutcome::Deferred(DeferReason::TokenDisabled));
      }
      let Some(price) = T::PriceOracle::get_oracle_price(source, entry.destination) else {
        log::debug!(
          target: LOG_TARGET,
          "no price for {} -> {} at block {:?}, deferring",
          source,
          entry.destination,
          n,
        );
        return Ok(EntryOutcome::Deferred(DeferReason::PriceUnavailable));
      };

      let gross = Self::gross_output(entry.amount, price)?;
      let credited = params
        .reward_band(source, T::DefaultPremium::get())
        .apply(gross)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let debit =
        SignedTokenAmount::debit(source, entry.amount).ok_or(Error::<T>::ArithmeticOverflow)?;
      let credit = SignedTokenAmount::credit(entry.destination, credited)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      Self::burn_tokens(source, holding, entry.amount)?;
      Self::write_contract_balance(
        source,
        ContractBalances::<T>::get(source).saturating_sub(entry.amount),
      );
      Self::mint_tokens(entry.destination, owner, credited)?;
      Self::add_total_minted(entry.destination, credited)?;
      Self::write_entry(owner, source, None);
      Self::push_history(owner.clone(), debit, HistoryTag::SettlementDebit);
      Self::push_history(owner.clone(), credit, HistoryTag::SettlementCredit);

      Self::deposit_event(Event::FutureSwapSettled {
        owner: owner.clone(),
        source,
        amount: entry.amount,
        destination: entry.destination,
        credited,
      });
      Ok(EntryOutcome::Settled { credited })
    }

    fn gross_output(amount: u128, price: u128) -> Result<u128, DispatchError> {
      let gross = U256::from(amount)
        .saturating_mul(U256::from(price))
        .checked_div(U256::from(T::Precision::get()))
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      if gross > U256::from(u128::MAX) {
        return Err(Error::<T>::ArithmeticOverflow.into());
      }
      Ok(gross.as_u128())
    }

    // Journaled writes record their inverse in the current block's journal.
    // `revert` applies inverses directly and never journals.

    fn journal(op: JournalOp<T::AccountId>) {
      let now = frame_system::Pallet::<T>::block_number();
      let index = JournalLength::<T>::get(now);
      UndoLog::<T>::insert(now, index, op);
      JournalLength::<T>::insert(now, index.saturating_add(1));
    }

    fn write_entry(owner: &T::AccountId, source: AssetKind, entry: Option<FutureSwapEntry>) {
      let previous = FutureSwaps::<T>::get(owner, source);
      Self::journal(JournalOp::Ledger {
        owner: owner.clone(),
        source,
        previous,
      });
      Self::put_entry(owner, source, entry);
    }

    fn write_contract_balance(asset: AssetKind, amount: u128) {
      let previous = ContractBalances::<T>::get(asset);
      Self::journal(JournalOp::ContractBalance { asset, previous });
      ContractBalances::<T>::mutate_exists(asset, |v| *v = Self::nonzero(amount));
    }

    fn move_tokens(
      asset: AssetKind,
      from: &T::AccountId,
      to: &T::AccountId,
      amount: u128,
    ) -> DispatchResult {
      let id = Self::asset_id(asset)?;
      T::Assets::transfer(id, from, to, amount, Preservation::Expendable)?;
      Self::journal(JournalOp::Transfer {
        asset,
        from: from.clone(),
        to: to.clone(),
        amount,
      });
      Ok(())
    }

    fn mint_tokens(asset: AssetKind, who: &T::AccountId, amount: u128) -> DispatchResult {
      if amount.is_zero() {
        return Ok(());
      }
      let id = Self::asset_id(asset)?;
      T::Assets::mint_into(id, who, amount)?;
      Self::journal(JournalOp::Mint {
        asset,
        who: who.clone(),
        amount,
      });
      Ok(())
    }

    fn burn_tokens(asset: AssetKind, who: &T::AccountId, amount: u128) -> DispatchResult {
      let id = Self::asset_id(asset)?;
      T::Assets::burn_from(
        id,
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Force,
      )?;
      Self::journal(JournalOp::Burn {
        asset,
        who: who.clone(),
        amount,
      });
      Ok(())
    }

    fn add_total_burned(asset: AssetKind, amount: u128) -> DispatchResult {
      let previous = TotalBurned::<T>::get(asset);
      let total = previous
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      Self::journal(JournalOp::TotalBurned { asset, previous });
      TotalBurned::<T>::insert(asset, total);
      Ok(())
    }

    fn add_total_minted(asset: AssetKind, amount: u128) -> DispatchResult {
      let previous = TotalMinted::<T>::get(asset);
      let total = previous
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      Self::journal(JournalOp::TotalMinted { asset, previous });
      TotalMinted::<T>::insert(asset, total);
      Ok(())
    }

    fn push_history(owner: T::AccountId, amount: SignedTokenAmount, tag: HistoryTag) {
      let index = AccountHistoryCount::<T>::get();
      AccountHistory::<T>::insert(
        index,
        HistoryRecord {
          owner,
          block: frame_system::Pallet::<T>::block_number(),
          amount,
          tag,
        },
      );
      AccountHistoryCount::<T>::put(index.saturating_add(1));
      Self::journal(JournalOp::HistoryAppended { index });
    }

    fn push_burn_record(record: BurnRecord<BlockNumberFor<T>>) {
      let index = BurnHistoryCount::<T>::get();
      BurnHistory::<T>::insert(index, record);
      BurnHistoryCount::<T>::put(index.saturating_add(1));
      Self::journal(JournalOp::BurnRecordAppended { index });
    }

    fn write_attribute(key: AttributeKey, value: Option<AttributeValue>) {
      let previous = Attributes::<T>::get(key);
      Self::journal(JournalOp::Attribute { key, previous });
      Attributes::<T>::set(key, value);
    }

    fn write_staged(key: AttributeKey, value: Option<AttributeValue>) {
      let previous = PendingAttributes::<T>::get(key);
      Self::journal(JournalOp::Staged { key, previous });
      PendingAttributes::<T>::set(key, value);
    }

    fn put_entry(owner: &T::AccountId, source: AssetKind, entry: Option<FutureSwapEntry>) {
      match entry {
        Some(entry) => FutureSwaps::<T>::insert(owner, source, entry),
        None => FutureSwaps::<T>::remove(owner, source),
      }
    }

    fn nonzero(amount: u128) -> Option<u128> {
      (!amount.is_zero()).then_some(amount)
    }

    fn revert(op: JournalOp<T::AccountId>) -> DispatchResult {
      match op {
        JournalOp::Ledger {
          owner,
          source,
          previous,
        } => Self::put_entry(&owner, source, previous),
        JournalOp::ContractBalance { asset, previous } => {
          ContractBalances::<T>::mutate_exists(asset, |v| *v = Self::nonzero(previous))
        }
        JournalOp::Transfer {
          asset,
          from,
          to,
          amount,
        } => {
          let id = Self::asset_id(asset)?;
          T::Assets::transfer(id, &to, &from, amount, Preservation::Expendable)?;
        }
        JournalOp::Mint { asset, who, amount } => {
          let id = Self::asset_id(asset)?;
          T::Assets::burn_from(
            id,
            &who,
            amount,
            Preservation::Expendable,
            Precision::Exact,
            Fortitude::Force,
          )?;
        }
        JournalOp::Burn { asset, who, amount } => {
          let id = Self::asset_id(asset)?;
          T::Assets::mint_into(id, &who, amount)?;
        }
        JournalOp::TotalBurned { asset, previous } => {
          TotalBurned::<T>::mutate_exists(asset, |v| *v = Self::nonzero(previous))
        }
        JournalOp::TotalMinted { asset, previous } => {
          TotalMinted::<T>::mutate_exists(asset, |v| *v = Self::nonzero(previous))
        }
        JournalOp::HistoryAppended { index } => {
          AccountHistory::<T>::remove(index);
          AccountHistoryCount::<T>::put(index);
        }
        JournalOp::BurnRecordAppended { index } => {
          BurnHistory::<T>::remove(index);
          BurnHistoryCount::<T>::put(index);
        }
        JournalOp::Attribute { key, previous } => Attributes::<T>::set(key, previous),
        JournalOp::Staged { key, previous } => PendingAttributes::<T>::set(key, previous),
      }
      Ok(())
    }
  }

  /// Genesis configuration: the holding account is ED-free
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
