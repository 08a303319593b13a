//! Ecosystem Constants for the Future Swap engine
//!
//! Pallet identifiers and economic parameters shared by the pallet and every runtime that
//! configures it.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// Future Swap holding account: custody of deposited loan tokens until settlement
  pub const FUTURE_SWAP_PALLET_ID: &[u8; 8] = b"futswap0";
}

/// Ecosystem parameters defining mathematical constants and thresholds.
pub mod params {
  use super::Balance;
  use crate::amounts::COIN;
  use sp_arithmetic::Permill;

  /// Oracle price precision: a price of `PRECISION` means one source unit buys one
  /// destination unit.
  pub const PRECISION: Balance = COIN;

  /// Premium charged against the depositor when no reward is configured (5%).
  pub const FUTURE_SWAP_DEFAULT_PREMIUM: Permill = Permill::from_percent(5);

  /// Largest amount accepted by a single deposit (1.2 billion tokens).
  pub const FUTURE_SWAP_MAX_DEPOSIT: Balance = 1_200_000_000 * COIN;

  /// Number of recent blocks whose undo journals are retained for disconnects.
  pub const FUTURE_SWAP_UNDO_DEPTH: u32 = 100;

  /// Upper bound on attribute updates accepted by a single governance call.
  pub const FUTURE_SWAP_MAX_ATTRIBUTE_UPDATES: u32 = 32;
}
