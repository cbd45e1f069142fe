//! Instruction definitions for the Forecast Market Program

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::state::{Outcome, ResolutionConfig};

/// All instructions supported by the Forecast Market Program
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum ForecastMarketInstruction {
    // =========================================================================
    // Initialization
    // =========================================================================
    /// Initialize the global config
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Config PDA
    /// 2. `[]` USDC Mint
    /// 3. `[]` System Program
    Initialize(InitializeArgs),

    // =========================================================================
    // Market Lifecycle
    // =========================================================================
    /// Create a new forecast market and seed its pot
    ///
    /// The market id is derived from the resolution config and timing, so
    /// creating the same market twice fails on the existing PDA. For
    /// price-resolved markets the feed account must be supplied and
    /// readable, otherwise creation is rejected up front.
    ///
    /// Accounts:
    /// 0. `[signer]` Creator
    /// 1. `[writable]` Config
    /// 2. `[writable]` Market PDA
    /// 3. `[writable]` ForecastBook PDA
    /// 4. `[writable]` Market Vault PDA
    /// 5. `[writable]` Creator's USDC Account (seed source)
    /// 6. `[]` USDC Mint
    /// 7. `[]` Token Program
    /// 8. `[]` System Program
    /// 9. `[]` Rent Sysvar
    /// 10. `[]` Price Feed (price-resolved markets only)
    CreateMarket(CreateMarketArgs),

    /// Submit a probability estimate and pay the entry fee
    ///
    /// The fee splits into a platform cut (routed to the treasury's
    /// associated token account) and a pot contribution.
    ///
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[]` Config
    /// 2. `[writable]` Market
    /// 3. `[writable]` ForecastBook
    /// 4. `[writable]` Prediction PDA
    /// 5. `[writable]` Participant's USDC Account (fee source)
    /// 6. `[writable]` Market Vault
    /// 7. `[writable]` Treasury USDC Account (associated token account)
    /// 8. `[]` Token Program
    /// 9. `[]` System Program
    Predict(PredictArgs),

    /// Fix the market outcome and freeze the score total
    ///
    /// Manual markets: admin only, outcome supplied in the args.
    /// Price-resolved markets: permissionless, outcome read from the
    /// pinned feed, args outcome must be absent.
    ///
    /// Accounts:
    /// 0. `[signer]` Resolver (admin for manual markets, anyone otherwise)
    /// 1. `[]` Config
    /// 2. `[writable]` Market
    /// 3. `[]` ForecastBook
    /// 4. `[]` Price Feed (price-resolved markets only)
    ResolveMarket(ResolveMarketArgs),

    /// Claim the caller's pro-rata share of a resolved market's pot
    ///
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[]` Config
    /// 2. `[writable]` Market
    /// 3. `[writable]` Prediction PDA
    /// 4. `[writable]` Market Vault
    /// 5. `[writable]` Participant's USDC Account (payout destination)
    /// 6. `[]` Token Program
    ClaimPayout(ClaimPayoutArgs),

    /// Cancel a never-predicted-on market and refund the seed (Admin only)
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[]` Config
    /// 2. `[writable]` Market
    /// 3. `[writable]` Market Vault
    /// 4. `[writable]` Creator's USDC Account (refund destination)
    /// 5. `[]` Token Program
    CancelMarket(CancelMarketArgs),

    // =========================================================================
    // Admin Operations
    // =========================================================================
    /// Rotate the program admin
    ///
    /// Accounts:
    /// 0. `[signer]` Current Admin
    /// 1. `[writable]` Config
    UpdateAdmin(UpdateAdminArgs),

    /// Change the platform-fee destination wallet
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Config
    SetTreasury(SetTreasuryArgs),

    /// Change the platform fee (bounded)
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Config
    SetPlatformFee(SetPlatformFeeArgs),

    /// Change the fixed entry fee
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Config
    SetEntryFee(SetEntryFeeArgs),

    /// Pause or unpause market creation and predictions
    ///
    /// Accounts:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Config
    SetPaused(SetPausedArgs),
}

// ============================================================================
// Argument Structs
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct InitializeArgs {
    /// Platform-fee destination wallet
    pub treasury: Pubkey,
    /// Fixed entry fee per prediction (token base units)
    pub entry_fee: u64,
    /// Platform cut of each entry fee, in basis points
    pub platform_fee_bps: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CreateMarketArgs {
    /// Outcome determination strategy
    pub resolution: ResolutionConfig,
    /// No predictions accepted at or after this time
    pub close_time: i64,
    /// Earliest instant resolution becomes legal
    pub settlement_time: i64,
    /// Initial pot funding, transferred from the creator
    pub seed_amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PredictArgs {
    /// Market id
    pub market_id: [u8; 32],
    /// Probability estimate in [1, 99]
    pub estimate: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ResolveMarketArgs {
    /// Market id
    pub market_id: [u8; 32],
    /// Attested outcome; required for manual markets, rejected otherwise
    pub outcome: Option<Outcome>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ClaimPayoutArgs {
    /// Market id
    pub market_id: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CancelMarketArgs {
    /// Market id
    pub market_id: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct UpdateAdminArgs {
    /// New administrator
    pub new_admin: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SetTreasuryArgs {
    /// New platform-fee destination wallet
    pub treasury: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SetPlatformFeeArgs {
    /// New platform fee in basis points
    pub platform_fee_bps: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SetEntryFeeArgs {
    /// New entry fee (token base units)
    pub entry_fee: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SetPausedArgs {
    /// Desired paused state
    pub paused: bool,
}
