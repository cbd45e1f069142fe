//! Error types for the Forecast Market Program

use num_derive::FromPrimitive;
use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

/// Errors that may be returned by the Forecast Market Program
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum ForecastMarketError {
    // === General Errors (0-99) ===
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Invalid account data")]
    InvalidAccountData = 1,

    #[error("Account not initialized")]
    AccountNotInitialized = 2,

    #[error("Already initialized")]
    AlreadyInitialized = 3,

    #[error("Invalid signer")]
    InvalidSigner = 4,

    #[error("Unauthorized")]
    Unauthorized = 5,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 6,

    #[error("Invalid PDA")]
    InvalidPDA = 7,

    #[error("Invalid amount")]
    InvalidAmount = 8,

    #[error("Invalid USDC mint")]
    InvalidUsdcMint = 9,

    #[error("Program is paused")]
    ProgramPaused = 10,

    // === Market Errors (100-199) ===
    #[error("Market not found")]
    MarketNotFound = 100,

    #[error("Market already exists")]
    MarketAlreadyExists = 101,

    #[error("Close time must be in the future and at or before settlement time")]
    InvalidCloseTime = 102,

    #[error("Settlement time must be in the future")]
    InvalidSettlementTime = 103,

    #[error("Market is closed to new predictions")]
    MarketClosed = 104,

    #[error("Market already resolved")]
    MarketAlreadyResolved = 105,

    #[error("Market not resolved")]
    MarketNotResolved = 106,

    #[error("Settlement time not reached")]
    SettlementTimeNotReached = 107,

    #[error("Market cancelled")]
    MarketCancelled = 108,

    #[error("Market has predictions and cannot be cancelled")]
    MarketNotCancellable = 109,

    // === Prediction Errors (200-299) ===
    #[error("Probability estimate out of range")]
    EstimateOutOfRange = 200,

    #[error("Participant already has a prediction on this market")]
    DuplicatePrediction = 201,

    #[error("Prediction not found")]
    PredictionNotFound = 202,

    #[error("Market participant limit reached")]
    MarketFull = 203,

    // === Resolution Errors (300-399) ===
    #[error("Price feed unavailable")]
    FeedUnavailable = 300,

    #[error("Price feed reading is stale")]
    StaleFeed = 301,

    #[error("Outcome argument does not match resolution mode")]
    OutcomeArgumentMismatch = 302,

    #[error("Feed account does not match the market")]
    FeedMismatch = 303,

    // === Claim Errors (400-499) ===
    #[error("Payout already claimed")]
    AlreadyClaimed = 400,

    #[error("Nothing to claim")]
    NothingToClaim = 401,

    // === Token / Fee Errors (500-599) ===
    #[error("Invalid token account")]
    InvalidTokenAccount = 500,

    #[error("Invalid market vault")]
    InvalidMarketVault = 501,

    #[error("Invalid treasury fee account")]
    InvalidTreasuryAccount = 502,

    #[error("Platform fee exceeds maximum")]
    PlatformFeeTooHigh = 503,
}

impl From<ForecastMarketError> for ProgramError {
    fn from(e: ForecastMarketError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for ForecastMarketError {
    fn type_of() -> &'static str {
        "ForecastMarketError"
    }
}
