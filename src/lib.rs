//! Pari-Mutuel Forecast Market Program
//!
//! Settlement engine for calibration-weighted prediction markets on Solana.
//!
//! ## Architecture
//!
//! Participants submit probability estimates (1%-99%) on a yes/no question.
//! Every entry fee grows a shared pot. Once the market's settlement time
//! passes, the outcome is fixed either by administrator attestation or by a
//! permissionless comparison against a Pyth price feed, and each participant
//! can claim a share of the pot proportional to their calibration score
//! (their estimate restated in the winning direction).
//!
//! ## Key Features
//!
//! - Deterministic market ids (duplicate creation fails)
//! - Fixed entry fee with a platform cut routed to the treasury
//! - Two interchangeable resolution strategies behind one instruction:
//!   manual attestation and trustless price-threshold reading
//! - Exact integer pro-rata payouts; division dust stays in the vault
//! - One prediction and one claim per (market, participant), enforced
//!   by PDA existence and a persisted `claimed` flag

pub mod error;
pub mod instruction;
pub mod oracle;
pub mod processor;
pub mod state;
pub mod utils;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

// Re-export commonly used items
pub use error::ForecastMarketError;
pub use instruction::ForecastMarketInstruction;
pub use state::*;

solana_program::declare_id!("PariMut111111111111111111111111111111111111");
