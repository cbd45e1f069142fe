//! Utility functions for the Forecast Market Program

use borsh::BorshDeserialize;
use solana_program::{
    account_info::AccountInfo,
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::error::ForecastMarketError;
use crate::state::{MAX_ESTIMATE, MIN_ESTIMATE};

/// Safely deserialize account data using BorshDeserialize::deserialize
/// This does NOT require the slice to be fully consumed, which is important
/// when the account has padding bytes at the end.
pub fn deserialize_account<T: BorshDeserialize>(data: &[u8]) -> Result<T, ProgramError> {
    T::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)
}

/// Check if a signer is authorized
pub fn check_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        return Err(ForecastMarketError::InvalidSigner.into());
    }
    Ok(())
}

/// Verify PDA derivation
pub fn verify_pda(
    expected: &Pubkey,
    program_id: &Pubkey,
    seeds: &[&[u8]],
) -> Result<u8, ProgramError> {
    let (pda, bump) = Pubkey::find_program_address(seeds, program_id);
    if pda != *expected {
        msg!("PDA mismatch: expected {}, got {}", expected, pda);
        return Err(ForecastMarketError::InvalidPDA.into());
    }
    Ok(bump)
}

/// Get current timestamp from Clock sysvar
pub fn get_current_timestamp() -> Result<i64, ProgramError> {
    let clock = Clock::get()?;
    Ok(clock.unix_timestamp)
}

/// Create a PDA account
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    pda: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let lamports = rent.minimum_balance(space);

    invoke_signed(
        &system_instruction::create_account(payer.key, pda.key, lamports, space as u64, owner),
        &[payer.clone(), pda.clone(), system_program.clone()],
        &[seeds],
    )?;

    Ok(())
}

/// Safe addition for u64
pub fn safe_add_u64(a: u64, b: u64) -> Result<u64, ProgramError> {
    a.checked_add(b)
        .ok_or_else(|| ForecastMarketError::ArithmeticOverflow.into())
}

/// Safe subtraction for u64
pub fn safe_sub_u64(a: u64, b: u64) -> Result<u64, ProgramError> {
    a.checked_sub(b)
        .ok_or_else(|| ForecastMarketError::ArithmeticOverflow.into())
}

/// Calculate fee amount from total and basis points
pub fn calculate_fee(amount: u64, fee_bps: u16) -> u64 {
    ((amount as u128) * (fee_bps as u128) / 10000) as u64
}

/// Calculate amount after fee deduction
pub fn amount_after_fee(amount: u64, fee_bps: u16) -> u64 {
    amount.saturating_sub(calculate_fee(amount, fee_bps))
}

/// Validate a probability estimate is within [1, 99]
pub fn validate_estimate(estimate: u8) -> ProgramResult {
    if !(MIN_ESTIMATE..=MAX_ESTIMATE).contains(&estimate) {
        msg!(
            "Invalid estimate: {} (min: {}, max: {})",
            estimate,
            MIN_ESTIMATE,
            MAX_ESTIMATE
        );
        return Err(ForecastMarketError::EstimateOutOfRange.into());
    }
    Ok(())
}
