//! Price feed integration for threshold-resolved markets
//!
//! Readings come from a Pyth price account pinned into the market at
//! creation. A reading is usable only when it is fresh and strictly
//! positive; anything else surfaces as a retryable failure so a resolver
//! can come back once the feed recovers.
//!
//! Feed values and target values rarely share a decimal precision, so
//! comparisons first rescale whichever side is coarser up to the finer
//! exponent. Scaling is applied identically to both sides, which keeps the
//! comparison result independent of argument order.

use borsh::{BorshDeserialize, BorshSerialize};
use pyth_sdk_solana::state::SolanaPriceAccount;
use solana_program::{account_info::AccountInfo, msg, program_error::ProgramError};

use crate::error::ForecastMarketError;
use crate::state::{Direction, MAX_FEED_AGE_SECS};

/// One observation from a price feed
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReading {
    /// Observed value, scaled by 10^expo
    pub value: i64,
    /// Decimal exponent (Pyth convention, typically negative)
    pub expo: i32,
    /// Observation timestamp
    pub publish_time: i64,
}

impl FeedReading {
    pub const SIZE: usize = 8 + 4 + 8; // value + expo + publish_time
}

/// Read the current observation from a price feed account.
///
/// Fails with `StaleFeed` when no reading newer than `MAX_FEED_AGE_SECS`
/// exists, and with `FeedUnavailable` when the account is not a readable
/// feed or reports a non-positive value.
pub fn read_feed(
    feed_info: &AccountInfo,
    current_time: i64,
) -> Result<FeedReading, ProgramError> {
    let price_feed = SolanaPriceAccount::account_info_to_feed(feed_info).map_err(|_| {
        msg!("Error: account {} is not a readable price feed", feed_info.key);
        ForecastMarketError::FeedUnavailable
    })?;

    let price = price_feed
        .get_price_no_older_than(current_time, MAX_FEED_AGE_SECS)
        .ok_or_else(|| {
            msg!("Error: price feed {} has no fresh reading", feed_info.key);
            ForecastMarketError::StaleFeed
        })?;

    if price.price <= 0 {
        msg!(
            "Error: price feed {} reports non-positive value {}",
            feed_info.key,
            price.price
        );
        return Err(ForecastMarketError::FeedUnavailable.into());
    }

    Ok(FeedReading {
        value: price.price,
        expo: price.expo,
        publish_time: price.publish_time,
    })
}

/// Rescale two values to their finer common exponent.
///
/// The side with fewer decimal places (the larger exponent) is multiplied
/// up; the other side passes through. Both orderings of the arguments
/// produce the same pair, so a comparison of the results is symmetric.
pub fn normalize_pair(
    a_value: i64,
    a_expo: i32,
    b_value: i64,
    b_expo: i32,
) -> Result<(i128, i128), ProgramError> {
    let common_expo = a_expo.min(b_expo);
    Ok((
        rescale(a_value, a_expo, common_expo)?,
        rescale(b_value, b_expo, common_expo)?,
    ))
}

/// Rescale `value` from `expo` down to `target_expo` (target_expo <= expo).
fn rescale(value: i64, expo: i32, target_expo: i32) -> Result<i128, ProgramError> {
    let shift = expo
        .checked_sub(target_expo)
        .ok_or(ForecastMarketError::ArithmeticOverflow)? as u32;
    let factor = 10i128
        .checked_pow(shift)
        .ok_or(ForecastMarketError::ArithmeticOverflow)?;
    (value as i128)
        .checked_mul(factor)
        .ok_or_else(|| ForecastMarketError::ArithmeticOverflow.into())
}

/// Compare a feed reading against a market's target.
///
/// `Above`: outcome is Yes when the normalized reading is at or above the
/// normalized target. `Below`: Yes when strictly below.
pub fn threshold_met(
    reading: &FeedReading,
    target_value: i64,
    target_decimals: u8,
    direction: Direction,
) -> Result<bool, ProgramError> {
    let target_expo = -(target_decimals as i32);
    let (feed, target) = normalize_pair(reading.value, reading.expo, target_value, target_expo)?;
    Ok(match direction {
        Direction::Above => feed >= target,
        Direction::Below => feed < target,
    })
}

// ============================================================================
// Tests
// ============================================================================
