//! State definitions for the Forecast Market Program
//!
//! All account structures used by the program.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::hash::hash;
use solana_program::pubkey::Pubkey;

use crate::oracle::FeedReading;

// ============================================================================
// Discriminators
// ============================================================================

pub const CONFIG_DISCRIMINATOR: u64 = 0x464D5F434F4E4649; // "FM_CONFI"
pub const MARKET_DISCRIMINATOR: u64 = 0x4D41524B45545F5F; // "MARKET__"
pub const BOOK_DISCRIMINATOR: u64 = 0x424F4F4B5F5F5F5F; // "BOOK____"
pub const PREDICTION_DISCRIMINATOR: u64 = 0x505245444943545F; // "PREDICT_"

// ============================================================================
// PDA Seeds
// ============================================================================

pub const CONFIG_SEED: &[u8] = b"config";
pub const MARKET_SEED: &[u8] = b"market";
pub const BOOK_SEED: &[u8] = b"book";
pub const PREDICTION_SEED: &[u8] = b"prediction";
pub const MARKET_VAULT_SEED: &[u8] = b"market_vault";

// ============================================================================
// Constants
// ============================================================================

/// Lowest accepted probability estimate (1%)
pub const MIN_ESTIMATE: u8 = 1;

/// Highest accepted probability estimate (99%)
pub const MAX_ESTIMATE: u8 = 99;

/// Scores are estimates restated against a 100% basis
pub const SCORE_BASIS: u64 = 100;

/// Maximum participants per market
///
/// Resolution sums every participant's score inside one transaction, so the
/// book is capped rather than unbounded.
pub const MAX_PARTICIPANTS: usize = 64;

/// Maximum platform fee (10%)
pub const MAX_PLATFORM_FEE_BPS: u16 = 1_000;

/// Feed readings older than this are treated as unavailable (seconds)
pub const MAX_FEED_AGE_SECS: u64 = 300;

// ============================================================================
// Enums
// ============================================================================

/// Market lifecycle status
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    /// Accepting predictions until close time
    Open = 0,
    /// Outcome fixed, payouts claimable
    Resolved = 1,
    /// Cancelled before any prediction, seed refunded
    Cancelled = 2,
}

impl Default for MarketStatus {
    fn default() -> Self {
        MarketStatus::Open
    }
}

/// Market outcome
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Yes = 0,
    No = 1,
}

/// Threshold comparison direction for price-resolved markets
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Outcome is Yes when the feed reads at or above the target
    Above = 0,
    /// Outcome is Yes when the feed reads below the target
    Below = 1,
}

/// How a market's outcome gets determined
///
/// Both variants share the same settlement step; only the source of the
/// boolean outcome differs.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionConfig {
    /// Administrator attests the outcome directly
    Manual {
        /// SHA256 of the outcome question text
        question_hash: [u8; 32],
    },
    /// Anyone resolves by reading the pinned price feed
    PriceThreshold {
        /// Price feed account this market settles against
        feed: Pubkey,
        /// Target value, scaled by 10^target_decimals
        target_value: i64,
        /// Decimal places of target_value
        target_decimals: u8,
        /// Comparison applied to the normalized reading
        direction: Direction,
    },
}

impl ResolutionConfig {
    /// Serialized worst case: 1 tag + 32 feed + 8 target + 1 decimals + 1 direction
    pub const MAX_SIZE: usize = 1 + 32 + 8 + 1 + 1;

    /// The pinned feed account, when price-resolved
    pub fn feed(&self) -> Option<&Pubkey> {
        match self {
            ResolutionConfig::Manual { .. } => None,
            ResolutionConfig::PriceThreshold { feed, .. } => Some(feed),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// A participant's calibration score: the estimate restated in the winning
/// direction. A 70% yes-estimate scores 70 when the outcome is Yes and 30
/// when it is No.
pub fn calibration_score(estimate: u8, outcome: Outcome) -> u64 {
    match outcome {
        Outcome::Yes => estimate as u64,
        Outcome::No => SCORE_BASIS - estimate as u64,
    }
}

/// Pro-rata pot share, truncated. Returns 0 when total_score is 0 so a
/// never-predicted-on market can never divide by zero.
pub fn payout_share(score: u64, pot_amount: u64, total_score: u64) -> u64 {
    if total_score == 0 {
        return 0;
    }
    ((score as u128) * (pot_amount as u128) / (total_score as u128)) as u64
}

// ============================================================================
// Account Structures
// ============================================================================

/// Global configuration for the Forecast Market Program
///
/// PDA Seeds: ["config"]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Config {
    /// Account discriminator
    pub discriminator: u64,

    /// Program administrator (rotatable)
    pub admin: Pubkey,

    /// Settlement currency mint (USDC)
    pub usdc_mint: Pubkey,

    /// Wallet whose associated token account collects platform fees
    pub treasury: Pubkey,

    /// Fixed fee charged per prediction (token base units)
    pub entry_fee: u64,

    /// Platform cut of each entry fee, in basis points
    pub platform_fee_bps: u16,

    /// Total markets created
    pub market_count: u64,

    /// Blocks market creation and predictions; never resolution or claims
    pub is_paused: bool,

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Config {
    pub const SIZE: usize = 8   // discriminator
        + 32  // admin
        + 32  // usdc_mint
        + 32  // treasury
        + 8   // entry_fee
        + 2   // platform_fee_bps
        + 8   // market_count
        + 1   // is_paused
        + 1   // bump
        + 32; // reserved

    /// PDA seeds
    pub fn seeds() -> Vec<Vec<u8>> {
        vec![CONFIG_SEED.to_vec()]
    }

    pub fn new(
        admin: Pubkey,
        usdc_mint: Pubkey,
        treasury: Pubkey,
        entry_fee: u64,
        platform_fee_bps: u16,
        bump: u8,
    ) -> Self {
        Self {
            discriminator: CONFIG_DISCRIMINATOR,
            admin,
            usdc_mint,
            treasury,
            entry_fee,
            platform_fee_bps,
            market_count: 0,
            is_paused: false,
            bump,
            reserved: [0u8; 32],
        }
    }
}

/// A single forecast market
///
/// PDA Seeds: ["market", market_id]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Market {
    /// Account discriminator
    pub discriminator: u64,

    /// Market id, derived from the defining parameters
    pub market_id: [u8; 32],

    /// Market creator (receives the seed back on cancellation)
    pub creator: Pubkey,

    /// Outcome determination strategy
    pub resolution: ResolutionConfig,

    /// Market USDC vault (token account owned by this market PDA)
    pub vault: Pubkey,

    /// The market's forecast book PDA
    pub book: Pubkey,

    /// No predictions accepted at or after this time
    pub close_time: i64,

    /// Earliest instant resolution becomes legal
    pub settlement_time: i64,

    /// Current lifecycle status
    pub status: MarketStatus,

    /// Outcome, set exactly once at resolution
    pub outcome: Option<Outcome>,

    /// Sum of all calibration scores, fixed at resolution
    pub total_score: u64,

    /// Raw feed reading locked in by the resolver (price-resolved markets)
    pub resolution_reading: Option<FeedReading>,

    /// Seed plus net entry fees; the payout denominator base
    pub pot_amount: u64,

    /// Total paid out so far
    pub total_claimed: u64,

    /// Number of recorded predictions
    pub prediction_count: u32,

    /// Creation timestamp
    pub created_at: i64,

    /// Resolution timestamp (0 until resolved)
    pub resolved_at: i64,

    /// PDA bump
    pub bump: u8,

    /// Vault PDA bump
    pub vault_bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Market {
    pub const SIZE: usize = 8   // discriminator
        + 32  // market_id
        + 32  // creator
        + ResolutionConfig::MAX_SIZE // resolution
        + 32  // vault
        + 32  // book
        + 8   // close_time
        + 8   // settlement_time
        + 1   // status
        + 1 + 1 // outcome (Option<Outcome>)
        + 8   // total_score
        + 1 + FeedReading::SIZE // resolution_reading (Option<FeedReading>)
        + 8   // pot_amount
        + 8   // total_claimed
        + 4   // prediction_count
        + 8   // created_at
        + 8   // resolved_at
        + 1   // bump
        + 1   // vault_bump
        + 32; // reserved

    /// PDA seeds
    pub fn seeds(market_id: &[u8; 32]) -> Vec<Vec<u8>> {
        vec![MARKET_SEED.to_vec(), market_id.to_vec()]
    }

    /// Vault PDA seeds
    pub fn vault_seeds(market_id: &[u8; 32]) -> Vec<Vec<u8>> {
        vec![MARKET_VAULT_SEED.to_vec(), market_id.to_vec()]
    }

    /// Derive the market id from its defining parameters.
    ///
    /// Two markets with identical resolution config and timing hash to the
    /// same id, so accidental duplicate creation fails on the existing PDA.
    pub fn derive_id(
        resolution: &ResolutionConfig,
        close_time: i64,
        settlement_time: i64,
    ) -> [u8; 32] {
        let mut params = Vec::with_capacity(ResolutionConfig::MAX_SIZE + 16);
        match resolution {
            ResolutionConfig::Manual { question_hash } => {
                params.push(0u8);
                params.extend_from_slice(question_hash);
            }
            ResolutionConfig::PriceThreshold {
                feed,
                target_value,
                target_decimals,
                direction,
            } => {
                params.push(1u8);
                params.extend_from_slice(feed.as_ref());
                params.extend_from_slice(&target_value.to_le_bytes());
                params.push(*target_decimals);
                params.push(*direction as u8);
            }
        }
        params.extend_from_slice(&close_time.to_le_bytes());
        params.extend_from_slice(&settlement_time.to_le_bytes());
        hash(&params).to_bytes()
    }

    /// Check if the market still accepts predictions at `current_time`
    pub fn is_open_for_predictions(&self, current_time: i64) -> bool {
        self.status == MarketStatus::Open && current_time < self.close_time
    }

    /// Check if the market can be resolved at `current_time`
    pub fn can_resolve(&self, current_time: i64) -> bool {
        self.status == MarketStatus::Open && current_time >= self.settlement_time
    }

    /// Check if the market is resolved with an outcome
    pub fn is_resolved(&self) -> bool {
        self.status == MarketStatus::Resolved && self.outcome.is_some()
    }
}

/// Append-only participant list for one market
///
/// Resolution iterates this account to sum every participant's score in a
/// single pass; per-participant lookups go through the Prediction PDA
/// instead. The participant set here always mirrors the set of live
/// Prediction accounts.
///
/// PDA Seeds: ["book", market_id]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ForecastBook {
    /// Account discriminator
    pub discriminator: u64,

    /// Owning market id
    pub market_id: [u8; 32],

    /// Number of recorded predictions
    pub count: u16,

    /// Participant wallets, in submission order
    pub participants: [Pubkey; MAX_PARTICIPANTS],

    /// Probability estimates, parallel to `participants`
    pub estimates: [u8; MAX_PARTICIPANTS],

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl ForecastBook {
    pub const SIZE: usize = 8   // discriminator
        + 32  // market_id
        + 2   // count
        + 32 * MAX_PARTICIPANTS // participants
        + MAX_PARTICIPANTS      // estimates
        + 1   // bump
        + 32; // reserved

    /// PDA seeds
    pub fn seeds(market_id: &[u8; 32]) -> Vec<Vec<u8>> {
        vec![BOOK_SEED.to_vec(), market_id.to_vec()]
    }

    pub fn new(market_id: [u8; 32], bump: u8) -> Self {
        Self {
            discriminator: BOOK_DISCRIMINATOR,
            market_id,
            count: 0,
            participants: [Pubkey::default(); MAX_PARTICIPANTS],
            estimates: [0u8; MAX_PARTICIPANTS],
            bump,
            reserved: [0u8; 32],
        }
    }

    /// Check if a participant already predicted
    pub fn contains(&self, participant: &Pubkey) -> bool {
        self.estimate_of(participant).is_some()
    }

    /// Look up a participant's estimate
    pub fn estimate_of(&self, participant: &Pubkey) -> Option<u8> {
        for i in 0..(self.count as usize) {
            if self.participants[i] == *participant {
                return Some(self.estimates[i]);
            }
        }
        None
    }

    /// Append a prediction. Err when the participant already predicted or
    /// the book is full.
    pub fn record(
        &mut self,
        participant: Pubkey,
        estimate: u8,
    ) -> Result<(), crate::error::ForecastMarketError> {
        use crate::error::ForecastMarketError;

        if self.contains(&participant) {
            return Err(ForecastMarketError::DuplicatePrediction);
        }
        if (self.count as usize) >= MAX_PARTICIPANTS {
            return Err(ForecastMarketError::MarketFull);
        }
        self.participants[self.count as usize] = participant;
        self.estimates[self.count as usize] = estimate;
        self.count += 1;
        Ok(())
    }

    /// Sum of every participant's calibration score under `outcome`
    pub fn total_score(&self, outcome: Outcome) -> u64 {
        let mut total = 0u64;
        for i in 0..(self.count as usize) {
            total += calibration_score(self.estimates[i], outcome);
        }
        total
    }

    /// Hypothetical payout for `participant` were the market to resolve to
    /// `assumed_outcome` with the given pot. Pure projection, valid before
    /// and after resolution; 0 for unknown participants and for an empty
    /// book.
    pub fn estimate_payout(
        &self,
        participant: &Pubkey,
        assumed_outcome: Outcome,
        pot_amount: u64,
    ) -> u64 {
        let estimate = match self.estimate_of(participant) {
            Some(e) => e,
            None => return 0,
        };
        let total = self.total_score(assumed_outcome);
        payout_share(calibration_score(estimate, assumed_outcome), pot_amount, total)
    }
}

/// One participant's prediction on one market
///
/// PDA Seeds: ["prediction", market_id, participant]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Prediction {
    /// Account discriminator
    pub discriminator: u64,

    /// Owning market id
    pub market_id: [u8; 32],

    /// Submitting wallet
    pub participant: Pubkey,

    /// Probability estimate in [1, 99]
    pub estimate: u8,

    /// Submission timestamp
    pub predicted_at: i64,

    /// Set exactly once when the payout leaves the vault
    pub claimed: bool,

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl Prediction {
    pub const SIZE: usize = 8   // discriminator
        + 32  // market_id
        + 32  // participant
        + 1   // estimate
        + 8   // predicted_at
        + 1   // claimed
        + 1   // bump
        + 16; // reserved

    /// PDA seeds
    pub fn seeds(market_id: &[u8; 32], participant: &Pubkey) -> Vec<Vec<u8>> {
        vec![
            PREDICTION_SEED.to_vec(),
            market_id.to_vec(),
            participant.to_bytes().to_vec(),
        ]
    }

    pub fn new(
        market_id: [u8; 32],
        participant: Pubkey,
        estimate: u8,
        predicted_at: i64,
        bump: u8,
    ) -> Self {
        Self {
            discriminator: PREDICTION_DISCRIMINATOR,
            market_id,
            participant,
            estimate,
            predicted_at,
            claimed: false,
            bump,
            reserved: [0u8; 16],
        }
    }

    /// This prediction's calibration score under `outcome`
    pub fn score(&self, outcome: Outcome) -> u64 {
        calibration_score(self.estimate, outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::pubkey::Pubkey;

    #[test]
    fn test_account_sizes() {
        assert!(Config::SIZE > 0);
        assert!(Market::SIZE > 0);
        assert!(Prediction::SIZE > 0);
        // 8 + 32 + 2 + 2048 + 64 + 1 + 32
        assert_eq!(ForecastBook::SIZE, 2187);
    }

    #[test]
    fn test_calibration_score() {
        assert_eq!(calibration_score(70, Outcome::Yes), 70);
        assert_eq!(calibration_score(70, Outcome::No), 30);
        assert_eq!(calibration_score(MIN_ESTIMATE, Outcome::No), 99);
        assert_eq!(calibration_score(MAX_ESTIMATE, Outcome::Yes), 99);
    }

    #[test]
    fn test_derive_id_is_deterministic() {
        let resolution = ResolutionConfig::Manual {
            question_hash: [7u8; 32],
        };
        let a = Market::derive_id(&resolution, 100, 200);
        let b = Market::derive_id(&resolution, 100, 200);
        assert_eq!(a, b);

        // Any defining parameter changes the id
        let c = Market::derive_id(&resolution, 100, 201);
        assert_ne!(a, c);

        let other = ResolutionConfig::Manual {
            question_hash: [8u8; 32],
        };
        assert_ne!(a, Market::derive_id(&other, 100, 200));
    }

    #[test]
    fn test_derive_id_distinguishes_modes() {
        let manual = ResolutionConfig::Manual {
            question_hash: [0u8; 32],
        };
        let threshold = ResolutionConfig::PriceThreshold {
            feed: Pubkey::default(),
            target_value: 0,
            target_decimals: 0,
            direction: Direction::Above,
        };
        assert_ne!(
            Market::derive_id(&manual, 100, 200),
            Market::derive_id(&threshold, 100, 200)
        );
    }

    #[test]
    fn test_book_record_and_lookup() {
        let mut book = ForecastBook::new([1u8; 32], 255);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        assert!(book.record(alice, 70).is_ok());
        assert_eq!(book.count, 1);
        assert_eq!(book.estimate_of(&alice), Some(70));
        assert_eq!(book.estimate_of(&bob), None);

        // Duplicate rejected
        assert_eq!(
            book.record(alice, 55),
            Err(crate::error::ForecastMarketError::DuplicatePrediction)
        );
        assert_eq!(book.count, 1);
        assert_eq!(book.estimate_of(&alice), Some(70));

        assert!(book.record(bob, 30).is_ok());
        assert_eq!(book.count, 2);
    }

    #[test]
    fn test_book_capacity() {
        let mut book = ForecastBook::new([1u8; 32], 255);
        for _ in 0..MAX_PARTICIPANTS {
            assert!(book.record(Pubkey::new_unique(), 50).is_ok());
        }
        assert_eq!(
            book.record(Pubkey::new_unique(), 50),
            Err(crate::error::ForecastMarketError::MarketFull)
        );
        assert_eq!(book.count as usize, MAX_PARTICIPANTS);
    }

    #[test]
    fn test_total_score_both_outcomes() {
        let mut book = ForecastBook::new([1u8; 32], 255);
        book.record(Pubkey::new_unique(), 70).unwrap();
        book.record(Pubkey::new_unique(), 50).unwrap();
        book.record(Pubkey::new_unique(), 30).unwrap();

        assert_eq!(book.total_score(Outcome::Yes), 150);
        assert_eq!(book.total_score(Outcome::No), 150);
    }

    #[test]
    fn test_payout_share_truncates() {
        // floor(70 * 100 / 150) = 46
        assert_eq!(payout_share(70, 100, 150), 46);
        assert_eq!(payout_share(50, 100, 150), 33);
        assert_eq!(payout_share(30, 100, 150), 20);
    }

    #[test]
    fn test_payout_share_zero_total_guard() {
        assert_eq!(payout_share(50, 1_000_000, 0), 0);
    }

    #[test]
    fn test_worked_settlement_scenario() {
        // Pot of 100 units, estimates 70/50/30, outcome Yes.
        let mut book = ForecastBook::new([9u8; 32], 255);
        let p1 = Pubkey::new_unique();
        let p2 = Pubkey::new_unique();
        let p3 = Pubkey::new_unique();
        book.record(p1, 70).unwrap();
        book.record(p2, 50).unwrap();
        book.record(p3, 30).unwrap();

        let pot = 100u64;
        let total = book.total_score(Outcome::Yes);
        assert_eq!(total, 150);

        let payouts: Vec<u64> = [p1, p2, p3]
            .iter()
            .map(|p| book.estimate_payout(p, Outcome::Yes, pot))
            .collect();
        assert_eq!(payouts, vec![46, 33, 20]);

        // Conservation with one unit of dust left behind.
        let claimed: u64 = payouts.iter().sum();
        assert_eq!(claimed, 99);
        assert_eq!(pot - claimed, 1);
    }

    #[test]
    fn test_payout_proportionality() {
        // score(p1) = 2 * score(p2) must pay out 2x, up to 1 unit each.
        let mut book = ForecastBook::new([2u8; 32], 255);
        let p1 = Pubkey::new_unique();
        let p2 = Pubkey::new_unique();
        book.record(p1, 60).unwrap();
        book.record(p2, 30).unwrap();

        let pot = 1_000_000u64;
        let a = book.estimate_payout(&p1, Outcome::Yes, pot);
        let b = book.estimate_payout(&p2, Outcome::Yes, pot);
        assert!(a >= 2 * b && a <= 2 * (b + 1));
    }

    #[test]
    fn test_estimate_payout_unknown_participant() {
        let mut book = ForecastBook::new([3u8; 32], 255);
        book.record(Pubkey::new_unique(), 80).unwrap();
        assert_eq!(
            book.estimate_payout(&Pubkey::new_unique(), Outcome::Yes, 500),
            0
        );
    }

    #[test]
    fn test_market_time_gates() {
        let resolution = ResolutionConfig::Manual {
            question_hash: [0u8; 32],
        };
        let market = Market {
            discriminator: MARKET_DISCRIMINATOR,
            market_id: [0u8; 32],
            creator: Pubkey::new_unique(),
            resolution,
            vault: Pubkey::new_unique(),
            book: Pubkey::new_unique(),
            close_time: 1_000,
            settlement_time: 2_000,
            status: MarketStatus::Open,
            outcome: None,
            total_score: 0,
            resolution_reading: None,
            pot_amount: 50,
            total_claimed: 0,
            prediction_count: 0,
            created_at: 500,
            resolved_at: 0,
            bump: 255,
            vault_bump: 254,
            reserved: [0u8; 32],
        };

        assert!(market.is_open_for_predictions(999));
        assert!(!market.is_open_for_predictions(1_000));
        assert!(!market.can_resolve(1_999));
        assert!(market.can_resolve(2_000));
        assert!(!market.is_resolved());

        let mut resolved = market.clone();
        resolved.status = MarketStatus::Resolved;
        resolved.outcome = Some(Outcome::No);
        assert!(resolved.is_resolved());
        assert!(!resolved.is_open_for_predictions(999));
        assert!(!resolved.can_resolve(3_000));
    }

    #[test]
    fn test_prediction_score() {
        let prediction = Prediction::new([0u8; 32], Pubkey::new_unique(), 85, 1_000, 255);
        assert_eq!(prediction.score(Outcome::Yes), 85);
        assert_eq!(prediction.score(Outcome::No), 15);
        assert!(!prediction.claimed);
    }
}
