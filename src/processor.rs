//! Instruction processor for the Forecast Market Program

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
};

use crate::error::ForecastMarketError;
use crate::instruction::*;
use crate::oracle;
use crate::state::{
    payout_share, Config, ForecastBook, Market, MarketStatus, Outcome, Prediction,
    ResolutionConfig, BOOK_DISCRIMINATOR, BOOK_SEED, CONFIG_DISCRIMINATOR, CONFIG_SEED,
    MARKET_DISCRIMINATOR, MARKET_SEED, MARKET_VAULT_SEED, MAX_PLATFORM_FEE_BPS,
    PREDICTION_DISCRIMINATOR, PREDICTION_SEED,
};
use crate::utils::{
    amount_after_fee, calculate_fee, check_signer, create_pda_account, deserialize_account,
    get_current_timestamp, safe_add_u64, validate_estimate, verify_pda,
};

/// Process an instruction
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = ForecastMarketInstruction::try_from_slice(instruction_data)
        .map_err(|_| ForecastMarketError::InvalidInstruction)?;

    match instruction {
        ForecastMarketInstruction::Initialize(args) => {
            msg!("Instruction: Initialize");
            process_initialize(program_id, accounts, args)
        }
        ForecastMarketInstruction::CreateMarket(args) => {
            msg!("Instruction: CreateMarket");
            process_create_market(program_id, accounts, args)
        }
        ForecastMarketInstruction::Predict(args) => {
            msg!("Instruction: Predict");
            process_predict(program_id, accounts, args)
        }
        ForecastMarketInstruction::ResolveMarket(args) => {
            msg!("Instruction: ResolveMarket");
            process_resolve_market(program_id, accounts, args)
        }
        ForecastMarketInstruction::ClaimPayout(args) => {
            msg!("Instruction: ClaimPayout");
            process_claim_payout(program_id, accounts, args)
        }
        ForecastMarketInstruction::CancelMarket(args) => {
            msg!("Instruction: CancelMarket");
            process_cancel_market(program_id, accounts, args)
        }
        ForecastMarketInstruction::UpdateAdmin(args) => {
            msg!("Instruction: UpdateAdmin");
            process_update_admin(program_id, accounts, args)
        }
        ForecastMarketInstruction::SetTreasury(args) => {
            msg!("Instruction: SetTreasury");
            process_set_treasury(program_id, accounts, args)
        }
        ForecastMarketInstruction::SetPlatformFee(args) => {
            msg!("Instruction: SetPlatformFee");
            process_set_platform_fee(program_id, accounts, args)
        }
        ForecastMarketInstruction::SetEntryFee(args) => {
            msg!("Instruction: SetEntryFee");
            process_set_entry_fee(program_id, accounts, args)
        }
        ForecastMarketInstruction::SetPaused(args) => {
            msg!("Instruction: SetPaused");
            process_set_paused(program_id, accounts, args)
        }
    }
}

// ============================================================================
// Shared Loaders
// ============================================================================

fn load_config(program_id: &Pubkey, config_info: &AccountInfo) -> Result<Config, ProgramError> {
    if config_info.owner != program_id {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    let config = deserialize_account::<Config>(&config_info.data.borrow())?;
    if config.discriminator != CONFIG_DISCRIMINATOR {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    Ok(config)
}

fn load_market(
    program_id: &Pubkey,
    market_info: &AccountInfo,
    expected_id: &[u8; 32],
) -> Result<Market, ProgramError> {
    if market_info.owner != program_id {
        return Err(ForecastMarketError::MarketNotFound.into());
    }
    let market = deserialize_account::<Market>(&market_info.data.borrow())?;
    if market.discriminator != MARKET_DISCRIMINATOR {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    if market.market_id != *expected_id {
        return Err(ForecastMarketError::MarketNotFound.into());
    }
    Ok(market)
}

fn load_book(
    program_id: &Pubkey,
    book_info: &AccountInfo,
    market: &Market,
) -> Result<ForecastBook, ProgramError> {
    if *book_info.key != market.book {
        return Err(ForecastMarketError::InvalidPDA.into());
    }
    if book_info.owner != program_id {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    let book = deserialize_account::<ForecastBook>(&book_info.data.borrow())?;
    if book.discriminator != BOOK_DISCRIMINATOR {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    Ok(book)
}

fn verify_admin(config: &Config, signer: &AccountInfo) -> ProgramResult {
    if *signer.key != config.admin {
        msg!("Error: signer {} is not the admin", signer.key);
        return Err(ForecastMarketError::Unauthorized.into());
    }
    Ok(())
}

/// Destination/source token accounts supplied by callers get checked for
/// the expected mint and owner before funds move toward them.
fn verify_token_account(
    token_account_info: &AccountInfo,
    expected_owner: &Pubkey,
    expected_mint: &Pubkey,
) -> ProgramResult {
    let token_account = spl_token::state::Account::unpack(&token_account_info.data.borrow())
        .map_err(|_| ForecastMarketError::InvalidTokenAccount)?;
    if token_account.owner != *expected_owner || token_account.mint != *expected_mint {
        return Err(ForecastMarketError::InvalidTokenAccount.into());
    }
    Ok(())
}

fn spl_transfer<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    invoke(
        &spl_token::instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            authority.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
    )
}

fn spl_transfer_signed<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    invoke_signed(
        &spl_token::instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            authority.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )
}

// ============================================================================
// Initialization
// ============================================================================

fn process_initialize(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: InitializeArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Admin (signer)
    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;

    // Account 1: Config PDA (writable)
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: USDC Mint
    let usdc_mint_info = next_account_info(account_info_iter)?;

    // Account 3: System Program
    let system_program_info = next_account_info(account_info_iter)?;

    let bump = verify_pda(config_info.key, program_id, &[CONFIG_SEED])?;

    if !config_info.data_is_empty() {
        msg!("Error: config already initialized");
        return Err(ForecastMarketError::AlreadyInitialized.into());
    }

    if args.platform_fee_bps > MAX_PLATFORM_FEE_BPS {
        msg!(
            "Error: platform fee {} bps exceeds maximum {}",
            args.platform_fee_bps,
            MAX_PLATFORM_FEE_BPS
        );
        return Err(ForecastMarketError::PlatformFeeTooHigh.into());
    }

    if args.entry_fee == 0 {
        msg!("Error: entry fee must be non-zero");
        return Err(ForecastMarketError::InvalidAmount.into());
    }

    let config_seeds: &[&[u8]] = &[CONFIG_SEED, &[bump]];
    create_pda_account(
        admin_info,
        config_info,
        Config::SIZE,
        program_id,
        system_program_info,
        config_seeds,
    )?;

    let config = Config::new(
        *admin_info.key,
        *usdc_mint_info.key,
        args.treasury,
        args.entry_fee,
        args.platform_fee_bps,
        bump,
    );
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Config initialized");
    msg!("Admin: {}", admin_info.key);
    msg!("USDC Mint: {}", usdc_mint_info.key);
    msg!("Treasury: {}", args.treasury);
    msg!("Entry fee: {}", args.entry_fee);
    msg!("Platform fee: {} bps", args.platform_fee_bps);

    Ok(())
}

// ============================================================================
// Market Lifecycle
// ============================================================================

fn process_create_market(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: CreateMarketArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Creator (signer)
    let creator_info = next_account_info(account_info_iter)?;
    check_signer(creator_info)?;

    // Account 1: Config (writable)
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: Market PDA (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: ForecastBook PDA (writable)
    let book_info = next_account_info(account_info_iter)?;

    // Account 4: Market Vault PDA (writable)
    let vault_info = next_account_info(account_info_iter)?;

    // Account 5: Creator's USDC account (writable)
    let creator_token_info = next_account_info(account_info_iter)?;

    // Account 6: USDC Mint
    let usdc_mint_info = next_account_info(account_info_iter)?;

    // Account 7: Token Program
    let token_program_info = next_account_info(account_info_iter)?;

    // Account 8: System Program
    let system_program_info = next_account_info(account_info_iter)?;

    // Account 9: Rent Sysvar
    let rent_info = next_account_info(account_info_iter)?;

    // Account 10: Price feed, required for price-resolved markets
    let feed_info = next_account_info(account_info_iter).ok();

    let mut config = load_config(program_id, config_info)?;

    if config.is_paused {
        msg!("Error: program is paused");
        return Err(ForecastMarketError::ProgramPaused.into());
    }

    if *usdc_mint_info.key != config.usdc_mint {
        msg!("Error: USDC mint mismatch");
        return Err(ForecastMarketError::InvalidUsdcMint.into());
    }

    let current_time = get_current_timestamp()?;
    if args.settlement_time <= current_time {
        msg!("Error: settlement time must be in the future");
        return Err(ForecastMarketError::InvalidSettlementTime.into());
    }
    if args.close_time <= current_time || args.close_time > args.settlement_time {
        msg!("Error: close time must be in the future, at or before settlement time");
        return Err(ForecastMarketError::InvalidCloseTime.into());
    }
    if args.seed_amount == 0 {
        msg!("Error: seed amount must be non-zero");
        return Err(ForecastMarketError::InvalidAmount.into());
    }

    // A market that can never be resolved must not be creatable: for
    // price-resolved markets the pinned feed has to produce a usable
    // reading right now.
    if let ResolutionConfig::PriceThreshold { feed, .. } = &args.resolution {
        let feed_info = feed_info.ok_or(ForecastMarketError::FeedMismatch)?;
        if feed_info.key != feed {
            msg!("Error: supplied feed account does not match resolution config");
            return Err(ForecastMarketError::FeedMismatch.into());
        }
        let reading = oracle::read_feed(feed_info, current_time)?;
        msg!(
            "Feed liveness check passed: value={} expo={}",
            reading.value,
            reading.expo
        );
    }

    let market_id = Market::derive_id(&args.resolution, args.close_time, args.settlement_time);

    // Verify Market PDA
    let (market_pda, market_bump) =
        Pubkey::find_program_address(&[MARKET_SEED, &market_id], program_id);
    if *market_info.key != market_pda {
        return Err(ForecastMarketError::InvalidPDA.into());
    }
    if !market_info.data_is_empty() {
        msg!("Error: market already exists");
        return Err(ForecastMarketError::MarketAlreadyExists.into());
    }

    // Verify ForecastBook PDA
    let (book_pda, book_bump) =
        Pubkey::find_program_address(&[BOOK_SEED, &market_id], program_id);
    if *book_info.key != book_pda {
        return Err(ForecastMarketError::InvalidPDA.into());
    }

    // Verify Vault PDA
    let (vault_pda, vault_bump) =
        Pubkey::find_program_address(&[MARKET_VAULT_SEED, &market_id], program_id);
    if *vault_info.key != vault_pda {
        return Err(ForecastMarketError::InvalidPDA.into());
    }

    // Create Market account
    let market_seeds: &[&[u8]] = &[MARKET_SEED, &market_id, &[market_bump]];
    create_pda_account(
        creator_info,
        market_info,
        Market::SIZE,
        program_id,
        system_program_info,
        market_seeds,
    )?;

    // Create ForecastBook account
    let book_seeds: &[&[u8]] = &[BOOK_SEED, &market_id, &[book_bump]];
    create_pda_account(
        creator_info,
        book_info,
        ForecastBook::SIZE,
        program_id,
        system_program_info,
        book_seeds,
    )?;

    // Create Market Vault (USDC token account, owner = Market PDA)
    let vault_seeds: &[&[u8]] = &[MARKET_VAULT_SEED, &market_id, &[vault_bump]];
    create_pda_account(
        creator_info,
        vault_info,
        spl_token::state::Account::LEN,
        token_program_info.key,
        system_program_info,
        vault_seeds,
    )?;

    invoke_signed(
        &spl_token::instruction::initialize_account(
            token_program_info.key,
            vault_info.key,
            usdc_mint_info.key,
            market_info.key, // owner
        )?,
        &[
            vault_info.clone(),
            usdc_mint_info.clone(),
            market_info.clone(),
            rent_info.clone(),
        ],
        &[vault_seeds],
    )?;

    // Collect the seed into the pot
    spl_transfer(
        token_program_info,
        creator_token_info,
        vault_info,
        creator_info,
        args.seed_amount,
    )?;

    let market = Market {
        discriminator: MARKET_DISCRIMINATOR,
        market_id,
        creator: *creator_info.key,
        resolution: args.resolution,
        vault: *vault_info.key,
        book: *book_info.key,
        close_time: args.close_time,
        settlement_time: args.settlement_time,
        status: MarketStatus::Open,
        outcome: None,
        total_score: 0,
        resolution_reading: None,
        pot_amount: args.seed_amount,
        total_claimed: 0,
        prediction_count: 0,
        created_at: current_time,
        resolved_at: 0,
        bump: market_bump,
        vault_bump,
        reserved: [0u8; 32],
    };
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    let book = ForecastBook::new(market_id, book_bump);
    book.serialize(&mut &mut book_info.data.borrow_mut()[..])?;

    config.market_count = safe_add_u64(config.market_count, 1)?;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Market created");
    msg!("Market ID: {}", Pubkey::new_from_array(market_id));
    msg!("Creator: {}", creator_info.key);
    msg!("Seed: {}", args.seed_amount);
    msg!("Close time: {}", args.close_time);
    msg!("Settlement time: {}", args.settlement_time);

    Ok(())
}

fn process_predict(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: PredictArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Participant (signer)
    let participant_info = next_account_info(account_info_iter)?;
    check_signer(participant_info)?;

    // Account 1: Config
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: ForecastBook (writable)
    let book_info = next_account_info(account_info_iter)?;

    // Account 4: Prediction PDA (writable)
    let prediction_info = next_account_info(account_info_iter)?;

    // Account 5: Participant's USDC account (writable)
    let participant_token_info = next_account_info(account_info_iter)?;

    // Account 6: Market Vault (writable)
    let vault_info = next_account_info(account_info_iter)?;

    // Account 7: Treasury USDC account (writable)
    let treasury_token_info = next_account_info(account_info_iter)?;

    // Account 8: Token Program
    let token_program_info = next_account_info(account_info_iter)?;

    // Account 9: System Program
    let system_program_info = next_account_info(account_info_iter)?;

    let config = load_config(program_id, config_info)?;

    if config.is_paused {
        msg!("Error: program is paused");
        return Err(ForecastMarketError::ProgramPaused.into());
    }

    let mut market = load_market(program_id, market_info, &args.market_id)?;

    match market.status {
        MarketStatus::Open => {}
        MarketStatus::Resolved => return Err(ForecastMarketError::MarketAlreadyResolved.into()),
        MarketStatus::Cancelled => return Err(ForecastMarketError::MarketCancelled.into()),
    }

    let current_time = get_current_timestamp()?;
    if current_time >= market.close_time {
        msg!(
            "Error: market closed at {}, now {}",
            market.close_time,
            current_time
        );
        return Err(ForecastMarketError::MarketClosed.into());
    }

    validate_estimate(args.estimate)?;

    let mut book = load_book(program_id, book_info, &market)?;

    // Verify Prediction PDA; an existing account means this participant
    // already predicted.
    let prediction_bump = verify_pda(
        prediction_info.key,
        program_id,
        &[PREDICTION_SEED, &market.market_id, participant_info.key.as_ref()],
    )?;
    if !prediction_info.data_is_empty() {
        return Err(ForecastMarketError::DuplicatePrediction.into());
    }

    if *vault_info.key != market.vault {
        return Err(ForecastMarketError::InvalidMarketVault.into());
    }

    // Platform fees go to the treasury's associated token account only.
    let expected_treasury = spl_associated_token_account::get_associated_token_address(
        &config.treasury,
        &config.usdc_mint,
    );
    if *treasury_token_info.key != expected_treasury {
        msg!("Error: treasury account mismatch");
        return Err(ForecastMarketError::InvalidTreasuryAccount.into());
    }

    // Split the entry fee: platform cut to the treasury, the rest grows
    // the pot.
    let platform_cut = calculate_fee(config.entry_fee, config.platform_fee_bps);
    let pot_contribution = amount_after_fee(config.entry_fee, config.platform_fee_bps);

    if platform_cut > 0 {
        spl_transfer(
            token_program_info,
            participant_token_info,
            treasury_token_info,
            participant_info,
            platform_cut,
        )?;
    }
    spl_transfer(
        token_program_info,
        participant_token_info,
        vault_info,
        participant_info,
        pot_contribution,
    )?;

    book.record(*participant_info.key, args.estimate)?;
    book.serialize(&mut &mut book_info.data.borrow_mut()[..])?;

    let prediction_seeds: &[&[u8]] = &[
        PREDICTION_SEED,
        &market.market_id,
        participant_info.key.as_ref(),
        &[prediction_bump],
    ];
    create_pda_account(
        participant_info,
        prediction_info,
        Prediction::SIZE,
        program_id,
        system_program_info,
        prediction_seeds,
    )?;

    let prediction = Prediction::new(
        market.market_id,
        *participant_info.key,
        args.estimate,
        current_time,
        prediction_bump,
    );
    prediction.serialize(&mut &mut prediction_info.data.borrow_mut()[..])?;

    market.pot_amount = safe_add_u64(market.pot_amount, pot_contribution)?;
    market.prediction_count = market
        .prediction_count
        .checked_add(1)
        .ok_or(ForecastMarketError::ArithmeticOverflow)?;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    msg!("Prediction recorded");
    msg!("Participant: {}", participant_info.key);
    msg!("Estimate: {}%", args.estimate);
    msg!("Entry fee: {} (platform cut: {})", config.entry_fee, platform_cut);
    msg!("Pot: {}", market.pot_amount);

    Ok(())
}

fn process_resolve_market(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: ResolveMarketArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Resolver (signer)
    let resolver_info = next_account_info(account_info_iter)?;
    check_signer(resolver_info)?;

    // Account 1: Config
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: ForecastBook
    let book_info = next_account_info(account_info_iter)?;

    // Account 4: Price feed, required for price-resolved markets
    let feed_info = next_account_info(account_info_iter).ok();

    let config = load_config(program_id, config_info)?;
    let mut market = load_market(program_id, market_info, &args.market_id)?;

    match market.status {
        MarketStatus::Open => {}
        MarketStatus::Resolved => return Err(ForecastMarketError::MarketAlreadyResolved.into()),
        MarketStatus::Cancelled => return Err(ForecastMarketError::MarketCancelled.into()),
    }

    let current_time = get_current_timestamp()?;
    if current_time < market.settlement_time {
        msg!(
            "Error: settlement time {} not reached, now {}",
            market.settlement_time,
            current_time
        );
        return Err(ForecastMarketError::SettlementTimeNotReached.into());
    }

    let book = load_book(program_id, book_info, &market)?;

    // Determine the outcome according to the market's resolution strategy.
    // Both strategies converge on the same settlement step below.
    let (outcome, reading) = match &market.resolution {
        ResolutionConfig::Manual { .. } => {
            verify_admin(&config, resolver_info)?;
            let outcome = args
                .outcome
                .ok_or(ForecastMarketError::OutcomeArgumentMismatch)?;
            (outcome, None)
        }
        ResolutionConfig::PriceThreshold {
            feed,
            target_value,
            target_decimals,
            direction,
        } => {
            // Permissionless: whoever calls first locks in the price the
            // feed reports now.
            if args.outcome.is_some() {
                return Err(ForecastMarketError::OutcomeArgumentMismatch.into());
            }
            let feed_info = feed_info.ok_or(ForecastMarketError::FeedMismatch)?;
            if feed_info.key != feed {
                msg!("Error: supplied feed account does not match the market");
                return Err(ForecastMarketError::FeedMismatch.into());
            }
            let reading = oracle::read_feed(feed_info, current_time)?;
            let met = oracle::threshold_met(&reading, *target_value, *target_decimals, *direction)?;
            let outcome = if met { Outcome::Yes } else { Outcome::No };
            (outcome, Some(reading))
        }
    };

    let total_score = book.total_score(outcome);

    market.status = MarketStatus::Resolved;
    market.outcome = Some(outcome);
    market.total_score = total_score;
    market.resolution_reading = reading;
    market.resolved_at = current_time;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    msg!("Market resolved");
    msg!("Outcome: {:?}", outcome);
    msg!("Total score: {}", total_score);
    msg!("Participants: {}", book.count);
    if let Some(reading) = reading {
        msg!(
            "Feed reading: value={} expo={} publish_time={}",
            reading.value,
            reading.expo,
            reading.publish_time
        );
    }

    Ok(())
}

fn process_claim_payout(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: ClaimPayoutArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Participant (signer)
    let participant_info = next_account_info(account_info_iter)?;
    check_signer(participant_info)?;

    // Account 1: Config
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: Prediction PDA (writable)
    let prediction_info = next_account_info(account_info_iter)?;

    // Account 4: Market Vault (writable)
    let vault_info = next_account_info(account_info_iter)?;

    // Account 5: Participant's USDC account (writable)
    let participant_token_info = next_account_info(account_info_iter)?;

    // Account 6: Token Program
    let token_program_info = next_account_info(account_info_iter)?;

    let config = load_config(program_id, config_info)?;
    let mut market = load_market(program_id, market_info, &args.market_id)?;

    if !market.is_resolved() {
        return Err(ForecastMarketError::MarketNotResolved.into());
    }
    let outcome = market
        .outcome
        .ok_or(ForecastMarketError::MarketNotResolved)?;

    // Verify Prediction PDA
    verify_pda(
        prediction_info.key,
        program_id,
        &[PREDICTION_SEED, &market.market_id, participant_info.key.as_ref()],
    )?;
    if prediction_info.data_is_empty() || prediction_info.owner != program_id {
        return Err(ForecastMarketError::PredictionNotFound.into());
    }

    let mut prediction = deserialize_account::<Prediction>(&prediction_info.data.borrow())?;
    if prediction.discriminator != PREDICTION_DISCRIMINATOR {
        return Err(ForecastMarketError::InvalidAccountData.into());
    }
    if prediction.participant != *participant_info.key {
        return Err(ForecastMarketError::PredictionNotFound.into());
    }

    if prediction.claimed {
        return Err(ForecastMarketError::AlreadyClaimed.into());
    }

    if market.total_score == 0 {
        return Err(ForecastMarketError::NothingToClaim.into());
    }

    if *vault_info.key != market.vault {
        return Err(ForecastMarketError::InvalidMarketVault.into());
    }
    verify_token_account(participant_token_info, participant_info.key, &config.usdc_mint)?;

    let score = prediction.score(outcome);
    let payout = payout_share(score, market.pot_amount, market.total_score);

    // The claimed flag must be persisted before the outbound transfer so a
    // reentrant call observes it and fails.
    prediction.claimed = true;
    prediction.serialize(&mut &mut prediction_info.data.borrow_mut()[..])?;

    market.total_claimed = safe_add_u64(market.total_claimed, payout)?;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    let market_seeds: &[&[u8]] = &[MARKET_SEED, &market.market_id, &[market.bump]];
    spl_transfer_signed(
        token_program_info,
        vault_info,
        participant_token_info,
        market_info,
        payout,
        market_seeds,
    )?;

    msg!("Payout claimed");
    msg!("Participant: {}", participant_info.key);
    msg!("Score: {} / {}", score, market.total_score);
    msg!("Payout: {}", payout);

    Ok(())
}

fn process_cancel_market(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: CancelMarketArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Admin (signer)
    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;

    // Account 1: Config
    let config_info = next_account_info(account_info_iter)?;

    // Account 2: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: Market Vault (writable)
    let vault_info = next_account_info(account_info_iter)?;

    // Account 4: Creator's USDC account (writable)
    let creator_token_info = next_account_info(account_info_iter)?;

    // Account 5: Token Program
    let token_program_info = next_account_info(account_info_iter)?;

    let config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    let mut market = load_market(program_id, market_info, &args.market_id)?;

    match market.status {
        MarketStatus::Open => {}
        MarketStatus::Resolved => return Err(ForecastMarketError::MarketAlreadyResolved.into()),
        MarketStatus::Cancelled => return Err(ForecastMarketError::MarketCancelled.into()),
    }

    if market.prediction_count > 0 {
        msg!(
            "Error: market has {} predictions and cannot be cancelled",
            market.prediction_count
        );
        return Err(ForecastMarketError::MarketNotCancellable.into());
    }

    if *vault_info.key != market.vault {
        return Err(ForecastMarketError::InvalidMarketVault.into());
    }
    verify_token_account(creator_token_info, &market.creator, &config.usdc_mint)?;

    let refund = market.pot_amount;

    market.status = MarketStatus::Cancelled;
    market.pot_amount = 0;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    let market_seeds: &[&[u8]] = &[MARKET_SEED, &market.market_id, &[market.bump]];
    spl_transfer_signed(
        token_program_info,
        vault_info,
        creator_token_info,
        market_info,
        refund,
        market_seeds,
    )?;

    msg!("Market cancelled");
    msg!("Creator: {}", market.creator);
    msg!("Seed refunded: {}", refund);

    Ok(())
}

// ============================================================================
// Admin Operations
// ============================================================================

fn process_update_admin(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: UpdateAdminArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;
    let config_info = next_account_info(account_info_iter)?;

    let mut config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    config.admin = args.new_admin;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Admin updated: {}", args.new_admin);
    Ok(())
}

fn process_set_treasury(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: SetTreasuryArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;
    let config_info = next_account_info(account_info_iter)?;

    let mut config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    config.treasury = args.treasury;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Treasury updated: {}", args.treasury);
    Ok(())
}

fn process_set_platform_fee(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: SetPlatformFeeArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;
    let config_info = next_account_info(account_info_iter)?;

    let mut config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    if args.platform_fee_bps > MAX_PLATFORM_FEE_BPS {
        msg!(
            "Error: platform fee {} bps exceeds maximum {}",
            args.platform_fee_bps,
            MAX_PLATFORM_FEE_BPS
        );
        return Err(ForecastMarketError::PlatformFeeTooHigh.into());
    }

    config.platform_fee_bps = args.platform_fee_bps;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Platform fee updated: {} bps", args.platform_fee_bps);
    Ok(())
}

fn process_set_entry_fee(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: SetEntryFeeArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;
    let config_info = next_account_info(account_info_iter)?;

    let mut config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    if args.entry_fee == 0 {
        return Err(ForecastMarketError::InvalidAmount.into());
    }

    config.entry_fee = args.entry_fee;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Entry fee updated: {}", args.entry_fee);
    Ok(())
}

fn process_set_paused(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: SetPausedArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;
    let config_info = next_account_info(account_info_iter)?;

    let mut config = load_config(program_id, config_info)?;
    verify_admin(&config, admin_info)?;

    config.is_paused = args.paused;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Paused: {}", args.paused);
    Ok(())
}
