//! Program-level tests for initialization, the admin surface, and the
//! market-creation guards that run before any funds move.

use borsh::BorshSerialize;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use solana_program_test::{processor, BanksClientError, ProgramTest};
use solana_sdk::{
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};

use parimutuel_market_program::{
    instruction::{
        CreateMarketArgs, ForecastMarketInstruction, InitializeArgs, SetPausedArgs,
        SetPlatformFeeArgs, UpdateAdminArgs,
    },
    state::{Config, ResolutionConfig, BOOK_SEED, CONFIG_SEED, MARKET_SEED, MARKET_VAULT_SEED},
    utils::deserialize_account,
    ForecastMarketError,
};

fn program_test() -> (ProgramTest, Pubkey) {
    let program_id = parimutuel_market_program::id();
    let test = ProgramTest::new(
        "parimutuel_market_program",
        program_id,
        processor!(parimutuel_market_program::processor::process_instruction),
    );
    (test, program_id)
}

fn initialize_ix(
    program_id: &Pubkey,
    admin: &Pubkey,
    usdc_mint: &Pubkey,
    args: InitializeArgs,
) -> Instruction {
    let (config_pda, _) = Pubkey::find_program_address(&[CONFIG_SEED], program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(*usdc_mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: ForecastMarketInstruction::Initialize(args)
            .try_to_vec()
            .unwrap(),
    }
}

fn admin_ix(
    program_id: &Pubkey,
    admin: &Pubkey,
    instruction: ForecastMarketInstruction,
) -> Instruction {
    let (config_pda, _) = Pubkey::find_program_address(&[CONFIG_SEED], program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(config_pda, false),
        ],
        data: instruction.try_to_vec().unwrap(),
    }
}

fn assert_custom_error(result: Result<(), BanksClientError>, expected: ForecastMarketError) {
    match result {
        Err(BanksClientError::TransactionError(TransactionError::InstructionError(
            0,
            solana_program::instruction::InstructionError::Custom(code),
        ))) => assert_eq!(code, expected as u32),
        other => panic!("expected custom error {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_initialize_and_read_config() {
    let (test, program_id) = program_test();
    let (mut banks_client, payer, recent_blockhash) = test.start().await;

    let usdc_mint = Pubkey::new_unique();
    let treasury = Pubkey::new_unique();

    let ix = initialize_ix(
        &program_id,
        &payer.pubkey(),
        &usdc_mint,
        InitializeArgs {
            treasury,
            entry_fee: 1_000_000,
            platform_fee_bps: 100,
        },
    );
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], recent_blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    let (config_pda, _) = Pubkey::find_program_address(&[CONFIG_SEED], &program_id);
    let account = banks_client
        .get_account(config_pda)
        .await
        .unwrap()
        .expect("config account exists");
    let config: Config = deserialize_account(&account.data).unwrap();

    assert_eq!(config.admin, payer.pubkey());
    assert_eq!(config.usdc_mint, usdc_mint);
    assert_eq!(config.treasury, treasury);
    assert_eq!(config.entry_fee, 1_000_000);
    assert_eq!(config.platform_fee_bps, 100);
    assert_eq!(config.market_count, 0);
    assert!(!config.is_paused);
}

#[tokio::test]
async fn test_initialize_twice_fails() {
    let (test, program_id) = program_test();
    let (mut banks_client, payer, recent_blockhash) = test.start().await;

    let args = InitializeArgs {
        treasury: Pubkey::new_unique(),
        entry_fee: 1_000_000,
        platform_fee_bps: 100,
    };

    let ix = initialize_ix(&program_id, &payer.pubkey(), &Pubkey::new_unique(), args.clone());
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], recent_blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    // Different mint so the transaction is distinct; still rejected.
    let ix = initialize_ix(&program_id, &payer.pubkey(), &Pubkey::new_unique(), args);
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::AlreadyInitialized);
}

#[tokio::test]
async fn test_initialize_rejects_excessive_fee() {
    let (test, program_id) = program_test();
    let (mut banks_client, payer, recent_blockhash) = test.start().await;

    let ix = initialize_ix(
        &program_id,
        &payer.pubkey(),
        &Pubkey::new_unique(),
        InitializeArgs {
            treasury: Pubkey::new_unique(),
            entry_fee: 1_000_000,
            platform_fee_bps: 5_000,
        },
    );
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], recent_blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::PlatformFeeTooHigh);
}

#[tokio::test]
async fn test_admin_rotation_and_authorization() {
    let (test, program_id) = program_test();
    let (mut banks_client, payer, recent_blockhash) = test.start().await;

    let ix = initialize_ix(
        &program_id,
        &payer.pubkey(),
        &Pubkey::new_unique(),
        InitializeArgs {
            treasury: Pubkey::new_unique(),
            entry_fee: 1_000_000,
            platform_fee_bps: 100,
        },
    );
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], recent_blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    // Rotate admin away from the payer.
    let new_admin = Keypair::new();
    let ix = admin_ix(
        &program_id,
        &payer.pubkey(),
        ForecastMarketInstruction::UpdateAdmin(UpdateAdminArgs {
            new_admin: new_admin.pubkey(),
        }),
    );
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    let (config_pda, _) = Pubkey::find_program_address(&[CONFIG_SEED], &program_id);
    let account = banks_client.get_account(config_pda).await.unwrap().unwrap();
    let config: Config = deserialize_account(&account.data).unwrap();
    assert_eq!(config.admin, new_admin.pubkey());

    // The old admin can no longer change settings.
    let ix = admin_ix(
        &program_id,
        &payer.pubkey(),
        ForecastMarketInstruction::SetPlatformFee(SetPlatformFeeArgs {
            platform_fee_bps: 200,
        }),
    );
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::Unauthorized);
}

#[tokio::test]
async fn test_create_market_guards() {
    let (test, program_id) = program_test();
    let (mut banks_client, payer, recent_blockhash) = test.start().await;

    let usdc_mint = Pubkey::new_unique();
    let ix = initialize_ix(
        &program_id,
        &payer.pubkey(),
        &usdc_mint,
        InitializeArgs {
            treasury: Pubkey::new_unique(),
            entry_fee: 1_000_000,
            platform_fee_bps: 100,
        },
    );
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], recent_blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    let far_future = i64::MAX / 2;
    let create_ix = |resolution: ResolutionConfig,
                     close_time: i64,
                     settlement_time: i64,
                     seed_amount: u64| {
        let market_id =
            parimutuel_market_program::state::Market::derive_id(&resolution, close_time, settlement_time);
        let (config_pda, _) = Pubkey::find_program_address(&[CONFIG_SEED], &program_id);
        let (market_pda, _) =
            Pubkey::find_program_address(&[MARKET_SEED, &market_id], &program_id);
        let (book_pda, _) = Pubkey::find_program_address(&[BOOK_SEED, &market_id], &program_id);
        let (vault_pda, _) =
            Pubkey::find_program_address(&[MARKET_VAULT_SEED, &market_id], &program_id);
        Instruction {
            program_id,
            accounts: vec![
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new(config_pda, false),
                AccountMeta::new(market_pda, false),
                AccountMeta::new(book_pda, false),
                AccountMeta::new(vault_pda, false),
                AccountMeta::new(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(usdc_mint, false),
                AccountMeta::new_readonly(spl_token::id(), false),
                AccountMeta::new_readonly(system_program::id(), false),
                AccountMeta::new_readonly(solana_program::sysvar::rent::id(), false),
            ],
            data: ForecastMarketInstruction::CreateMarket(CreateMarketArgs {
                resolution,
                close_time,
                settlement_time,
                seed_amount,
            })
            .try_to_vec()
            .unwrap(),
        }
    };

    let manual = ResolutionConfig::Manual {
        question_hash: [42u8; 32],
    };

    // Settlement time in the past.
    let ix = create_ix(manual.clone(), 10, 20, 1_000);
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::InvalidSettlementTime);

    // Close time after settlement time.
    let ix = create_ix(manual.clone(), far_future, far_future - 1, 1_000);
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::InvalidCloseTime);

    // Zero seed.
    let ix = create_ix(manual.clone(), far_future - 1, far_future, 0);
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::InvalidAmount);

    // Paused program rejects creation before anything else is touched.
    let ix = admin_ix(
        &program_id,
        &payer.pubkey(),
        ForecastMarketInstruction::SetPaused(SetPausedArgs { paused: true }),
    );
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    banks_client.process_transaction(tx).await.unwrap();

    let ix = create_ix(manual, far_future - 1, far_future, 1_000);
    let blockhash = banks_client.get_latest_blockhash().await.unwrap();
    let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
    tx.sign(&[&payer], blockhash);
    let result = banks_client.process_transaction(tx).await;
    assert_custom_error(result, ForecastMarketError::ProgramPaused);
}
