use solana_program::native_token::LAMPORTS_PER_SOL;

/// Seed prefix of the bank PDA, followed by the owner's pubkey.
pub const BANK_SEED: &[u8] = b"bankaccount";

/// Size the program allocates for every bank account.
pub const BANK_ACCOUNT_SPACE: usize = 5000;

/// Maximum length of a bank name in bytes (UTF-8 encoded).
pub const MAX_BANK_NAME_LEN: usize = 64;

/// Deposit applied when the caller does not choose an amount (0.01 SOL).
pub const DEFAULT_DEPOSIT_LAMPORTS: u64 = LAMPORTS_PER_SOL / 100;

pub const DISCRIMINATOR_LEN: usize = 8;
