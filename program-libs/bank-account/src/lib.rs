use thiserror::Error;

pub mod constants;
pub mod discriminators;
pub mod instruction;
pub mod state;

pub use instruction::{
    create_bank_instruction, deposit_instruction, encode_create_args, encode_deposit_args,
    BankInstruction,
};
pub use state::{find_bank_address, BankAccount};

/// Failure to interpret raw bytes as a bank account or bank instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Account data too short: {len} bytes, expected at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("Discriminator mismatch: expected {expected:?}, found {found:?}")]
    DiscriminatorMismatch { expected: [u8; 8], found: [u8; 8] },
    #[error("Unknown instruction discriminator {0:?}")]
    UnknownInstruction([u8; 8]),
    #[error("Invalid field data: {0}")]
    InvalidData(String),
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        DecodeError::InvalidData(e.to_string())
    }
}

/// Client-side rejection of instruction arguments, raised before any
/// network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Bank name must not be empty")]
    EmptyName,
    #[error("Bank name is {len} bytes, at most {max} are allowed")]
    NameTooLong { len: usize, max: usize },
    #[error("Deposit amount must be greater than zero")]
    ZeroAmount,
}
