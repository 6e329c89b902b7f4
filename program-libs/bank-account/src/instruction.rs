use borsh::BorshDeserialize;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    constants::{DISCRIMINATOR_LEN, MAX_BANK_NAME_LEN},
    discriminators::{CREATE_DISCRIMINATOR, DEPOSIT_DISCRIMINATOR},
    state::find_bank_address,
    DecodeError, ValidationError,
};

/// Instruction set of the bank program that this client submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankInstruction {
    Create { name: String },
    Deposit { amount: u64 },
}

impl BankInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(DecodeError::TooShort {
                len: data.len(),
                min: DISCRIMINATOR_LEN,
            });
        }
        let (discriminator, mut args) = data.split_at(DISCRIMINATOR_LEN);
        let mut found = [0u8; 8];
        found.copy_from_slice(discriminator);
        match found {
            CREATE_DISCRIMINATOR => Ok(BankInstruction::Create {
                name: String::deserialize(&mut args)?,
            }),
            DEPOSIT_DISCRIMINATOR => Ok(BankInstruction::Deposit {
                amount: u64::deserialize(&mut args)?,
            }),
            other => Err(DecodeError::UnknownInstruction(other)),
        }
    }
}

pub fn validate_bank_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_BANK_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len: name.len(),
            max: MAX_BANK_NAME_LEN,
        });
    }
    Ok(())
}

pub fn encode_create_args(name: &str) -> Result<Vec<u8>, ValidationError> {
    validate_bank_name(name)?;
    let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + 4 + name.len());
    data.extend_from_slice(&CREATE_DISCRIMINATOR);
    data.extend_from_slice(&(name.len() as u32).to_le_bytes());
    data.extend_from_slice(name.as_bytes());
    Ok(data)
}

pub fn encode_deposit_args(amount: u64) -> Result<Vec<u8>, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount);
    }
    let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + 8);
    data.extend_from_slice(&DEPOSIT_DISCRIMINATOR);
    data.extend_from_slice(&amount.to_le_bytes());
    Ok(data)
}

/// Accounts: `[bank (w), user (w, s), system_program]`.
pub fn create_bank_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    name: &str,
) -> Result<(Instruction, Pubkey), ValidationError> {
    let data = encode_create_args(name)?;
    let (bank, _) = find_bank_address(user, program_id);
    let instruction = Instruction {
        program_id: *program_id,
        accounts: bank_account_metas(&bank, user),
        data,
    };
    Ok((instruction, bank))
}

/// Accounts: `[bank (w), user (w, s), system_program]`.
pub fn deposit_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    bank: &Pubkey,
    amount: u64,
) -> Result<Instruction, ValidationError> {
    let data = encode_deposit_args(amount)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: bank_account_metas(bank, user),
        data,
    })
}

fn bank_account_metas(bank: &Pubkey, user: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*bank, false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::ID, false),
    ]
}
