use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    constants::{BANK_SEED, DISCRIMINATOR_LEN},
    discriminators::BANK_ACCOUNT_DISCRIMINATOR,
    DecodeError,
};

/// Decoded state of one bank account.
///
/// On-chain layout (Anchor):
/// ```text
/// [0..8]   discriminator
/// [8..12]  name length (u32 LE), followed by the UTF-8 name bytes
/// [..+8]   balance in lamports (u64 LE)
/// [..+32]  owner pubkey
/// ```
/// The program allocates a fixed size account, bytes after `owner` are
/// zero padding and are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    pub address: Pubkey,
    pub name: String,
    pub owner: Pubkey,
    pub balance: u64,
}

impl BankAccount {
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(DecodeError::TooShort {
                len: data.len(),
                min: DISCRIMINATOR_LEN,
            });
        }
        let (discriminator, mut fields) = data.split_at(DISCRIMINATOR_LEN);
        if discriminator != BANK_ACCOUNT_DISCRIMINATOR {
            let mut found = [0u8; 8];
            found.copy_from_slice(discriminator);
            return Err(DecodeError::DiscriminatorMismatch {
                expected: BANK_ACCOUNT_DISCRIMINATOR,
                found,
            });
        }

        let name = String::deserialize(&mut fields)?;
        let balance = u64::deserialize(&mut fields)?;
        let owner = <[u8; 32]>::deserialize(&mut fields)?;

        Ok(Self {
            address,
            name,
            owner: Pubkey::new_from_array(owner),
            balance,
        })
    }

    /// Serializes the account the way the program stores it, without the
    /// trailing padding.
    pub fn encode(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = BANK_ACCOUNT_DISCRIMINATOR.to_vec();
        self.name.serialize(&mut data)?;
        self.balance.serialize(&mut data)?;
        self.owner.to_bytes().serialize(&mut data)?;
        Ok(data)
    }
}

/// Address of the bank owned by `owner`. The program derives one bank per
/// owner.
pub fn find_bank_address(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BANK_SEED, owner.as_ref()], program_id)
}
