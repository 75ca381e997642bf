use alloc::vec::Vec;
use evm_core::ExitError;
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// Keccak-256 hash of empty code.
pub const KECCAK_EMPTY: H256 = H256([
	0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
	0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Block and transaction environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(default)
)]
pub struct Environment {
	/// Gas price.
	pub gas_price: U256,
	/// Origin.
	pub origin: H160,
	/// Chain ID.
	pub chain_id: U256,
	/// Environmental block hashes, most recent last.
	pub block_hashes: Vec<H256>,
	/// Environmental block number.
	pub block_number: U256,
	/// Environmental coinbase.
	pub block_coinbase: H160,
	/// Environmental block timestamp.
	pub block_timestamp: U256,
	/// Environmental block difficulty.
	pub block_difficulty: U256,
	/// Environmental block gas limit.
	pub block_gas_limit: U256,
	/// Environmental base fee per gas.
	pub block_base_fee_per_gas: U256,
}

impl Environment {
	/// Hash of one of the recent blocks. Zero for the current block, future
	/// blocks and blocks too old to be known.
	pub fn block_hash(&self, number: U256) -> H256 {
		if number >= self.block_number
			|| self.block_number - number - U256::one() >= U256::from(self.block_hashes.len())
		{
			H256::default()
		} else {
			let index = (self.block_number - number - U256::one()).as_usize();
			self.block_hashes[self.block_hashes.len() - 1 - index]
		}
	}
}

/// Basic account information.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub struct AccountInfo {
	/// Account balance.
	pub balance: U256,
	/// Account nonce.
	pub nonce: u64,
	/// Hash of the account code.
	pub code_hash: H256,
	/// Account code.
	pub code: Vec<u8>,
}

impl AccountInfo {
	pub fn new(balance: U256, nonce: u64, code: Vec<u8>) -> Self {
		let code_hash = if code.is_empty() {
			KECCAK_EMPTY
		} else {
			H256::from_slice(Keccak256::digest(&code).as_slice())
		};

		Self {
			balance,
			nonce,
			code_hash,
			code,
		}
	}

	/// Empty accounts have no balance, no nonce and no code.
	pub fn is_empty(&self) -> bool {
		self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
	}
}

impl Default for AccountInfo {
	fn default() -> Self {
		Self {
			balance: U256::zero(),
			nonce: 0,
			code_hash: KECCAK_EMPTY,
			code: Vec::new(),
		}
	}
}

/// A log record emitted by `LOGn`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub struct Log {
	/// Emitting address.
	pub address: H160,
	/// Topics.
	pub topics: Vec<H256>,
	/// Data.
	pub data: Vec<u8>,
}

/// Marker of a point in the state history that can be returned to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JournalCheckpoint {
	journal_len: usize,
}

impl JournalCheckpoint {
	pub fn new(journal_len: usize) -> Self {
		Self { journal_len }
	}

	/// Length of the journal when the checkpoint was taken.
	pub fn journal_len(&self) -> usize {
		self.journal_len
	}
}

/// State the interpreter and the executor act upon.
#[auto_impl::auto_impl(&mut, Box)]
pub trait Host {
	/// Block and transaction environment.
	fn environment(&self) -> &Environment;

	/// Get account information. Unknown accounts are empty.
	fn get_account(&self, address: H160) -> Result<AccountInfo, ExitError>;
	/// Set the balance of an account.
	fn set_balance(&mut self, address: H160, balance: U256) -> Result<(), ExitError>;
	/// Set the nonce of an account.
	fn set_nonce(&mut self, address: H160, nonce: u64) -> Result<(), ExitError>;
	/// Set the code of an account.
	fn set_code(&mut self, address: H160, code: Vec<u8>) -> Result<(), ExitError>;
	/// Get storage value of address at key.
	fn get_storage(&self, address: H160, key: U256) -> Result<U256, ExitError>;
	/// Set storage value of address at key.
	fn set_storage(&mut self, address: H160, key: U256, value: U256) -> Result<(), ExitError>;
	/// Create (or overwrite) an account.
	fn create_account(&mut self, address: H160, info: AccountInfo) -> Result<(), ExitError>;
	/// Move the balance of `address` to `beneficiary` and mark `address` for
	/// deletion. Returns `true` if it was not already marked.
	fn self_destruct(&mut self, address: H160, beneficiary: H160) -> Result<bool, ExitError>;
	/// Append a log record.
	fn log(&mut self, log: Log) -> Result<(), ExitError>;

	/// Mark the current state so that it can be reverted to.
	fn checkpoint(&mut self) -> JournalCheckpoint;
	/// Keep every change made since `checkpoint`.
	fn commit(&mut self, checkpoint: JournalCheckpoint);
	/// Undo every change made since `checkpoint`.
	fn revert_to_checkpoint(&mut self, checkpoint: JournalCheckpoint) -> Result<(), ExitError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn block_hash_window() {
		let env = Environment {
			block_number: U256::from(10),
			block_hashes: alloc::vec![H256::repeat_byte(8), H256::repeat_byte(9)],
			..Default::default()
		};

		assert_eq!(env.block_hash(U256::from(9)), H256::repeat_byte(9));
		assert_eq!(env.block_hash(U256::from(8)), H256::repeat_byte(8));
		assert_eq!(env.block_hash(U256::from(7)), H256::default());
		assert_eq!(env.block_hash(U256::from(10)), H256::default());
	}

	#[test]
	fn empty_account() {
		assert!(AccountInfo::default().is_empty());
		assert!(!AccountInfo::new(U256::zero(), 1, Vec::new()).is_empty());
		assert_eq!(AccountInfo::new(U256::one(), 0, Vec::new()).code_hash, KECCAK_EMPTY);
	}
}
