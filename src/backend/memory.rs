use super::{Database, DatabaseError};
use crate::AccountInfo;
use alloc::collections::BTreeMap;
use primitive_types::{H160, U256};

/// Account stored in a [`MemoryDatabase`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub struct MemoryAccount {
	/// Balance, nonce and code.
	pub info: AccountInfo,
	/// Full account storage. Zero values are not stored.
	pub storage: BTreeMap<U256, U256>,
}

/// Database storing all state values in a `BTreeMap` in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
	state: BTreeMap<H160, MemoryAccount>,
}

impl MemoryDatabase {
	/// Create a new memory database.
	pub fn new(state: BTreeMap<H160, MemoryAccount>) -> Self {
		Self { state }
	}

	/// Get the underlying `BTreeMap` storing the state.
	pub fn state(&self) -> &BTreeMap<H160, MemoryAccount> {
		&self.state
	}

	/// Insert an account with empty storage, replacing any previous one.
	pub fn insert_account(&mut self, address: H160, info: AccountInfo) {
		self.state.insert(
			address,
			MemoryAccount {
				info,
				storage: BTreeMap::new(),
			},
		);
	}
}

impl Database for MemoryDatabase {
	fn get(&self, address: H160) -> Result<Option<AccountInfo>, DatabaseError> {
		Ok(self.state.get(&address).map(|a| a.info.clone()))
	}

	fn set(&mut self, address: H160, info: AccountInfo) -> Result<(), DatabaseError> {
		self.state.entry(address).or_default().info = info;
		Ok(())
	}

	fn get_storage(&self, address: H160, key: U256) -> Result<U256, DatabaseError> {
		Ok(self
			.state
			.get(&address)
			.and_then(|a| a.storage.get(&key).copied())
			.unwrap_or_default())
	}

	fn set_storage(&mut self, address: H160, key: U256, value: U256) -> Result<(), DatabaseError> {
		let account = self.state.entry(address).or_default();
		if value.is_zero() {
			account.storage.remove(&key);
		} else {
			account.storage.insert(key, value);
		}
		Ok(())
	}

	fn remove(&mut self, address: H160) -> Result<(), DatabaseError> {
		self.state.remove(&address);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloc::vec::Vec;

	#[test]
	fn zero_storage_is_not_kept() {
		let address = H160::repeat_byte(1);
		let mut db = MemoryDatabase::default();

		db.set_storage(address, U256::one(), U256::from(7)).unwrap();
		assert_eq!(db.get_storage(address, U256::one()), Ok(U256::from(7)));
		assert_eq!(db.state()[&address].storage.len(), 1);

		db.set_storage(address, U256::one(), U256::zero()).unwrap();
		assert!(db.state()[&address].storage.is_empty());
	}

	#[test]
	fn remove_drops_storage() {
		let address = H160::repeat_byte(2);
		let mut db = MemoryDatabase::default();
		db.insert_account(address, AccountInfo::new(U256::from(5), 1, Vec::new()));
		db.set_storage(address, U256::zero(), U256::one()).unwrap();

		db.remove(address).unwrap();
		assert_eq!(db.get(address), Ok(None));
		assert_eq!(db.get_storage(address, U256::zero()), Ok(U256::zero()));
	}
}
