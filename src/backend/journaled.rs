use super::{Database, DatabaseError, JournalEntry};
use crate::{
	AccountInfo, Environment, ExitError, ExitException, ExitFatal, Host, JournalCheckpoint, Log,
};
use alloc::collections::{btree_map::Entry, BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::mem;
use primitive_types::{H160, U256};

/// Host caching state read from a [`Database`] and journaling every change
/// made under an open checkpoint.
///
/// Nothing reaches the database before [`apply`](JournaledHost::apply).
#[derive(Clone, Debug)]
pub struct JournaledHost<D> {
	environment: Environment,
	database: D,
	accounts: BTreeMap<H160, AccountInfo>,
	storage: BTreeMap<(H160, U256), U256>,
	reset: BTreeSet<H160>,
	destroyed: BTreeSet<H160>,
	logs: Vec<Log>,
	journal: Vec<JournalEntry>,
	depth: usize,
}

impl<D: Database> JournaledHost<D> {
	pub fn new(environment: Environment, database: D) -> Self {
		Self {
			environment,
			database,
			accounts: BTreeMap::new(),
			storage: BTreeMap::new(),
			reset: BTreeSet::new(),
			destroyed: BTreeSet::new(),
			logs: Vec::new(),
			journal: Vec::new(),
			depth: 0,
		}
	}

	pub fn database(&self) -> &D {
		&self.database
	}

	pub fn into_database(self) -> D {
		self.database
	}

	/// Number of open checkpoints.
	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn journal(&self) -> &[JournalEntry] {
		&self.journal
	}

	pub fn logs(&self) -> &[Log] {
		&self.logs
	}

	pub fn take_logs(&mut self) -> Vec<Log> {
		mem::take(&mut self.logs)
	}

	/// Flush cached state into the database. Destroyed accounts are removed
	/// and recreated accounts lose their old storage. Must be called with no
	/// open checkpoint.
	pub fn apply(&mut self) -> Result<(), DatabaseError> {
		let accounts = mem::take(&mut self.accounts);
		let storage = mem::take(&mut self.storage);
		let reset = mem::take(&mut self.reset);
		let destroyed = mem::take(&mut self.destroyed);

		for address in reset {
			self.database.remove(address)?;
		}
		for (address, info) in accounts {
			if destroyed.contains(&address) {
				self.database.remove(address)?;
			} else {
				self.database.set(address, info)?;
			}
		}
		for ((address, key), value) in storage {
			if !destroyed.contains(&address) {
				self.database.set_storage(address, key, value)?;
			}
		}

		self.journal.clear();
		Ok(())
	}

	fn load(&mut self, address: H160) -> Result<&mut AccountInfo, ExitError> {
		match self.accounts.entry(address) {
			Entry::Occupied(entry) => Ok(entry.into_mut()),
			Entry::Vacant(entry) => {
				let info = self.database.get(address)?.unwrap_or_default();
				if self.depth > 0 {
					self.journal.push(JournalEntry::AccountLoaded { address });
				}
				Ok(entry.insert(info))
			}
		}
	}

	fn record(&mut self, entry: JournalEntry) {
		if self.depth > 0 {
			self.journal.push(entry);
		}
	}

	fn undo(&mut self, entry: JournalEntry) {
		match entry {
			JournalEntry::AccountLoaded { address } => {
				self.accounts.remove(&address);
			}
			JournalEntry::BalanceChanged { address, previous } => {
				if let Some(account) = self.accounts.get_mut(&address) {
					account.balance = previous;
				}
			}
			JournalEntry::NonceChanged { address, previous } => {
				if let Some(account) = self.accounts.get_mut(&address) {
					account.nonce = previous;
				}
			}
			JournalEntry::CodeChanged {
				address,
				previous,
				previous_hash,
			} => {
				if let Some(account) = self.accounts.get_mut(&address) {
					account.code = previous;
					account.code_hash = previous_hash;
				}
			}
			JournalEntry::StorageChanged {
				address,
				key,
				previous,
			} => match previous {
				Some(value) => {
					self.storage.insert((address, key), value);
				}
				None => {
					self.storage.remove(&(address, key));
				}
			},
			JournalEntry::AccountCreated {
				address,
				previous,
				was_reset,
				storage,
			} => {
				self.accounts.insert(address, previous);
				if !was_reset {
					self.reset.remove(&address);
				}
				for (key, value) in storage {
					self.storage.insert((address, key), value);
				}
			}
			JournalEntry::AccountDestroyed { address } => {
				self.destroyed.remove(&address);
			}
			JournalEntry::LogEmitted => {
				self.logs.pop();
			}
		}
	}

	fn close_checkpoint(&mut self) {
		self.depth = self.depth.saturating_sub(1);
		if self.depth == 0 {
			self.journal.clear();
		}
	}
}

impl<D: Database> Host for JournaledHost<D> {
	fn environment(&self) -> &Environment {
		&self.environment
	}

	fn get_account(&self, address: H160) -> Result<AccountInfo, ExitError> {
		match self.accounts.get(&address) {
			Some(account) => Ok(account.clone()),
			None => Ok(self.database.get(address)?.unwrap_or_default()),
		}
	}

	fn set_balance(&mut self, address: H160, balance: U256) -> Result<(), ExitError> {
		let account = self.load(address)?;
		let previous = mem::replace(&mut account.balance, balance);
		self.record(JournalEntry::BalanceChanged { address, previous });
		Ok(())
	}

	fn set_nonce(&mut self, address: H160, nonce: u64) -> Result<(), ExitError> {
		let account = self.load(address)?;
		let previous = mem::replace(&mut account.nonce, nonce);
		self.record(JournalEntry::NonceChanged { address, previous });
		Ok(())
	}

	fn set_code(&mut self, address: H160, code: Vec<u8>) -> Result<(), ExitError> {
		let account = self.load(address)?;
		let updated = AccountInfo::new(account.balance, account.nonce, code);
		let previous = mem::replace(&mut account.code, updated.code);
		let previous_hash = mem::replace(&mut account.code_hash, updated.code_hash);
		self.record(JournalEntry::CodeChanged {
			address,
			previous,
			previous_hash,
		});
		Ok(())
	}

	fn get_storage(&self, address: H160, key: U256) -> Result<U256, ExitError> {
		if let Some(value) = self.storage.get(&(address, key)) {
			return Ok(*value);
		}
		if self.reset.contains(&address) {
			return Ok(U256::zero());
		}
		Ok(self.database.get_storage(address, key)?)
	}

	fn set_storage(&mut self, address: H160, key: U256, value: U256) -> Result<(), ExitError> {
		let previous = self.storage.insert((address, key), value);
		self.record(JournalEntry::StorageChanged {
			address,
			key,
			previous,
		});
		Ok(())
	}

	fn create_account(&mut self, address: H160, info: AccountInfo) -> Result<(), ExitError> {
		let previous = mem::replace(self.load(address)?, info);

		let storage = self
			.storage
			.range((address, U256::zero())..=(address, U256::MAX))
			.map(|((_, key), value)| (*key, *value))
			.collect::<Vec<_>>();
		for (key, _) in &storage {
			self.storage.remove(&(address, *key));
		}
		let was_reset = !self.reset.insert(address);

		self.record(JournalEntry::AccountCreated {
			address,
			previous,
			was_reset,
			storage,
		});
		Ok(())
	}

	fn self_destruct(&mut self, address: H160, beneficiary: H160) -> Result<bool, ExitError> {
		let balance = self.load(address)?.balance;
		if beneficiary != address {
			let target = self.load(beneficiary)?.balance;
			let target = target
				.checked_add(balance)
				.ok_or(ExitException::Other("balance overflow".into()))?;
			self.set_balance(beneficiary, target)?;
		}
		self.set_balance(address, U256::zero())?;

		let first = self.destroyed.insert(address);
		if first {
			self.record(JournalEntry::AccountDestroyed { address });
		}
		Ok(first)
	}

	fn log(&mut self, log: Log) -> Result<(), ExitError> {
		self.logs.push(log);
		self.record(JournalEntry::LogEmitted);
		Ok(())
	}

	fn checkpoint(&mut self) -> JournalCheckpoint {
		self.depth += 1;
		JournalCheckpoint::new(self.journal.len())
	}

	fn commit(&mut self, _checkpoint: JournalCheckpoint) {
		self.close_checkpoint();
	}

	fn revert_to_checkpoint(&mut self, checkpoint: JournalCheckpoint) -> Result<(), ExitError> {
		if self.depth == 0 || checkpoint.journal_len() > self.journal.len() {
			return Err(ExitFatal::NotSupported.into());
		}

		let undone = self.journal.split_off(checkpoint.journal_len());
		log::trace!(
			target: "evm",
			"journal revert at depth {}: {} entries",
			self.depth,
			undone.len(),
		);
		for entry in undone.into_iter().rev() {
			self.undo(entry);
		}

		self.close_checkpoint();
		Ok(())
	}
}
