use crate::{AccountInfo, Environment, ExitError, ExitException, Host, JournalCheckpoint, Log};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use primitive_types::{H160, U256};

/// Host without persistence or rollback. Reads return empty values unless
/// written earlier in the same run, and checkpoints are no-ops.
#[derive(Clone, Debug, Default)]
pub struct PlainHost {
	environment: Environment,
	accounts: BTreeMap<H160, AccountInfo>,
	storage: BTreeMap<(H160, U256), U256>,
	destroyed: BTreeSet<H160>,
	logs: Vec<Log>,
}

impl PlainHost {
	pub fn new(environment: Environment) -> Self {
		Self {
			environment,
			..Default::default()
		}
	}

	pub fn with_accounts(environment: Environment, accounts: BTreeMap<H160, AccountInfo>) -> Self {
		Self {
			environment,
			accounts,
			..Default::default()
		}
	}

	pub fn accounts(&self) -> &BTreeMap<H160, AccountInfo> {
		&self.accounts
	}

	pub fn storage(&self) -> &BTreeMap<(H160, U256), U256> {
		&self.storage
	}

	/// Accounts that executed `SELFDESTRUCT`.
	pub fn destroyed(&self) -> &BTreeSet<H160> {
		&self.destroyed
	}

	pub fn logs(&self) -> &[Log] {
		&self.logs
	}

	fn account_mut(&mut self, address: H160) -> &mut AccountInfo {
		self.accounts.entry(address).or_default()
	}
}

impl Host for PlainHost {
	fn environment(&self) -> &Environment {
		&self.environment
	}

	fn get_account(&self, address: H160) -> Result<AccountInfo, ExitError> {
		Ok(self.accounts.get(&address).cloned().unwrap_or_default())
	}

	fn set_balance(&mut self, address: H160, balance: U256) -> Result<(), ExitError> {
		self.account_mut(address).balance = balance;
		Ok(())
	}

	fn set_nonce(&mut self, address: H160, nonce: u64) -> Result<(), ExitError> {
		self.account_mut(address).nonce = nonce;
		Ok(())
	}

	fn set_code(&mut self, address: H160, code: Vec<u8>) -> Result<(), ExitError> {
		let account = self.account_mut(address);
		*account = AccountInfo::new(account.balance, account.nonce, code);
		Ok(())
	}

	fn get_storage(&self, address: H160, key: U256) -> Result<U256, ExitError> {
		Ok(self
			.storage
			.get(&(address, key))
			.copied()
			.unwrap_or_default())
	}

	fn set_storage(&mut self, address: H160, key: U256, value: U256) -> Result<(), ExitError> {
		self.storage.insert((address, key), value);
		Ok(())
	}

	fn create_account(&mut self, address: H160, info: AccountInfo) -> Result<(), ExitError> {
		self.storage.retain(|(a, _), _| *a != address);
		self.accounts.insert(address, info);
		Ok(())
	}

	fn self_destruct(&mut self, address: H160, beneficiary: H160) -> Result<bool, ExitError> {
		let balance = self.account_mut(address).balance;
		if beneficiary != address {
			let target = self.account_mut(beneficiary);
			target.balance = target
				.balance
				.checked_add(balance)
				.ok_or(ExitException::Other("balance overflow".into()))?;
		}
		self.account_mut(address).balance = U256::zero();
		Ok(self.destroyed.insert(address))
	}

	fn log(&mut self, log: Log) -> Result<(), ExitError> {
		self.logs.push(log);
		Ok(())
	}

	fn checkpoint(&mut self) -> JournalCheckpoint {
		JournalCheckpoint::new(0)
	}

	fn commit(&mut self, _checkpoint: JournalCheckpoint) {}

	fn revert_to_checkpoint(&mut self, _checkpoint: JournalCheckpoint) -> Result<(), ExitError> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_default_to_empty() {
		let host = PlainHost::default();
		let address = H160::repeat_byte(1);

		assert!(host.get_account(address).unwrap().is_empty());
		assert_eq!(host.get_storage(address, U256::one()), Ok(U256::zero()));
	}

	#[test]
	fn revert_keeps_writes() {
		let mut host = PlainHost::default();
		let address = H160::repeat_byte(1);

		let checkpoint = host.checkpoint();
		host.set_storage(address, U256::one(), U256::from(9)).unwrap();
		host.set_balance(address, U256::from(3)).unwrap();
		host.revert_to_checkpoint(checkpoint).unwrap();

		assert_eq!(host.get_storage(address, U256::one()), Ok(U256::from(9)));
		assert_eq!(host.get_account(address).unwrap().balance, U256::from(3));
	}

	#[test]
	fn self_destruct_moves_balance_once() {
		let mut host = PlainHost::default();
		let address = H160::repeat_byte(1);
		let beneficiary = H160::repeat_byte(2);
		host.set_balance(address, U256::from(10)).unwrap();

		assert_eq!(host.self_destruct(address, beneficiary), Ok(true));
		assert_eq!(host.self_destruct(address, beneficiary), Ok(false));
		assert_eq!(host.get_account(address).unwrap().balance, U256::zero());
		assert_eq!(host.get_account(beneficiary).unwrap().balance, U256::from(10));
	}
}
