use crate::AccountInfo;
use alloc::vec::Vec;
use primitive_types::{H160, H256, U256};

/// Undo record of a single state mutation in a
/// [`JournaledHost`](super::JournaledHost).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JournalEntry {
	/// Account was copied from the database into the cache.
	AccountLoaded { address: H160 },
	/// Balance changed.
	BalanceChanged { address: H160, previous: U256 },
	/// Nonce changed.
	NonceChanged { address: H160, previous: u64 },
	/// Code changed.
	CodeChanged {
		address: H160,
		previous: Vec<u8>,
		previous_hash: H256,
	},
	/// Storage slot changed. `previous` is `None` if the slot was not cached.
	StorageChanged {
		address: H160,
		key: U256,
		previous: Option<U256>,
	},
	/// Account was (re)created, dropping its cached storage.
	AccountCreated {
		address: H160,
		previous: AccountInfo,
		was_reset: bool,
		storage: Vec<(U256, U256)>,
	},
	/// Account was marked as destroyed.
	AccountDestroyed { address: H160 },
	/// A log record was appended.
	LogEmitted,
}
