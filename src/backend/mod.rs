//! State backends implementing [`Host`](crate::Host).
//!
//! [`PlainHost`] keeps transient state without any rollback. [`JournaledHost`]
//! sits on top of a [`Database`] and records every mutation so that a call
//! frame can be undone when it reverts or fails.

mod journal;
mod journaled;
mod memory;
mod plain;

pub use self::journal::JournalEntry;
pub use self::journaled::JournaledHost;
pub use self::memory::{MemoryAccount, MemoryDatabase};
pub use self::plain::PlainHost;

use crate::{AccountInfo, ExitError, ExitFatal};
use alloc::borrow::Cow;
use primitive_types::{H160, U256};

/// Failure of the persistent state store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DatabaseError {
	/// The store could not be reached.
	Unavailable,
	/// The store returned data that could not be decoded.
	Corrupted(Cow<'static, str>),
	/// Other store errors.
	Other(Cow<'static, str>),
}

impl core::fmt::Display for DatabaseError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::Unavailable => f.write_str("database unavailable"),
			Self::Corrupted(s) => write!(f, "corrupted entry: {}", s),
			Self::Other(s) => f.write_str(s),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for DatabaseError {}

impl From<DatabaseError> for ExitFatal {
	fn from(e: DatabaseError) -> Self {
		match e {
			DatabaseError::Unavailable => Self::Database(Cow::Borrowed("unavailable")),
			DatabaseError::Corrupted(s) | DatabaseError::Other(s) => Self::Database(s),
		}
	}
}

impl From<DatabaseError> for ExitError {
	fn from(e: DatabaseError) -> Self {
		Self::Fatal(e.into())
	}
}

/// Persistent account and storage store underneath a [`JournaledHost`].
#[auto_impl::auto_impl(&mut, Box)]
pub trait Database {
	/// Get account information, `None` if the account does not exist.
	fn get(&self, address: H160) -> Result<Option<AccountInfo>, DatabaseError>;
	/// Insert or replace an account. Its storage is kept.
	fn set(&mut self, address: H160, info: AccountInfo) -> Result<(), DatabaseError>;
	/// Get storage value of address at key. Missing slots are zero.
	fn get_storage(&self, address: H160, key: U256) -> Result<U256, DatabaseError>;
	/// Set storage value of address at key.
	fn set_storage(&mut self, address: H160, key: U256, value: U256) -> Result<(), DatabaseError>;
	/// Remove an account together with its storage.
	fn remove(&mut self, address: H160) -> Result<(), DatabaseError>;
}
