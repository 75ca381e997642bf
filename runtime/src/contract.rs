use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::min;
use evm_core::JumpTable;
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// Code and call data of a single frame, together with the identity it runs
/// under.
#[derive(Clone, Debug)]
pub struct Contract {
	/// Program code.
	pub code: Rc<Vec<u8>>,
	/// Keccak-256 hash of the code.
	pub code_hash: H256,
	/// Call data.
	pub input: Vec<u8>,
	/// Caller of the frame.
	pub caller: H160,
	/// Storage and identity address. Differs from the code owner for
	/// `CALLCODE` and `DELEGATECALL`.
	pub address: H160,
	/// Apparent value.
	pub value: U256,
	/// Jump destination analysis of `code`.
	pub jump_table: Rc<JumpTable>,
}

impl Contract {
	/// Build a contract, analysing and hashing the code.
	pub fn new(code: Rc<Vec<u8>>, input: Vec<u8>, caller: H160, address: H160, value: U256) -> Self {
		let code_hash = H256::from_slice(Keccak256::digest(&code[..]).as_slice());
		let jump_table = Rc::new(JumpTable::new(&code));

		Self {
			code,
			code_hash,
			input,
			caller,
			address,
			value,
			jump_table,
		}
	}

	/// Build a contract reusing an existing analysis of the same code.
	pub fn with_jump_table(
		code: Rc<Vec<u8>>,
		code_hash: H256,
		jump_table: Rc<JumpTable>,
		input: Vec<u8>,
		caller: H160,
		address: H160,
		value: U256,
	) -> Self {
		Self {
			code,
			code_hash,
			input,
			caller,
			address,
			value,
			jump_table,
		}
	}

	/// Code bytes at `offset`, zero padded past the end of the code.
	pub fn code_at(&self, offset: usize, len: usize) -> Vec<u8> {
		let mut ret = alloc::vec![0u8; len];
		if offset < self.code.len() {
			let end = min(self.code.len(), offset.saturating_add(len));
			ret[..end - offset].copy_from_slice(&self.code[offset..end]);
		}
		ret
	}

	#[inline]
	pub fn is_valid_jump(&self, offset: usize) -> bool {
		self.jump_table.is_valid(offset)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn code_at_pads_with_zero() {
		let contract = Contract::new(
			Rc::new(alloc::vec![0x60, 0x01, 0x5b]),
			Vec::new(),
			H160::zero(),
			H160::zero(),
			U256::zero(),
		);

		assert_eq!(contract.code_at(1, 4), alloc::vec![0x01, 0x5b, 0, 0]);
		assert_eq!(contract.code_at(10, 2), alloc::vec![0, 0]);
		assert!(contract.is_valid_jump(2));
		assert!(!contract.is_valid_jump(1));
	}

	#[test]
	fn hashes_code() {
		let contract = Contract::new(
			Rc::new(Vec::new()),
			Vec::new(),
			H160::zero(),
			H160::zero(),
			U256::zero(),
		);

		assert_eq!(
			contract.code_hash,
			H256::from_slice(
				&hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
					.unwrap()
			)
		);
	}
}
