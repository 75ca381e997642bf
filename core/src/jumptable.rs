use crate::Opcode;
use alloc::vec::Vec;

/// Bitmap of valid jump destinations, one bit per code offset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JumpTable {
	bits: Vec<u8>,
	len: usize,
}

impl JumpTable {
	/// Analyse code bytes in a single pass. Immediate data of `PUSHn` is
	/// never treated as an instruction.
	pub fn new(code: &[u8]) -> Self {
		let mut bits = alloc::vec![0u8; (code.len() + 7) / 8];

		let mut i = 0;
		while i < code.len() {
			let opcode = Opcode(code[i]);
			if opcode == Opcode::JUMPDEST {
				bits[i / 8] |= 1 << (i % 8);
				i += 1;
			} else if let Some(v) = opcode.is_push() {
				i += v as usize + 1;
			} else {
				i += 1;
			}
		}

		Self {
			bits,
			len: code.len(),
		}
	}

	/// Length of the analysed code.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns true if the analysed code is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns `true` if the position is a valid jump destination. If
	/// not, returns `false`.
	#[inline]
	pub fn is_valid(&self, position: usize) -> bool {
		if position >= self.len {
			return false;
		}

		self.bits[position / 8] & (1 << (position % 8)) != 0
	}
}

#[cfg(test)]
mod tests {
	use super::JumpTable;

	#[test]
	fn marks_jumpdest_at_instruction_boundary() {
		// PUSH1 0x04 JUMP REVERT JUMPDEST PUSH1 0x01
		let code = hex::decode("600456fd5b6001").unwrap();
		let table = JumpTable::new(&code);

		assert_eq!(table.len(), 7);
		assert!(table.is_valid(4));
		for i in [0, 1, 2, 3, 5, 6, 7, 100] {
			assert!(!table.is_valid(i));
		}
	}

	#[test]
	fn skips_push_data() {
		// PUSH2 0x5b5b JUMPDEST
		let code = hex::decode("615b5b5b").unwrap();
		let table = JumpTable::new(&code);

		assert!(!table.is_valid(1));
		assert!(!table.is_valid(2));
		assert!(table.is_valid(3));
	}

	#[test]
	fn truncated_push_at_end() {
		// PUSH32 with only two immediate bytes present
		let code = hex::decode("5b7f5b5b").unwrap();
		let table = JumpTable::new(&code);

		assert!(table.is_valid(0));
		assert!(!table.is_valid(2));
		assert!(!table.is_valid(3));
	}

	#[test]
	fn empty_code() {
		let table = JumpTable::new(&[]);
		assert!(table.is_empty());
		assert!(!table.is_valid(0));
	}
}
