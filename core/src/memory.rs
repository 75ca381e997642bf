use crate::ExitFatal;
use alloc::vec::Vec;
use core::cmp::{max, min};
use primitive_types::U256;

/// Number of 32-byte words needed to cover `len` bytes.
#[inline]
pub const fn available_words(len: usize) -> usize {
	len / 32 + (len % 32 != 0) as usize
}

/// Rounds up `x` to the closest multiple of 32. If `x % 32 == 0` then `x` is returned.
#[inline]
fn next_multiple_of_32(x: usize) -> Option<usize> {
	let r = x.wrapping_neg() & 31;
	x.checked_add(r)
}

/// A sequential memory shared by every frame of a call tree.
///
/// There is a single backing buffer. Each frame sees a zero-based logical
/// memory starting at its checkpoint, so a nested call never allocates a
/// buffer of its own and never sees the bytes of its parent.
#[derive(Clone, Debug)]
pub struct Memory {
	data: Vec<u8>,
	checkpoints: Vec<usize>,
	last_checkpoint: usize,
	total_capacity: usize,
	limit: usize,
}

impl Memory {
	/// Create a new memory with the given limit on the shared buffer.
	pub fn new(limit: usize) -> Self {
		Self {
			data: Vec::new(),
			checkpoints: Vec::new(),
			last_checkpoint: 0,
			total_capacity: 0,
			limit,
		}
	}

	/// Memory limit.
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Logical length of the current frame.
	pub fn len(&self) -> usize {
		self.data.len() - self.last_checkpoint
	}

	/// Return true if the current frame has no memory.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Absolute length of the shared buffer, i.e. the end of the current frame.
	pub fn absolute_len(&self) -> usize {
		self.data.len()
	}

	/// Absolute offset at which the current frame begins.
	pub fn last_checkpoint(&self) -> usize {
		self.last_checkpoint
	}

	/// Number of frames nested under the outermost one.
	pub fn depth(&self) -> usize {
		self.checkpoints.len()
	}

	/// High-water mark of the shared buffer. Never shrinks.
	pub fn total_capacity(&self) -> usize {
		self.total_capacity
	}

	/// Bytes of the current frame.
	pub fn data(&self) -> &[u8] {
		&self.data[self.last_checkpoint..]
	}

	/// Grow the current frame to cover `new_len` bytes, rounded up to whole
	/// words. Memory never shrinks through this call.
	pub fn resize(&mut self, new_len: usize) -> Result<(), ExitFatal> {
		if new_len <= self.len() {
			return Ok(());
		}

		let end = next_multiple_of_32(new_len)
			.and_then(|len| self.last_checkpoint.checked_add(len))
			.ok_or(ExitFatal::OutOfMemory)?;
		if end > self.limit {
			return Err(ExitFatal::OutOfMemory);
		}

		self.data
			.try_reserve(end - self.data.len())
			.map_err(|_| ExitFatal::OutOfMemory)?;
		self.data.resize(end, 0);
		self.total_capacity = max(self.total_capacity, end);

		Ok(())
	}

	/// Enter a child frame. The child starts with an empty memory placed
	/// right after the parent's.
	pub fn new_context(&mut self) {
		let end = self.data.len();
		self.checkpoints.push(end);
		self.last_checkpoint = end;
	}

	/// Leave the current frame, restoring the parent's view of memory. The
	/// buffer keeps its allocation.
	pub fn free_context(&mut self) {
		if let Some(origin) = self.checkpoints.pop() {
			self.data.truncate(origin);
			self.last_checkpoint = self.checkpoints.last().copied().unwrap_or(0);
		}
	}

	fn check_range(&self, offset: usize, len: usize) -> Result<usize, ExitFatal> {
		match offset.checked_add(len) {
			Some(end) if end <= self.len() => Ok(self.last_checkpoint + offset),
			_ => Err(ExitFatal::NotSupported),
		}
	}

	/// Get memory region at given offset. Bytes beyond the frame are read
	/// as zero.
	pub fn get(&self, offset: usize, size: usize) -> Vec<u8> {
		let mut ret = alloc::vec![0u8; size];
		let frame = self.data();

		if offset < frame.len() {
			let end = min(frame.len(), offset.saturating_add(size));
			ret[..(end - offset)].copy_from_slice(&frame[offset..end]);
		}

		ret
	}

	/// Borrow a region of the current frame. The region must have been
	/// covered by a prior `resize`.
	pub fn slice(&self, offset: usize, size: usize) -> Result<&[u8], ExitFatal> {
		let start = self.check_range(offset, size)?;
		Ok(&self.data[start..start + size])
	}

	/// Read the 32-byte word at `offset` as a big-endian integer.
	pub fn get_u256(&self, offset: usize) -> U256 {
		U256::from_big_endian(&self.get(offset, 32))
	}

	/// Set memory region at given offset. If `target_size` is larger than
	/// the value, the rest of the region is zeroed.
	pub fn set(
		&mut self,
		offset: usize,
		value: &[u8],
		target_size: Option<usize>,
	) -> Result<(), ExitFatal> {
		let target_size = target_size.unwrap_or(value.len());
		if target_size == 0 {
			return Ok(());
		}

		let start = self.check_range(offset, target_size)?;
		let copied = min(target_size, value.len());
		self.data[start..start + copied].copy_from_slice(&value[..copied]);
		for byte in &mut self.data[start + copied..start + target_size] {
			*byte = 0;
		}

		Ok(())
	}

	/// Write a full word at the given offset.
	pub fn set_word(&mut self, offset: usize, value: U256) -> Result<(), ExitFatal> {
		let mut word = [0u8; 32];
		value.to_big_endian(&mut word);
		self.set(offset, &word, None)
	}

	/// Write a single byte at the given offset.
	pub fn set_byte(&mut self, offset: usize, value: u8) -> Result<(), ExitFatal> {
		self.set(offset, &[value], None)
	}

	/// Copy `len` bytes of `data` starting at `data_offset` into memory at
	/// `memory_offset`. Source bytes past the end of `data` are zero.
	pub fn copy_large(
		&mut self,
		memory_offset: U256,
		data_offset: U256,
		len: U256,
		data: &[u8],
	) -> Result<(), ExitFatal> {
		// A zero-length copy is a no-op regardless of the offsets.
		if len.is_zero() {
			return Ok(());
		}

		if memory_offset > U256::from(usize::MAX) || len > U256::from(usize::MAX) {
			return Err(ExitFatal::NotSupported);
		}
		let memory_offset = memory_offset.as_usize();
		let ulen = len.as_usize();

		let data = if data_offset > U256::from(data.len()) {
			&[]
		} else {
			let data_offset = data_offset.as_usize();
			let end = min(data.len(), data_offset.saturating_add(ulen));
			&data[data_offset..end]
		};

		self.set(memory_offset, data, Some(ulen))
	}

	/// Copies part of the frame inside another part of itself.
	pub fn copy(&mut self, dst: usize, src: usize, len: usize) -> Result<(), ExitFatal> {
		if len == 0 {
			return Ok(());
		}

		let dst = self.check_range(dst, len)?;
		let src = self.check_range(src, len)?;
		self.data.copy_within(src..src + len, dst);

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{available_words, next_multiple_of_32, Memory, U256};

	#[test]
	fn test_available_words() {
		assert_eq!(available_words(0), 0);
		assert_eq!(available_words(31), 1);
		assert_eq!(available_words(32), 1);
		assert_eq!(available_words(33), 2);

		for k in 0..512usize {
			assert_eq!(available_words(32 * k), k);
			assert_eq!(available_words(32 * k + 1), k + 1);
			// Growing to the word boundary does not change the word count.
			let n = 32 * k + 7;
			assert_eq!(available_words(available_words(n) * 32), available_words(n));
		}
	}

	#[test]
	fn test_next_multiple_of_32() {
		for i in 0..32 {
			assert_eq!(Some(i * 32), next_multiple_of_32(i * 32));
		}

		for x in 0..1024usize {
			if x % 32 == 0 {
				continue;
			}
			assert_eq!(Some(x + 32 - (x % 32)), next_multiple_of_32(x));
		}

		assert_eq!(None, next_multiple_of_32(usize::MAX));
	}

	#[test]
	fn test_checkpoint_sizing() {
		let mut memory = Memory::new(1 << 20);

		memory.resize(32).unwrap();
		memory.new_context();
		memory.resize(96).unwrap();
		assert_eq!(memory.absolute_len(), 128);
		assert_eq!(memory.depth(), 1);
		assert_eq!(memory.last_checkpoint(), 32);

		memory.new_context();
		memory.resize(128).unwrap();
		assert_eq!(memory.absolute_len(), 256);
		assert_eq!(memory.depth(), 2);
		assert_eq!(memory.last_checkpoint(), 128);

		memory.free_context();
		assert_eq!(memory.depth(), 1);
		assert_eq!(memory.last_checkpoint(), 32);
		memory.resize(96).unwrap();
		assert_eq!(memory.absolute_len(), 128);
		assert_eq!(memory.total_capacity(), 256);

		memory.free_context();
		assert_eq!(memory.depth(), 0);
		assert_eq!(memory.last_checkpoint(), 0);
		assert_eq!(memory.len(), 32);
	}

	#[test]
	fn test_balanced_contexts_restore_logical_state() {
		let mut memory = Memory::new(1 << 20);
		memory.resize(64).unwrap();
		let (len, origin) = (memory.len(), memory.last_checkpoint());

		let sizes = [0usize, 33, 1000, 5, 64];
		for size in sizes {
			memory.new_context();
			memory.resize(size).unwrap();
		}
		memory.free_context();
		memory.free_context();
		memory.new_context();
		memory.resize(4096).unwrap();
		for _ in 0..4 {
			memory.free_context();
		}

		assert_eq!(memory.depth(), 0);
		assert_eq!(memory.len(), len);
		assert_eq!(memory.last_checkpoint(), origin);
		assert!(memory.total_capacity() >= 64 + 4096);
	}

	#[test]
	fn test_child_frame_is_isolated() {
		let mut memory = Memory::new(1 << 20);
		memory.resize(32).unwrap();
		memory.set_word(0, U256::from(0xdead)).unwrap();

		memory.new_context();
		assert!(memory.is_empty());
		memory.resize(32).unwrap();
		assert_eq!(memory.get_u256(0), U256::zero());
		memory.set_word(0, U256::from(0xbeef)).unwrap();
		memory.free_context();

		assert_eq!(memory.get_u256(0), U256::from(0xdead));

		// A sibling frame reuses the released space, zeroed.
		memory.new_context();
		memory.resize(32).unwrap();
		assert_eq!(memory.get_u256(0), U256::zero());
	}

	#[test]
	fn test_memory_limit() {
		let mut memory = Memory::new(64);
		memory.resize(64).unwrap();
		assert!(memory.resize(65).is_err());
		memory.new_context();
		assert!(memory.resize(1).is_err());
	}

	#[test]
	fn test_write_outside_frame_is_rejected() {
		let mut memory = Memory::new(1024);
		memory.resize(32).unwrap();
		assert!(memory.set(30, &[1, 2, 3], None).is_err());
		assert!(memory.set(29, &[1, 2, 3], None).is_ok());
		assert_eq!(memory.get(29, 5), vec![1, 2, 3, 0, 0]);
	}

	#[test]
	fn test_memory_copy_works() {
		let mut memory = Memory::new(100usize);
		memory.resize(7).unwrap();

		memory.set(3usize, &[1u8, 2u8, 3u8, 4u8], None).unwrap();
		assert_eq!(&memory.data()[..7], &[0u8, 0u8, 0u8, 1u8, 2u8, 3u8, 4u8]);

		memory.copy(0usize, 3usize, 1usize).unwrap();
		assert_eq!(&memory.data()[..7], &[1u8, 0u8, 0u8, 1u8, 2u8, 3u8, 4u8]);
	}

	#[test]
	fn test_copy_large_pads_with_zero() {
		let mut memory = Memory::new(1024);
		memory.resize(32).unwrap();
		memory.set(0, &[0xff; 32], None).unwrap();

		memory
			.copy_large(U256::from(0), U256::from(2), U256::from(4), &[1, 2, 3, 4])
			.unwrap();
		assert_eq!(memory.get(0, 6), vec![3, 4, 0, 0, 0xff, 0xff]);

		memory
			.copy_large(U256::from(0), U256::MAX, U256::from(2), &[1, 2, 3, 4])
			.unwrap();
		assert_eq!(memory.get(0, 3), vec![0, 0, 0]);
	}
}
