use crate::ExitException;
use alloc::vec::Vec;
use primitive_types::{H256, U256};

/// EVM stack.
#[derive(Clone, Debug)]
pub struct Stack {
	data: Vec<U256>,
	limit: usize,
}

impl Stack {
	/// Create a new stack with given limit.
	pub fn new(limit: usize) -> Self {
		Self {
			data: Vec::new(),
			limit,
		}
	}

	/// Stack limit.
	#[inline]
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Stack length.
	#[inline]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the stack is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Check that `pop` items can be popped and `push` items pushed
	/// afterwards.
	pub fn check_pop_push(&self, pop: usize, push: usize) -> Result<(), ExitException> {
		if self.data.len() < pop {
			return Err(ExitException::StackUnderflow);
		}
		if self.data.len() - pop + push > self.limit {
			return Err(ExitException::StackOverflow);
		}
		Ok(())
	}

	/// Pop a value from the stack. If the stack is already empty, returns the
	/// `StackUnderflow` error.
	#[inline]
	pub fn pop(&mut self) -> Result<U256, ExitException> {
		self.data.pop().ok_or(ExitException::StackUnderflow)
	}

	#[inline]
	pub fn pop_h256(&mut self) -> Result<H256, ExitException> {
		self.pop().map(|it| {
			let mut res = H256([0; 32]);
			it.to_big_endian(&mut res.0);
			res
		})
	}

	/// Push a new value into the stack. If it will exceed the stack limit,
	/// returns `StackOverflow` error and leaves the stack unchanged.
	#[inline]
	pub fn push(&mut self, value: U256) -> Result<(), ExitException> {
		if self.data.len() + 1 > self.limit {
			return Err(ExitException::StackOverflow);
		}
		self.data.push(value);
		Ok(())
	}

	/// Peek a value at given index for the stack, where the top of
	/// the stack is at index `0`. If the index is too large,
	/// `StackUnderflow` is returned.
	#[inline]
	pub fn peek(&self, no_from_top: usize) -> Result<U256, ExitException> {
		if self.data.len() > no_from_top {
			Ok(self.data[self.data.len() - no_from_top - 1])
		} else {
			Err(ExitException::StackUnderflow)
		}
	}

	/// Duplicate the `n`-th item (1-based) onto the top.
	pub fn dup(&mut self, n: usize) -> Result<(), ExitException> {
		let value = self.peek(n - 1)?;
		self.push(value)
	}

	/// Swap the top with the item `n` below it.
	pub fn swap(&mut self, n: usize) -> Result<(), ExitException> {
		let len = self.data.len();
		if len <= n {
			return Err(ExitException::StackUnderflow);
		}
		self.data.swap(len - 1, len - 1 - n);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{Stack, U256};
	use crate::ExitException;

	#[test]
	fn push_past_limit_overflows() {
		let mut stack = Stack::new(2);
		stack.push(U256::one()).unwrap();
		stack.push(U256::from(2)).unwrap();
		assert_eq!(stack.push(U256::from(3)), Err(ExitException::StackOverflow));
		assert_eq!(stack.len(), 2);
	}

	#[test]
	fn dup_and_swap() {
		let mut stack = Stack::new(16);
		stack.push(U256::from(1)).unwrap();
		stack.push(U256::from(2)).unwrap();
		stack.push(U256::from(3)).unwrap();

		stack.dup(3).unwrap();
		assert_eq!(stack.peek(0), Ok(U256::from(1)));
		assert_eq!(stack.len(), 4);

		stack.push(U256::from(4)).unwrap();
		stack.swap(3).unwrap();
		assert_eq!(stack.peek(0), Ok(U256::from(2)));
		assert_eq!(stack.peek(3), Ok(U256::from(4)));
		assert_eq!(stack.peek(4), Ok(U256::from(1)));

		assert_eq!(stack.swap(5), Err(ExitException::StackUnderflow));
	}

	#[test]
	fn check_pop_push() {
		let mut stack = Stack::new(3);
		stack.push(U256::zero()).unwrap();
		stack.push(U256::zero()).unwrap();

		assert!(stack.check_pop_push(2, 1).is_ok());
		assert_eq!(stack.check_pop_push(3, 0), Err(ExitException::StackUnderflow));
		assert_eq!(stack.check_pop_push(0, 2), Err(ExitException::StackOverflow));
	}
}
