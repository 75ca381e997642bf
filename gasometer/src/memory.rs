use evm_core::ExitException;

/// Total cost of a memory of `a` words: `coefficient * a + a * a / 512`.
pub fn memory_gas(a: usize, coefficient: u64) -> Result<u64, ExitException> {
	let a = a as u64;
	coefficient
		.checked_mul(a)
		.ok_or(ExitException::OutOfGas)?
		.checked_add(a.checked_mul(a).ok_or(ExitException::OutOfGas)? / 512)
		.ok_or(ExitException::OutOfGas)
}

#[cfg(test)]
mod tests {
	use super::memory_gas;

	#[test]
	fn quadratic_growth() {
		assert_eq!(memory_gas(0, 3), Ok(0));
		assert_eq!(memory_gas(1, 3), Ok(3));
		assert_eq!(memory_gas(32, 3), Ok(98));
		assert_eq!(memory_gas(1024, 3), Ok(3072 + 2048));
		assert!(memory_gas(usize::MAX, 3).is_err());
	}
}
