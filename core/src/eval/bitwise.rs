use super::arithmetic::{is_negative, SIGN_BIT};
use primitive_types::U256;

#[inline]
pub fn slt(op1: U256, op2: U256) -> U256 {
	// Flipping the sign bit maps signed order onto unsigned order.
	if (op1 ^ SIGN_BIT) < (op2 ^ SIGN_BIT) {
		U256::one()
	} else {
		U256::zero()
	}
}

#[inline]
pub fn sgt(op1: U256, op2: U256) -> U256 {
	if (op1 ^ SIGN_BIT) > (op2 ^ SIGN_BIT) {
		U256::one()
	} else {
		U256::zero()
	}
}

#[inline]
pub fn iszero(op1: U256) -> U256 {
	if op1 == U256::zero() {
		U256::one()
	} else {
		U256::zero()
	}
}

#[inline]
pub fn not(op1: U256) -> U256 {
	!op1
}

#[inline]
pub fn byte(op1: U256, op2: U256) -> U256 {
	if op1 < U256::from(32) {
		U256::from(op2.byte(31 - op1.as_usize()))
	} else {
		U256::zero()
	}
}

#[inline]
pub fn shl(shift: U256, value: U256) -> U256 {
	if value == U256::zero() || shift >= U256::from(256) {
		U256::zero()
	} else {
		value << shift.as_usize()
	}
}

#[inline]
pub fn shr(shift: U256, value: U256) -> U256 {
	if value == U256::zero() || shift >= U256::from(256) {
		U256::zero()
	} else {
		value >> shift.as_usize()
	}
}

/// Arithmetic shift right. Negative values shift in ones.
#[inline]
pub fn sar(shift: U256, value: U256) -> U256 {
	let negative = is_negative(value);

	if shift >= U256::from(256) {
		if negative {
			U256::MAX
		} else {
			U256::zero()
		}
	} else if negative {
		!((!value) >> shift.as_usize())
	} else {
		value >> shift.as_usize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn signed_comparison() {
		let minus_one = U256::MAX;
		assert_eq!(slt(minus_one, U256::zero()), U256::one());
		assert_eq!(sgt(minus_one, U256::zero()), U256::zero());
		assert_eq!(sgt(U256::one(), minus_one), U256::one());
		assert_eq!(slt(SIGN_BIT, minus_one), U256::one());
		assert_eq!(slt(U256::from(2), U256::from(3)), U256::one());
		assert_eq!(sgt(U256::from(3), U256::from(3)), U256::zero());
	}

	#[test]
	fn byte_indexes_from_most_significant() {
		let value = U256::from(0x1122);
		assert_eq!(byte(U256::from(31), value), U256::from(0x22));
		assert_eq!(byte(U256::from(30), value), U256::from(0x11));
		assert_eq!(byte(U256::from(32), value), U256::zero());
	}

	#[test]
	fn shifts() {
		assert_eq!(shl(U256::from(4), U256::one()), U256::from(16));
		assert_eq!(shr(U256::from(4), U256::from(16)), U256::one());
		assert_eq!(shl(U256::from(256), U256::one()), U256::zero());
		assert_eq!(sar(U256::from(4), U256::MAX), U256::MAX);
		assert_eq!(sar(U256::from(300), U256::MAX), U256::MAX);
		assert_eq!(sar(U256::from(300), U256::from(16)), U256::zero());
		assert_eq!(sar(U256::from(255), SIGN_BIT), U256::MAX);
		assert_eq!(
			sar(U256::from(1), U256::MAX - U256::from(15)),
			U256::MAX - U256::from(7)
		);
	}
}
