use core::ops::Rem;
use primitive_types::{U256, U512};

/// Most significant bit, the sign of a two's complement word.
pub(crate) const SIGN_BIT: U256 = U256([0, 0, 0, 0x8000000000000000]);

#[inline]
pub(crate) fn is_negative(v: U256) -> bool {
	v.bit(255)
}

/// Two's complement negation. The minimum value negates to itself.
#[inline]
pub(crate) fn negate(v: U256) -> U256 {
	(!v).overflowing_add(U256::one()).0
}

/// Magnitude of a signed word, as an unsigned value.
#[inline]
pub(crate) fn abs(v: U256) -> U256 {
	if is_negative(v) {
		negate(v)
	} else {
		v
	}
}

#[inline]
pub fn div(op1: U256, op2: U256) -> U256 {
	if op2 == U256::zero() {
		U256::zero()
	} else {
		op1 / op2
	}
}

#[inline]
pub fn sdiv(op1: U256, op2: U256) -> U256 {
	if op2 == U256::zero() {
		return U256::zero();
	}

	let quotient = abs(op1) / abs(op2);
	if is_negative(op1) != is_negative(op2) {
		negate(quotient)
	} else {
		quotient
	}
}

#[inline]
pub fn rem(op1: U256, op2: U256) -> U256 {
	if op2 == U256::zero() {
		U256::zero()
	} else {
		op1.rem(op2)
	}
}

/// Signed remainder. The result takes the sign of the dividend.
#[inline]
pub fn srem(op1: U256, op2: U256) -> U256 {
	if op2 == U256::zero() {
		return U256::zero();
	}

	let remainder = abs(op1) % abs(op2);
	if is_negative(op1) {
		negate(remainder)
	} else {
		remainder
	}
}

// Results of a modulo by a `U256` always fit into the lower half.
fn low_u256(v: U512) -> U256 {
	let U512(ref limbs) = v;
	U256([limbs[0], limbs[1], limbs[2], limbs[3]])
}

#[inline]
pub fn addmod(op1: U256, op2: U256, op3: U256) -> U256 {
	let op1: U512 = op1.into();
	let op2: U512 = op2.into();
	let op3: U512 = op3.into();

	if op3 == U512::zero() {
		U256::zero()
	} else {
		low_u256((op1 + op2) % op3)
	}
}

#[inline]
pub fn mulmod(op1: U256, op2: U256, op3: U256) -> U256 {
	let op1: U512 = op1.into();
	let op2: U512 = op2.into();
	let op3: U512 = op3.into();

	if op3 == U512::zero() {
		U256::zero()
	} else {
		low_u256((op1 * op2) % op3)
	}
}

#[inline]
pub fn exp(op1: U256, op2: U256) -> U256 {
	let mut op1 = op1;
	let mut op2 = op2;
	let mut r: U256 = 1.into();

	while op2 != 0.into() {
		if op2 & 1.into() != 0.into() {
			r = r.overflowing_mul(op1).0;
		}
		op2 >>= 1;
		op1 = op1.overflowing_mul(op1).0;
	}

	r
}

/// In the yellow paper `SIGNEXTEND` is defined to take two inputs, we will
/// call the first `b` and the second `x`. The byte `b` counts from the right,
/// so the sign bit is `8 * b + 7`. Every bit above it is set to the sign bit.
#[inline]
pub fn signextend(op1: U256, op2: U256) -> U256 {
	if op1 < U256::from(32) {
		// `low_u32` works since op1 < 32
		let bit_index = (8 * op1.low_u32() + 7) as usize;
		let bit = op2.bit(bit_index);
		let mask = (U256::one() << bit_index) - U256::one();
		if bit {
			op2 | !mask
		} else {
			op2 & mask
		}
	} else {
		op2
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn division_by_zero_is_zero() {
		assert_eq!(div(U256::from(7), U256::zero()), U256::zero());
		assert_eq!(sdiv(U256::from(7), U256::zero()), U256::zero());
		assert_eq!(rem(U256::from(7), U256::zero()), U256::zero());
		assert_eq!(srem(U256::from(7), U256::zero()), U256::zero());
	}

	#[test]
	fn signed_division() {
		let minus = |v: u64| negate(U256::from(v));
		let min = SIGN_BIT;

		assert_eq!(sdiv(U256::from(100), minus(1)), minus(100));
		assert_eq!(sdiv(minus(100), minus(2)), U256::from(50));
		assert_eq!(sdiv(minus(7), U256::from(2)), minus(3));
		assert_eq!(sdiv(min, minus(1)), min);
		assert_eq!(sdiv(min, U256::one()), min);
		assert_eq!(sdiv(SIGN_BIT - 1, minus(1)), negate(SIGN_BIT - 1));
	}

	#[test]
	fn signed_remainder_keeps_dividend_sign() {
		let minus = |v: u64| negate(U256::from(v));

		assert_eq!(srem(U256::from(7), minus(3)), U256::one());
		assert_eq!(srem(minus(7), U256::from(3)), U256::MAX);
		assert_eq!(srem(minus(6), U256::from(3)), U256::zero());
		assert_eq!(srem(SIGN_BIT, minus(1)), U256::zero());
	}

	#[test]
	fn modular_arithmetic_does_not_wrap() {
		assert_eq!(addmod(U256::MAX, U256::from(2), U256::MAX), U256::from(2));
		assert_eq!(
			mulmod(U256::MAX, U256::MAX, U256::from(12)),
			U256::from(9)
		);
		assert_eq!(addmod(U256::one(), U256::one(), U256::zero()), U256::zero());
	}

	#[test]
	fn exp_wraps() {
		assert_eq!(exp(U256::from(2), U256::from(10)), U256::from(1024));
		assert_eq!(exp(U256::from(2), U256::from(256)), U256::zero());
		assert_eq!(exp(U256::zero(), U256::zero()), U256::one());
	}

	#[test]
	fn signextend_byte() {
		assert_eq!(signextend(U256::zero(), U256::from(0xff)), U256::MAX);
		assert_eq!(signextend(U256::zero(), U256::from(0x7f)), U256::from(0x7f));
		assert_eq!(signextend(U256::from(40), U256::from(0xff)), U256::from(0xff));
	}
}
