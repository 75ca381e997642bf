use crate::consts::*;
use crate::Config;
use evm_core::{available_words, ExitException, Opcode};
use primitive_types::U256;

/// Cost charged before an opcode executes. `None` for undefined opcodes.
/// Parts that depend on operands are charged separately by the dynamic
/// cost functions below.
pub fn static_cost(opcode: Opcode, config: &Config) -> Option<u64> {
	let cost = match opcode {
		Opcode::STOP | Opcode::RETURN | Opcode::REVERT | Opcode::INVALID => G_ZERO,
		Opcode::SSTORE => G_ZERO,

		Opcode::ADDRESS
		| Opcode::ORIGIN
		| Opcode::CALLER
		| Opcode::CALLVALUE
		| Opcode::CALLDATASIZE
		| Opcode::CODESIZE
		| Opcode::GASPRICE
		| Opcode::RETURNDATASIZE
		| Opcode::COINBASE
		| Opcode::TIMESTAMP
		| Opcode::NUMBER
		| Opcode::DIFFICULTY
		| Opcode::GASLIMIT
		| Opcode::CHAINID
		| Opcode::BASEFEE
		| Opcode::POP
		| Opcode::PC
		| Opcode::MSIZE
		| Opcode::GAS
		| Opcode::PUSH0 => G_BASE,

		Opcode::ADD
		| Opcode::SUB
		| Opcode::NOT
		| Opcode::LT
		| Opcode::GT
		| Opcode::SLT
		| Opcode::SGT
		| Opcode::EQ
		| Opcode::ISZERO
		| Opcode::AND
		| Opcode::OR
		| Opcode::XOR
		| Opcode::BYTE
		| Opcode::SHL
		| Opcode::SHR
		| Opcode::SAR
		| Opcode::CALLDATALOAD
		| Opcode::MLOAD
		| Opcode::MSTORE
		| Opcode::MSTORE8
		| Opcode::CALLDATACOPY
		| Opcode::CODECOPY
		| Opcode::RETURNDATACOPY
		| Opcode::MCOPY => G_VERYLOW,

		Opcode::MUL
		| Opcode::DIV
		| Opcode::SDIV
		| Opcode::MOD
		| Opcode::SMOD
		| Opcode::SIGNEXTEND
		| Opcode::SELFBALANCE => G_LOW,

		Opcode::ADDMOD | Opcode::MULMOD | Opcode::JUMP => G_MID,
		Opcode::JUMPI => G_HIGH,
		Opcode::JUMPDEST => G_JUMPDEST,

		Opcode::EXP => G_EXP,
		Opcode::SHA3 => G_SHA3,
		Opcode::BLOCKHASH => G_BLOCKHASH,
		Opcode::BALANCE => config.gas_balance,
		Opcode::EXTCODESIZE | Opcode::EXTCODECOPY => config.gas_ext_code,
		Opcode::EXTCODEHASH => config.gas_ext_code_hash,
		Opcode::SLOAD => config.gas_sload,

		Opcode::LOG0 => G_LOG,
		Opcode::LOG1 => G_LOG + G_LOGTOPIC,
		Opcode::LOG2 => G_LOG + 2 * G_LOGTOPIC,
		Opcode::LOG3 => G_LOG + 3 * G_LOGTOPIC,
		Opcode::LOG4 => G_LOG + 4 * G_LOGTOPIC,

		Opcode::CREATE | Opcode::CREATE2 => config.gas_create,
		Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => {
			config.gas_call
		}
		Opcode::SUICIDE => config.gas_suicide,

		op if op.is_push().is_some() => G_VERYLOW,
		op if (0x80..=0x9f).contains(&op.as_u8()) => G_VERYLOW,

		_ => return None,
	};

	Some(cost)
}

fn per_word(len: usize, word_cost: u64) -> Result<u64, ExitException> {
	let words = available_words(len) as u64;
	words.checked_mul(word_cost).ok_or(ExitException::OutOfGas)
}

/// Hashing cost of `len` bytes on top of the SHA3 base cost.
pub fn sha3_cost(len: usize) -> Result<u64, ExitException> {
	per_word(len, G_SHA3WORD)
}

/// Copy cost of `len` bytes for the `*COPY` family.
pub fn copy_cost(len: usize) -> Result<u64, ExitException> {
	per_word(len, G_COPY)
}

/// Data cost of a log record.
pub fn log_cost(len: usize) -> Result<u64, ExitException> {
	(len as u64)
		.checked_mul(G_LOGDATA)
		.ok_or(ExitException::OutOfGas)
}

/// Per-byte cost of the exponent.
pub fn exp_cost(power: U256, config: &Config) -> Result<u64, ExitException> {
	if power == U256::zero() {
		return Ok(0);
	}

	let bytes = (power.bits() as u64 + 7) / 8;
	config
		.gas_expbyte
		.checked_mul(bytes)
		.ok_or(ExitException::OutOfGas)
}

/// Hashing cost of CREATE2 init code.
pub fn create2_cost(len: usize) -> Result<u64, ExitException> {
	per_word(len, G_SHA3WORD)
}

/// Cost of storing `len` bytes of deployed code.
pub fn code_deposit_cost(len: usize, config: &Config) -> Result<u64, ExitException> {
	(len as u64)
		.checked_mul(config.gas_code_deposit)
		.ok_or(ExitException::OutOfGas)
}

/// SSTORE cost and refund, given the current and the new value of the slot.
pub fn sstore_cost(current: U256, new: U256, config: &Config) -> (u64, i64) {
	let cost = if current == U256::zero() && new != U256::zero() {
		config.gas_sstore_set
	} else {
		config.gas_sstore_reset
	};
	let refund = if current != U256::zero() && new == U256::zero() {
		config.refund_sstore_clears
	} else {
		0
	};

	(cost, refund)
}

/// Value transfer and account creation surcharge of a CALL-family opcode.
pub fn call_extra_cost(
	transfers_value: bool,
	is_call_or_callcode: bool,
	is_call_or_staticcall: bool,
	new_account: bool,
	config: &Config,
) -> u64 {
	let xfer = if is_call_or_callcode && transfers_value {
		config.gas_call_value
	} else {
		0
	};

	let new = if !is_call_or_staticcall || !new_account {
		0
	} else if config.empty_considered_exists || transfers_value {
		config.gas_new_account
	} else {
		0
	};

	xfer + new
}

/// Account creation surcharge of SUICIDE.
pub fn suicide_extra_cost(value: U256, target_exists: bool, config: &Config) -> u64 {
	let eip161 = !config.empty_considered_exists;
	let should_charge = if eip161 {
		value != U256::zero() && !target_exists
	} else {
		!target_exists
	};

	if should_charge {
		config.gas_suicide_new_account
	} else {
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tiers() {
		let config = Config::istanbul();
		assert_eq!(static_cost(Opcode::PUSH1, &config), Some(3));
		assert_eq!(static_cost(Opcode::ADD, &config), Some(3));
		assert_eq!(static_cost(Opcode::JUMP, &config), Some(8));
		assert_eq!(static_cost(Opcode::JUMPDEST, &config), Some(1));
		assert_eq!(static_cost(Opcode::DUP16, &config), Some(3));
		assert_eq!(static_cost(Opcode::SWAP16, &config), Some(3));
		assert_eq!(static_cost(Opcode::SLOAD, &config), Some(800));
		assert_eq!(static_cost(Opcode::LOG2, &config), Some(1125));
		assert_eq!(static_cost(Opcode(0x0c), &config), None);
		assert_eq!(static_cost(Opcode(0xef), &config), None);
	}

	#[test]
	fn every_defined_opcode_has_a_cost() {
		let config = Config::frontier();
		for (byte, info) in evm_core::info_table().iter().enumerate() {
			assert_eq!(
				static_cost(Opcode(byte as u8), &config).is_some(),
				info.is_some(),
				"opcode {:x}",
				byte
			);
		}
	}

	#[test]
	fn exp_byte_cost() {
		let config = Config::istanbul();
		assert_eq!(exp_cost(U256::zero(), &config), Ok(0));
		assert_eq!(exp_cost(U256::from(0xff), &config), Ok(50));
		assert_eq!(exp_cost(U256::from(0x100), &config), Ok(100));
		assert_eq!(exp_cost(U256::MAX, &config), Ok(32 * 50));
	}

	#[test]
	fn sstore_set_reset_and_refund() {
		let config = Config::istanbul();
		assert_eq!(sstore_cost(U256::zero(), U256::one(), &config), (20000, 0));
		assert_eq!(sstore_cost(U256::one(), U256::from(2), &config), (5000, 0));
		assert_eq!(sstore_cost(U256::one(), U256::zero(), &config), (5000, 15000));
		assert_eq!(sstore_cost(U256::zero(), U256::zero(), &config), (5000, 0));
	}

	#[test]
	fn call_surcharges() {
		let istanbul = Config::istanbul();
		assert_eq!(call_extra_cost(true, true, true, true, &istanbul), 34000);
		assert_eq!(call_extra_cost(false, true, true, true, &istanbul), 0);
		assert_eq!(call_extra_cost(true, true, false, true, &istanbul), 9000);

		let frontier = Config::frontier();
		assert_eq!(call_extra_cost(false, true, true, true, &frontier), 25000);
	}

	#[test]
	fn word_costs() {
		assert_eq!(sha3_cost(0), Ok(0));
		assert_eq!(sha3_cost(33), Ok(12));
		assert_eq!(copy_cost(32), Ok(3));
		assert_eq!(log_cost(10), Ok(80));
	}
}
