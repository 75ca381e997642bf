#[macro_use]
mod macros;
mod misc;
mod system;

use crate::{CallAction, CallScheme, CreateAction, Host, Interpreter, ReturnAction};
use alloc::boxed::Box;
use core::ops::{BitAnd, BitOr, BitXor};
use evm_core::eval::{arithmetic, bitwise};
use evm_core::{available_words, ExitError, ExitException, Memory, Opcode};
use primitive_types::U256;

/// Outcome of evaluating one opcode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Control {
	/// Advance the program counter by the given amount.
	Continue(usize),
	/// Jump to the given destination, pending validation.
	Jump(usize),
	/// Halt the frame.
	Exit(ReturnAction),
	/// Suspend for a nested call.
	Call(Box<CallAction>),
	/// Suspend for a nested create.
	Create(Box<CreateAction>),
}

/// Charge for and grow memory to cover `len` bytes at `offset`. A zero
/// length never touches memory, whatever the offset.
fn resize_memory(
	interp: &mut Interpreter,
	memory: &mut Memory,
	offset: U256,
	len: U256,
) -> Result<(usize, usize), ExitError> {
	if len.is_zero() {
		return Ok((0, 0));
	}

	let offset = as_usize_or_fail!(offset);
	let len = as_usize_or_fail!(len);
	let end = offset.checked_add(len).ok_or(ExitException::OutOfGas)?;

	interp.gasometer.record_memory(available_words(end))?;
	memory.resize(end)?;

	Ok((offset, len))
}

pub fn eval<H: Host + ?Sized>(
	interp: &mut Interpreter,
	opcode: Opcode,
	memory: &mut Memory,
	host: &mut H,
) -> Result<Control, ExitError> {
	match opcode {
		Opcode::STOP => misc::stop(),
		Opcode::ADD => op2_u256_tuple!(interp, overflowing_add),
		Opcode::MUL => op2_u256_tuple!(interp, overflowing_mul),
		Opcode::SUB => op2_u256_tuple!(interp, overflowing_sub),
		Opcode::DIV => op2_u256_fn!(interp, arithmetic::div),
		Opcode::SDIV => op2_u256_fn!(interp, arithmetic::sdiv),
		Opcode::MOD => op2_u256_fn!(interp, arithmetic::rem),
		Opcode::SMOD => op2_u256_fn!(interp, arithmetic::srem),
		Opcode::ADDMOD => op3_u256_fn!(interp, arithmetic::addmod),
		Opcode::MULMOD => op3_u256_fn!(interp, arithmetic::mulmod),
		Opcode::EXP => misc::exp(interp),
		Opcode::SIGNEXTEND => op2_u256_fn!(interp, arithmetic::signextend),

		Opcode::LT => op2_u256_bool_ref!(interp, lt),
		Opcode::GT => op2_u256_bool_ref!(interp, gt),
		Opcode::SLT => op2_u256_fn!(interp, bitwise::slt),
		Opcode::SGT => op2_u256_fn!(interp, bitwise::sgt),
		Opcode::EQ => op2_u256_bool_ref!(interp, eq),
		Opcode::ISZERO => op1_u256_fn!(interp, bitwise::iszero),
		Opcode::AND => op2_u256!(interp, bitand),
		Opcode::OR => op2_u256!(interp, bitor),
		Opcode::XOR => op2_u256!(interp, bitxor),
		Opcode::NOT => op1_u256_fn!(interp, bitwise::not),
		Opcode::BYTE => op2_u256_fn!(interp, bitwise::byte),
		Opcode::SHL => op2_u256_fn!(interp, bitwise::shl),
		Opcode::SHR => op2_u256_fn!(interp, bitwise::shr),
		Opcode::SAR => op2_u256_fn!(interp, bitwise::sar),

		Opcode::SHA3 => system::sha3(interp, memory),

		Opcode::ADDRESS => system::address(interp),
		Opcode::BALANCE => system::balance(interp, host),
		Opcode::ORIGIN => system::origin(interp, host),
		Opcode::CALLER => system::caller(interp),
		Opcode::CALLVALUE => system::callvalue(interp),
		Opcode::CALLDATALOAD => misc::calldataload(interp),
		Opcode::CALLDATASIZE => misc::calldatasize(interp),
		Opcode::CALLDATACOPY => misc::calldatacopy(interp, memory),
		Opcode::CODESIZE => misc::codesize(interp),
		Opcode::CODECOPY => misc::codecopy(interp, memory),
		Opcode::GASPRICE => system::gasprice(interp, host),
		Opcode::EXTCODESIZE => system::extcodesize(interp, host),
		Opcode::EXTCODECOPY => system::extcodecopy(interp, memory, host),
		Opcode::RETURNDATASIZE => misc::returndatasize(interp),
		Opcode::RETURNDATACOPY => misc::returndatacopy(interp, memory),
		Opcode::EXTCODEHASH => system::extcodehash(interp, host),

		Opcode::BLOCKHASH => system::blockhash(interp, host),
		Opcode::COINBASE => system::coinbase(interp, host),
		Opcode::TIMESTAMP => system::timestamp(interp, host),
		Opcode::NUMBER => system::number(interp, host),
		Opcode::DIFFICULTY => system::difficulty(interp, host),
		Opcode::GASLIMIT => system::gaslimit(interp, host),
		Opcode::CHAINID => system::chainid(interp, host),
		Opcode::SELFBALANCE => system::selfbalance(interp, host),
		Opcode::BASEFEE => system::base_fee(interp, host),

		Opcode::POP => misc::pop(interp),
		Opcode::MLOAD => misc::mload(interp, memory),
		Opcode::MSTORE => misc::mstore(interp, memory),
		Opcode::MSTORE8 => misc::mstore8(interp, memory),
		Opcode::SLOAD => system::sload(interp, host),
		Opcode::SSTORE => system::sstore(interp, host),
		Opcode::JUMP => misc::jump(interp),
		Opcode::JUMPI => misc::jumpi(interp),
		Opcode::PC => misc::pc(interp),
		Opcode::MSIZE => misc::msize(interp, memory),
		Opcode::GAS => misc::gas(interp),
		Opcode::JUMPDEST => Ok(Control::Continue(1)),
		Opcode::MCOPY => misc::mcopy(interp, memory),

		Opcode::PUSH0 => misc::push(interp, 0),
		op if op.is_push().is_some() => misc::push(interp, (op.as_u8() - 0x5f) as usize),
		op if (0x80..=0x8f).contains(&op.as_u8()) => misc::dup(interp, (op.as_u8() - 0x7f) as usize),
		op if (0x90..=0x9f).contains(&op.as_u8()) => misc::swap(interp, (op.as_u8() - 0x8f) as usize),
		op if (0xa0..=0xa4).contains(&op.as_u8()) => {
			system::log(interp, memory, op.as_u8() - 0xa0, host)
		}

		Opcode::CREATE => system::create(interp, memory, false),
		Opcode::CREATE2 => system::create(interp, memory, true),
		Opcode::CALL => system::call(interp, memory, CallScheme::Call, host),
		Opcode::CALLCODE => system::call(interp, memory, CallScheme::CallCode, host),
		Opcode::DELEGATECALL => system::call(interp, memory, CallScheme::DelegateCall, host),
		Opcode::STATICCALL => system::call(interp, memory, CallScheme::StaticCall, host),
		Opcode::RETURN => misc::ret(interp, memory),
		Opcode::REVERT => misc::revert(interp, memory),
		Opcode::INVALID => Err(ExitException::DesignatedInvalid.into()),
		Opcode::SUICIDE => system::suicide(interp, host),

		_ => Err(ExitException::InvalidOpcode(opcode).into()),
	}
}
