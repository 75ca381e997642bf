use super::{resize_memory, Control};
use crate::{Interpreter, ReturnAction, ReturnStatus};
use alloc::vec::Vec;
use core::cmp::min;
use evm_core::eval::arithmetic;
use evm_core::{ExitError, ExitException, Memory};
use evm_gasometer::{copy_cost, exp_cost};
use primitive_types::U256;

pub fn stop() -> Result<Control, ExitError> {
	Ok(Control::Exit(ReturnAction {
		output: Vec::new(),
		result: ReturnStatus::Stopped,
	}))
}

pub fn exp(interp: &mut Interpreter) -> Result<Control, ExitError> {
	pop_u256!(interp, op1, op2);
	let cost = exp_cost(op2, interp.gasometer.config())?;
	interp.gasometer.record_cost(cost)?;
	push_u256!(interp, arithmetic::exp(op1, op2));

	Ok(Control::Continue(1))
}

pub fn codesize(interp: &mut Interpreter) -> Result<Control, ExitError> {
	let size = U256::from(interp.contract.code.len());
	push_u256!(interp, size);
	Ok(Control::Continue(1))
}

pub fn codecopy(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, memory_offset, code_offset, len);

	let (_, ulen) = resize_memory(interp, memory, memory_offset, len)?;
	interp.gasometer.record_cost(copy_cost(ulen)?)?;
	memory.copy_large(memory_offset, code_offset, len, &interp.contract.code)?;

	Ok(Control::Continue(1))
}

pub fn calldataload(interp: &mut Interpreter) -> Result<Control, ExitError> {
	pop_u256!(interp, index);

	let mut load = [0u8; 32];
	#[allow(clippy::needless_range_loop)]
	for i in 0..32 {
		if let Some(p) = index.checked_add(U256::from(i)) {
			if p <= U256::from(usize::MAX) {
				let p = p.as_usize();
				if p < interp.contract.input.len() {
					load[i] = interp.contract.input[p];
				}
			}
		}
	}

	push_h256!(interp, load);
	Ok(Control::Continue(1))
}

pub fn calldatasize(interp: &mut Interpreter) -> Result<Control, ExitError> {
	let len = U256::from(interp.contract.input.len());
	push_u256!(interp, len);
	Ok(Control::Continue(1))
}

pub fn calldatacopy(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, memory_offset, data_offset, len);

	let (_, ulen) = resize_memory(interp, memory, memory_offset, len)?;
	interp.gasometer.record_cost(copy_cost(ulen)?)?;
	memory.copy_large(memory_offset, data_offset, len, &interp.contract.input)?;

	Ok(Control::Continue(1))
}

pub fn returndatasize(interp: &mut Interpreter) -> Result<Control, ExitError> {
	let size = U256::from(interp.return_data.len());
	push_u256!(interp, size);
	Ok(Control::Continue(1))
}

pub fn returndatacopy(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, memory_offset, data_offset, len);

	if data_offset
		.checked_add(len)
		.map(|l| l > U256::from(interp.return_data.len()))
		.unwrap_or(true)
	{
		return Err(ExitException::OutOfOffset.into());
	}

	let (_, ulen) = resize_memory(interp, memory, memory_offset, len)?;
	interp.gasometer.record_cost(copy_cost(ulen)?)?;
	memory.copy_large(memory_offset, data_offset, len, &interp.return_data)?;

	Ok(Control::Continue(1))
}

pub fn pop(interp: &mut Interpreter) -> Result<Control, ExitError> {
	pop_u256!(interp, _val);
	Ok(Control::Continue(1))
}

pub fn mload(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, index);
	let (index, _) = resize_memory(interp, memory, index, U256::from(32))?;
	push_u256!(interp, memory.get_u256(index));
	Ok(Control::Continue(1))
}

pub fn mstore(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, index, value);
	let (index, _) = resize_memory(interp, memory, index, U256::from(32))?;
	memory.set_word(index, value)?;
	Ok(Control::Continue(1))
}

pub fn mstore8(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, index, value);
	let (index, _) = resize_memory(interp, memory, index, U256::one())?;
	memory.set_byte(index, (value.low_u32() & 0xff) as u8)?;
	Ok(Control::Continue(1))
}

pub fn mcopy(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, dst, src, len);

	// Both regions must be paid for; the larger end decides the size.
	let (src, ulen) = resize_memory(interp, memory, src, len)?;
	let (dst, _) = resize_memory(interp, memory, dst, len)?;
	interp.gasometer.record_cost(copy_cost(ulen)?)?;
	memory.copy(dst, src, ulen)?;

	Ok(Control::Continue(1))
}

pub fn jump(interp: &mut Interpreter) -> Result<Control, ExitError> {
	pop_u256!(interp, dest);
	let dest = as_usize_or_fail!(dest, ExitException::InvalidJump);

	Ok(Control::Jump(dest))
}

pub fn jumpi(interp: &mut Interpreter) -> Result<Control, ExitError> {
	pop_u256!(interp, dest, value);

	if value != U256::zero() {
		let dest = as_usize_or_fail!(dest, ExitException::InvalidJump);
		Ok(Control::Jump(dest))
	} else {
		Ok(Control::Continue(1))
	}
}

pub fn pc(interp: &mut Interpreter) -> Result<Control, ExitError> {
	push_u256!(interp, U256::from(interp.position));
	Ok(Control::Continue(1))
}

pub fn msize(interp: &mut Interpreter, memory: &Memory) -> Result<Control, ExitError> {
	push_u256!(interp, U256::from(memory.len()));
	Ok(Control::Continue(1))
}

pub fn gas(interp: &mut Interpreter) -> Result<Control, ExitError> {
	push_u256!(interp, U256::from(interp.gasometer.gas()));
	Ok(Control::Continue(1))
}

pub fn push(interp: &mut Interpreter, n: usize) -> Result<Control, ExitError> {
	let start = interp.position + 1;
	let end = min(start + n, interp.contract.code.len());
	let slice: &[u8] = if start < end {
		&interp.contract.code[start..end]
	} else {
		&[]
	};

	// Immediate bytes missing at the end of the code read as zero.
	let mut val = [0u8; 32];
	val[(32 - n)..(32 - n + slice.len())].copy_from_slice(slice);

	push_h256!(interp, val);
	Ok(Control::Continue(1 + n))
}

pub fn dup(interp: &mut Interpreter, n: usize) -> Result<Control, ExitError> {
	interp.stack.dup(n)?;
	Ok(Control::Continue(1))
}

pub fn swap(interp: &mut Interpreter, n: usize) -> Result<Control, ExitError> {
	interp.stack.swap(n)?;
	Ok(Control::Continue(1))
}

fn output(interp: &mut Interpreter, memory: &mut Memory) -> Result<Vec<u8>, ExitError> {
	pop_u256!(interp, start, len);
	let (start, len) = resize_memory(interp, memory, start, len)?;
	Ok(memory.get(start, len))
}

pub fn ret(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	let output = output(interp, memory)?;
	Ok(Control::Exit(ReturnAction {
		output,
		result: ReturnStatus::Returned,
	}))
}

pub fn revert(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	let output = output(interp, memory)?;
	Ok(Control::Exit(ReturnAction {
		output,
		result: ReturnStatus::Reverted,
	}))
}
