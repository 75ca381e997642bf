use super::{resize_memory, Control};
use crate::{
	CallAction, CallScheme, Context, CreateAction, CreateScheme, Host, Interpreter, Log,
	Pending, ReturnAction, ReturnStatus, Transfer,
};
use alloc::boxed::Box;
use alloc::vec::Vec;
use evm_core::{ExitError, ExitException, Memory};
use evm_gasometer::{
	call_extra_cost, call_gas, copy_cost, create2_cost, create_gas, log_cost, sha3_cost,
	sstore_cost, suicide_extra_cost,
};
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

pub fn sha3(interp: &mut Interpreter, memory: &mut Memory) -> Result<Control, ExitError> {
	pop_u256!(interp, from, len);

	let (from, len) = resize_memory(interp, memory, from, len)?;
	interp.gasometer.record_cost(sha3_cost(len)?)?;
	let data = memory.get(from, len);

	let ret = Keccak256::digest(data.as_slice());
	push_h256!(interp, H256::from_slice(ret.as_slice()));

	Ok(Control::Continue(1))
}

pub fn chainid<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().chain_id);
	Ok(Control::Continue(1))
}

pub fn address(interp: &mut Interpreter) -> Result<Control, ExitError> {
	let ret = H256::from(interp.contract.address);
	push_h256!(interp, ret);
	Ok(Control::Continue(1))
}

pub fn balance<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	pop_h256!(interp, address);
	let account = host.get_account(address.into())?;
	push_u256!(interp, account.balance);
	Ok(Control::Continue(1))
}

pub fn selfbalance<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &H,
) -> Result<Control, ExitError> {
	let account = host.get_account(interp.contract.address)?;
	push_u256!(interp, account.balance);
	Ok(Control::Continue(1))
}

pub fn origin<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	let ret = H256::from(host.environment().origin);
	push_h256!(interp, ret);
	Ok(Control::Continue(1))
}

pub fn caller(interp: &mut Interpreter) -> Result<Control, ExitError> {
	let ret = H256::from(interp.contract.caller);
	push_h256!(interp, ret);
	Ok(Control::Continue(1))
}

pub fn callvalue(interp: &mut Interpreter) -> Result<Control, ExitError> {
	push_u256!(interp, interp.contract.value);
	Ok(Control::Continue(1))
}

pub fn gasprice<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().gas_price);
	Ok(Control::Continue(1))
}

pub fn base_fee<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().block_base_fee_per_gas);
	Ok(Control::Continue(1))
}

pub fn extcodesize<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &H,
) -> Result<Control, ExitError> {
	pop_h256!(interp, address);
	let account = host.get_account(address.into())?;
	push_u256!(interp, U256::from(account.code.len()));
	Ok(Control::Continue(1))
}

pub fn extcodehash<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &H,
) -> Result<Control, ExitError> {
	pop_h256!(interp, address);
	let account = host.get_account(address.into())?;
	let hash = if account.is_empty() {
		H256::default()
	} else {
		account.code_hash
	};
	push_h256!(interp, hash);
	Ok(Control::Continue(1))
}

pub fn extcodecopy<H: Host + ?Sized>(
	interp: &mut Interpreter,
	memory: &mut Memory,
	host: &H,
) -> Result<Control, ExitError> {
	pop_h256!(interp, address);
	pop_u256!(interp, memory_offset, code_offset, len);

	let (_, ulen) = resize_memory(interp, memory, memory_offset, len)?;
	interp.gasometer.record_cost(copy_cost(ulen)?)?;
	let account = host.get_account(address.into())?;
	memory.copy_large(memory_offset, code_offset, len, &account.code)?;

	Ok(Control::Continue(1))
}

pub fn blockhash<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	pop_u256!(interp, number);
	push_h256!(interp, host.environment().block_hash(number));
	Ok(Control::Continue(1))
}

pub fn coinbase<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_h256!(interp, H256::from(host.environment().block_coinbase));
	Ok(Control::Continue(1))
}

pub fn timestamp<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().block_timestamp);
	Ok(Control::Continue(1))
}

pub fn number<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().block_number);
	Ok(Control::Continue(1))
}

pub fn difficulty<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &H,
) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().block_difficulty);
	Ok(Control::Continue(1))
}

pub fn gaslimit<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	push_u256!(interp, host.environment().block_gas_limit);
	Ok(Control::Continue(1))
}

pub fn sload<H: Host + ?Sized>(interp: &mut Interpreter, host: &H) -> Result<Control, ExitError> {
	pop_u256!(interp, index);
	let value = host.get_storage(interp.contract.address, index)?;
	push_u256!(interp, value);

	Ok(Control::Continue(1))
}

pub fn sstore<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &mut H,
) -> Result<Control, ExitError> {
	if interp.is_static {
		return Err(ExitException::StaticModeViolation.into());
	}
	pop_u256!(interp, index, value);

	let current = host.get_storage(interp.contract.address, index)?;
	let (cost, refund) = sstore_cost(current, value, interp.gasometer.config());
	interp.gasometer.record_cost(cost)?;
	interp.gasometer.record_refund(refund);

	host.set_storage(interp.contract.address, index, value)?;
	Ok(Control::Continue(1))
}

pub fn log<H: Host + ?Sized>(
	interp: &mut Interpreter,
	memory: &mut Memory,
	n: u8,
	host: &mut H,
) -> Result<Control, ExitError> {
	if interp.is_static {
		return Err(ExitException::StaticModeViolation.into());
	}
	pop_u256!(interp, offset, len);

	let (offset, len) = resize_memory(interp, memory, offset, len)?;
	interp.gasometer.record_cost(log_cost(len)?)?;
	let data = memory.get(offset, len);

	let mut topics = Vec::with_capacity(n as usize);
	for _ in 0..(n as usize) {
		topics.push(interp.stack.pop_h256()?);
	}

	host.log(Log {
		address: interp.contract.address,
		topics,
		data,
	})?;
	Ok(Control::Continue(1))
}

pub fn suicide<H: Host + ?Sized>(
	interp: &mut Interpreter,
	host: &mut H,
) -> Result<Control, ExitError> {
	if interp.is_static {
		return Err(ExitException::StaticModeViolation.into());
	}
	pop_h256!(interp, target);
	let target: H160 = target.into();

	let balance = host.get_account(interp.contract.address)?.balance;
	let target_exists = !host.get_account(target)?.is_empty();
	let config = interp.gasometer.config();
	interp
		.gasometer
		.record_cost(suicide_extra_cost(balance, target_exists, config))?;

	if host.self_destruct(interp.contract.address, target)? {
		interp.gasometer.record_refund(config.refund_suicide);
	}

	Ok(Control::Exit(ReturnAction {
		output: Vec::new(),
		result: ReturnStatus::Stopped,
	}))
}

pub fn create(
	interp: &mut Interpreter,
	memory: &mut Memory,
	is_create2: bool,
) -> Result<Control, ExitError> {
	if interp.is_static {
		return Err(ExitException::StaticModeViolation.into());
	}
	interp.return_data = Vec::new();

	pop_u256!(interp, value, code_offset, len);

	let (code_offset, len) = resize_memory(interp, memory, code_offset, len)?;
	if let Some(limit) = interp.config.max_initcode_size {
		if len > limit {
			return Err(ExitException::CreateContractLimit.into());
		}
	}
	let init_code = memory.get(code_offset, len);

	let scheme = if is_create2 {
		pop_h256!(interp, salt);
		interp.gasometer.record_cost(create2_cost(len)?)?;
		let code_hash = H256::from_slice(Keccak256::digest(&init_code).as_slice());
		CreateScheme::Create2 {
			caller: interp.contract.address,
			code_hash,
			salt,
		}
	} else {
		CreateScheme::Legacy {
			caller: interp.contract.address,
		}
	};

	let gas = create_gas(interp.gasometer.gas());
	interp.gasometer.record_cost(gas)?;
	interp.pending = Some(Pending::Create);

	Ok(Control::Create(Box::new(CreateAction {
		scheme,
		init_code,
		value,
		gas,
	})))
}

pub fn call<H: Host + ?Sized>(
	interp: &mut Interpreter,
	memory: &mut Memory,
	scheme: CallScheme,
	host: &H,
) -> Result<Control, ExitError> {
	interp.return_data = Vec::new();

	pop_u256!(interp, gas);
	pop_h256!(interp, to);
	let to: H160 = to.into();

	let value = match scheme {
		CallScheme::Call | CallScheme::CallCode => {
			pop_u256!(interp, value);
			value
		}
		CallScheme::DelegateCall | CallScheme::StaticCall => U256::zero(),
	};

	pop_u256!(interp, in_offset, in_len, out_offset, out_len);

	if interp.is_static && scheme == CallScheme::Call && value != U256::zero() {
		return Err(ExitException::StaticModeViolation.into());
	}

	let (in_offset, in_len) = resize_memory(interp, memory, in_offset, in_len)?;
	let (out_offset, out_len) = resize_memory(interp, memory, out_offset, out_len)?;

	let transfers_value = value != U256::zero();
	let is_call_or_callcode = matches!(scheme, CallScheme::Call | CallScheme::CallCode);
	let is_call_or_staticcall = matches!(scheme, CallScheme::Call | CallScheme::StaticCall);
	let new_account = is_call_or_staticcall && host.get_account(to)?.is_empty();
	interp.gasometer.record_cost(call_extra_cost(
		transfers_value,
		is_call_or_callcode,
		is_call_or_staticcall,
		new_account,
		interp.gasometer.config(),
	))?;

	let gas = call_gas(gas, interp.gasometer.gas());
	interp.gasometer.record_cost(gas)?;
	let gas = if transfers_value {
		gas.saturating_add(interp.gasometer.config().call_stipend)
	} else {
		gas
	};

	let input = memory.get(in_offset, in_len);

	let context = match scheme {
		CallScheme::Call | CallScheme::StaticCall => Context {
			address: to,
			caller: interp.contract.address,
			apparent_value: value,
		},
		CallScheme::CallCode => Context {
			address: interp.contract.address,
			caller: interp.contract.address,
			apparent_value: value,
		},
		CallScheme::DelegateCall => Context {
			address: interp.contract.address,
			caller: interp.contract.caller,
			apparent_value: interp.contract.value,
		},
	};

	let transfer = match scheme {
		CallScheme::Call => Some(Transfer {
			source: interp.contract.address,
			target: to,
			value,
		}),
		CallScheme::CallCode => Some(Transfer {
			source: interp.contract.address,
			target: interp.contract.address,
			value,
		}),
		CallScheme::DelegateCall | CallScheme::StaticCall => None,
	};

	interp.pending = Some(Pending::Call {
		out_offset,
		out_len,
	});

	Ok(Control::Call(Box::new(CallAction {
		scheme,
		code_address: to,
		context,
		transfer,
		input,
		gas,
		is_static: interp.is_static || scheme == CallScheme::StaticCall,
	})))
}
