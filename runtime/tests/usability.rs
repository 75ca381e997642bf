use evm_runtime::{
	AccountInfo, Action, CallScheme, Contract, CreateScheme, Environment, ExitError,
	ExitException, ExitFatal, ExitSucceed, FrameResult, Host, Interpreter, InterpreterStatus,
	JournalCheckpoint, Log, Memory, ReturnStatus, RuntimeConfig,
};
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};
use std::rc::Rc;

const CODE1: &str = "60e060020a6000350480632839e92814601e57806361047ff414603457005b602a6004356024356047565b8060005260206000f35b603d6004356099565b8060005260206000f35b600082600014605457605e565b8160010190506093565b81600014606957607b565b60756001840360016047565b90506093565b609060018403608c85600186036047565b6047565b90505b92915050565b6000816000148060a95750816001145b60b05760b7565b81905060cf565b60c1600283036099565b60cb600184036099565b0190505b91905056";
const DATA1: &str = "2839e92800000000000000000000000000000000000000000000000000000000000000030000000000000000000000000000000000000000000000000000000000000001";
const RET1: &str = "000000000000000000000000000000000000000000000000000000000000000d";

pub struct UnimplementedHost;

impl Host for UnimplementedHost {
	fn environment(&self) -> &Environment {
		unimplemented!()
	}
	fn get_account(&self, _address: H160) -> Result<AccountInfo, ExitError> {
		unimplemented!()
	}
	fn set_balance(&mut self, _address: H160, _balance: U256) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn set_nonce(&mut self, _address: H160, _nonce: u64) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn set_code(&mut self, _address: H160, _code: Vec<u8>) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn get_storage(&self, _address: H160, _key: U256) -> Result<U256, ExitError> {
		unimplemented!()
	}
	fn set_storage(&mut self, _address: H160, _key: U256, _value: U256) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn create_account(&mut self, _address: H160, _info: AccountInfo) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn self_destruct(&mut self, _address: H160, _beneficiary: H160) -> Result<bool, ExitError> {
		unimplemented!()
	}
	fn log(&mut self, _log: Log) -> Result<(), ExitError> {
		unimplemented!()
	}
	fn checkpoint(&mut self) -> JournalCheckpoint {
		unimplemented!()
	}
	fn commit(&mut self, _checkpoint: JournalCheckpoint) {
		unimplemented!()
	}
	fn revert_to_checkpoint(&mut self, _checkpoint: JournalCheckpoint) -> Result<(), ExitError> {
		unimplemented!()
	}
}

static CONFIG: RuntimeConfig = RuntimeConfig::new();

fn interpreter(code: &str, data: &str, gas_limit: u64, is_static: bool) -> Interpreter<'static> {
	let contract = Contract::new(
		Rc::new(hex::decode(code).unwrap()),
		hex::decode(data).unwrap(),
		H160::repeat_byte(0xca),
		H160::repeat_byte(0x11),
		U256::zero(),
	);
	Interpreter::new(contract, gas_limit, is_static, 0, &CONFIG)
}

fn memory() -> Memory {
	Memory::new(CONFIG.memory_limit)
}

#[test]
fn push_add() {
	let mut vm = interpreter("6001600201", "", 100, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	match action {
		Action::Return(ret) => {
			assert_eq!(ret.result, ReturnStatus::Stopped);
			assert!(ret.output.is_empty());
		}
		other => panic!("unexpected action {:?}", other),
	}
	assert_eq!(vm.gasometer().used_gas(), 9);
	assert_eq!(vm.stack().peek(0), Ok(U256::from(3)));
	assert_eq!(vm.status(), &InterpreterStatus::Stopped);
}

#[test]
fn jump_to_jumpdest() {
	let mut vm = interpreter("600456fd5b6001", "", 100, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	assert!(matches!(
		action,
		Action::Return(ref ret) if ret.result == ReturnStatus::Stopped
	));
	assert_eq!(vm.gasometer().used_gas(), 15);
	assert_eq!(vm.stack().peek(0), Ok(U256::one()));
}

#[test]
fn jump_into_nowhere() {
	let mut vm = interpreter("600356fd5b6001", "", 100, false);
	let mut memory = memory();

	let result = vm.run(&mut memory, &mut UnimplementedHost);
	assert_eq!(result, Err(ExitException::InvalidJump.into()));
	assert_eq!(vm.gasometer().gas(), 0);
	assert!(matches!(vm.status(), InterpreterStatus::Faulted(_)));

	assert_eq!(
		vm.step(&mut memory, &mut UnimplementedHost),
		Err(ExitFatal::AlreadyExited.into())
	);
}

#[test]
fn stack_and_opcode_faults() {
	let mut memory = memory();

	let mut vm = interpreter("01", "", 100, false);
	assert_eq!(
		vm.run(&mut memory, &mut UnimplementedHost),
		Err(ExitException::StackUnderflow.into())
	);

	let mut vm = interpreter("0c", "", 100, false);
	assert_eq!(
		vm.run(&mut memory, &mut UnimplementedHost),
		Err(ExitException::InvalidOpcode(evm_runtime::Opcode(0x0c)).into())
	);

	let mut vm = interpreter("6001600201", "", 8, false);
	assert_eq!(
		vm.run(&mut memory, &mut UnimplementedHost),
		Err(ExitException::OutOfGas.into())
	);
	assert_eq!(vm.gasometer().used_gas(), 8);
}

#[test]
fn fibonacci_contract() {
	let mut vm = interpreter(CODE1, DATA1, 1_000_000, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	match action {
		Action::Return(ret) => {
			assert_eq!(ret.result, ReturnStatus::Returned);
			assert_eq!(ret.output, hex::decode(RET1).unwrap());
		}
		other => panic!("unexpected action {:?}", other),
	}
}

#[test]
fn create_suspends_with_init_code() {
	// MSTORE(0, 0x6001600155), CREATE(0, 27, 5), STOP
	let mut vm = interpreter("6460016001556000526005601b6000f000", "", 100_000, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	let create = match action {
		Action::Create(create) => create,
		other => panic!("unexpected action {:?}", other),
	};
	assert_eq!(create.init_code, hex::decode("6001600155").unwrap());
	assert_eq!(create.value, U256::zero());
	assert_eq!(
		create.scheme,
		CreateScheme::Legacy {
			caller: H160::repeat_byte(0x11)
		}
	);
	assert_eq!(create.gas, 66917);
	assert_eq!(vm.status(), &InterpreterStatus::CallOrCreate);

	let created = H160::repeat_byte(0xcc);
	vm.feedback(
		FrameResult {
			reason: Ok(ExitSucceed::Returned),
			output: Vec::new(),
			gas_left: 60000,
			refunded: 0,
			created: Some(created),
		},
		&mut memory,
	)
	.unwrap();

	assert_eq!(vm.status(), &InterpreterStatus::Running);
	assert_eq!(vm.stack().peek(0), Ok(U256::from_big_endian(&created[..])));
	// 21 for the setup, 32000 for CREATE, 66917 forwarded and 60000 returned
	assert_eq!(vm.gasometer().used_gas(), 38938);

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	assert!(matches!(action, Action::Return(_)));
}

#[test]
fn create2_carries_salt_and_hash() {
	// MSTORE(0, 0x6001600155), CREATE2(0, 27, 5, 0x42)
	let mut vm = interpreter("64600160015560005260426005601b6000f5", "", 100_000, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	let create = match action {
		Action::Create(create) => create,
		other => panic!("unexpected action {:?}", other),
	};

	let init_code = hex::decode("6001600155").unwrap();
	assert_eq!(create.init_code, init_code);
	assert_eq!(
		create.scheme,
		CreateScheme::Create2 {
			caller: H160::repeat_byte(0x11),
			code_hash: H256::from_slice(Keccak256::digest(&init_code).as_slice()),
			salt: H256::from_low_u64_be(0x42),
		}
	);
}

#[test]
fn call_output_is_copied_on_feedback() {
	// DELEGATECALL(0xffff, 0x1234, 0, 0, 0, 32), MLOAD(0), STOP
	let mut vm = interpreter("60206000600060006112346201fffff4600051", "", 1_000_000, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	let call = match action {
		Action::Call(call) => call,
		other => panic!("unexpected action {:?}", other),
	};
	assert_eq!(call.scheme, CallScheme::DelegateCall);
	assert_eq!(call.code_address, H160::from_low_u64_be(0x1234));
	assert_eq!(call.context.address, H160::repeat_byte(0x11));
	assert_eq!(call.context.caller, H160::repeat_byte(0xca));
	assert_eq!(call.gas, 0x1ffff);
	assert!(call.transfer.is_none());
	assert!(!call.is_static);

	vm.feedback(
		FrameResult {
			reason: Ok(ExitSucceed::Returned),
			output: vec![0xab; 40],
			gas_left: 0x1ffff,
			refunded: 0,
			created: None,
		},
		&mut memory,
	)
	.unwrap();
	assert_eq!(vm.return_data().len(), 40);

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	assert!(matches!(action, Action::Return(_)));
	assert_eq!(vm.stack().peek(0), Ok(U256::from_big_endian(&[0xab; 32])));
	assert_eq!(vm.stack().peek(1), Ok(U256::one()));
}

#[test]
fn failed_call_pushes_zero() {
	let mut vm = interpreter("60206000600060006112346201fffff4", "", 1_000_000, false);
	let mut memory = memory();

	vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	vm.feedback(
		FrameResult::failed(ExitException::OutOfGas.into(), 0),
		&mut memory,
	)
	.unwrap();

	vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	assert_eq!(vm.stack().peek(0), Ok(U256::zero()));
	assert_eq!(memory.get(0, 32), vec![0; 32]);
}

#[test]
fn static_frame_cannot_write() {
	let mut memory = memory();

	let mut vm = interpreter("6001600055", "", 100_000, true);
	assert_eq!(
		vm.run(&mut memory, &mut UnimplementedHost),
		Err(ExitException::StaticModeViolation.into())
	);

	let mut vm = interpreter("60006000a0", "", 100_000, true);
	assert_eq!(
		vm.run(&mut memory, &mut UnimplementedHost),
		Err(ExitException::StaticModeViolation.into())
	);
}

#[test]
fn revert_keeps_gas() {
	// MSTORE(0, 0x2a), REVERT(0, 32)
	let mut vm = interpreter("602a60005260206000fd", "", 1000, false);
	let mut memory = memory();

	let action = vm.run(&mut memory, &mut UnimplementedHost).unwrap();
	match action {
		Action::Return(ret) => {
			assert_eq!(ret.result, ReturnStatus::Reverted);
			assert_eq!(U256::from_big_endian(&ret.output), U256::from(0x2a));
		}
		other => panic!("unexpected action {:?}", other),
	}
	// 3 + 3 + 3 + 3 (memory) + 3 + 3
	assert_eq!(vm.gasometer().used_gas(), 18);
	assert_eq!(vm.status(), &InterpreterStatus::Reverted);
}
