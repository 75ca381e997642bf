use crate::gasometer::code_deposit_cost;
use crate::{
	AccountInfo, Action, CallAction, CallScheme, Context, Contract, CreateAction, CreateScheme,
	ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed, FrameResult, Host, Interpreter,
	JournalCheckpoint, JumpTable, Memory, RuntimeConfig, Transfer,
};
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::min;
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// Address raw code fragments run at in [`StackExecutor::execute`].
pub const FRAGMENT_ADDRESS: H160 = H160([0x0f; 20]);

/// Outcome of a whole transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionResult {
	/// Exit reason of the outermost frame.
	pub exit_reason: ExitResult,
	/// Output of the outermost frame. Empty for a successful create.
	pub output: Vec<u8>,
	/// Gas consumed, before refund.
	pub gas_used: u64,
	/// Refund granted, already capped.
	pub gas_refunded: u64,
	/// Address of the created contract.
	pub created_address: Option<H160>,
}

impl ExecutionResult {
	fn failed(reason: ExitError, gas_limit: u64) -> Self {
		Self {
			exit_reason: Err(reason),
			output: Vec::new(),
			gas_used: gas_limit,
			gas_refunded: 0,
			created_address: None,
		}
	}
}

/// Address of a contract created with the given scheme. `nonce` is the
/// creator's nonce before the creation and is only used by legacy creates.
pub fn create_address(scheme: CreateScheme, nonce: u64) -> H160 {
	match scheme {
		CreateScheme::Create2 {
			caller,
			code_hash,
			salt,
		} => {
			let mut hasher = Keccak256::new();
			hasher.update([0xff]);
			hasher.update(&caller[..]);
			hasher.update(&salt[..]);
			hasher.update(&code_hash[..]);
			H256::from_slice(hasher.finalize().as_slice()).into()
		}
		CreateScheme::Legacy { caller } => {
			let mut stream = rlp::RlpStream::new_list(2);
			stream.append(&caller);
			stream.append(&nonce);
			H256::from_slice(Keccak256::digest(&stream.out()).as_slice()).into()
		}
	}
}

enum FrameKind {
	Call,
	Create(H160),
}

struct Frame<'config> {
	interpreter: Interpreter<'config>,
	checkpoint: JournalCheckpoint,
	kind: FrameKind,
}

enum Entered<'config> {
	/// A new frame has to run.
	Frame(Frame<'config>),
	/// The call or create completed without running code.
	Finished(FrameResult),
}

fn into_fatal(error: ExitError) -> ExitFatal {
	match error {
		ExitError::Fatal(e) => e,
		other => ExitFatal::Other(alloc::format!("{}", other).into()),
	}
}

/// Drives a transaction to completion. Nested frames are kept on an explicit
/// stack, so native stack usage does not grow with the EVM call depth.
pub struct StackExecutor<'config, H> {
	config: &'config RuntimeConfig,
	host: H,
	jump_tables: BTreeMap<H256, Rc<JumpTable>>,
}

impl<'config, H: Host> StackExecutor<'config, H> {
	pub fn new(host: H, config: &'config RuntimeConfig) -> Self {
		Self {
			config,
			host,
			jump_tables: BTreeMap::new(),
		}
	}

	pub fn config(&self) -> &'config RuntimeConfig {
		self.config
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn into_host(self) -> H {
		self.host
	}

	/// Number of jump tables currently cached.
	pub fn cached_jump_tables(&self) -> usize {
		self.jump_tables.len()
	}

	/// Execute a `CALL` transaction.
	pub fn transact_call(
		&mut self,
		caller: H160,
		address: H160,
		value: U256,
		data: Vec<u8>,
		gas_limit: u64,
	) -> Result<ExecutionResult, ExitFatal> {
		log::debug!(
			target: "evm",
			"transact call from {:?} to {:?}, value {}, gas limit {}",
			caller,
			address,
			value,
			gas_limit,
		);

		if let Err(e) = self.increase_nonce(caller) {
			return match e {
				ExitError::Fatal(e) => Err(e),
				e => Ok(ExecutionResult::failed(e, gas_limit)),
			};
		}

		let call = CallAction {
			scheme: CallScheme::Call,
			code_address: address,
			context: Context {
				address,
				caller,
				apparent_value: value,
			},
			transfer: Some(Transfer {
				source: caller,
				target: address,
				value,
			}),
			input: data,
			gas: gas_limit,
			is_static: false,
		};
		let entered = self.enter_call(call, 0);
		self.run_root(entered, gas_limit)
	}

	/// Execute a `CREATE` transaction, or a `CREATE2` one if `salt` is given.
	pub fn transact_create(
		&mut self,
		caller: H160,
		value: U256,
		init_code: Vec<u8>,
		gas_limit: u64,
		salt: Option<H256>,
	) -> Result<ExecutionResult, ExitFatal> {
		log::debug!(
			target: "evm",
			"transact create from {:?}, value {}, gas limit {}",
			caller,
			value,
			gas_limit,
		);

		if let Some(limit) = self.config.max_initcode_size {
			if init_code.len() > limit {
				return Ok(ExecutionResult::failed(
					ExitException::CreateContractLimit.into(),
					gas_limit,
				));
			}
		}

		let scheme = match salt {
			Some(salt) => CreateScheme::Create2 {
				caller,
				code_hash: H256::from_slice(Keccak256::digest(&init_code).as_slice()),
				salt,
			},
			None => CreateScheme::Legacy { caller },
		};
		let create = CreateAction {
			scheme,
			init_code,
			value,
			gas: gas_limit,
		};
		let entered = self.enter_create(create, 0);
		self.run_root(entered, gas_limit)
	}

	/// Run a raw code fragment at [`FRAGMENT_ADDRESS`], called by the
	/// environment's origin.
	pub fn execute(
		&mut self,
		code: Vec<u8>,
		data: Vec<u8>,
		gas_limit: u64,
	) -> Result<ExecutionResult, ExitFatal> {
		let code_hash = H256::from_slice(Keccak256::digest(&code).as_slice());
		let context = Context {
			address: FRAGMENT_ADDRESS,
			caller: self.host.environment().origin,
			apparent_value: U256::zero(),
		};
		let contract = self.contract(code, code_hash, data, context);
		let checkpoint = self.host.checkpoint();

		let root = Frame {
			interpreter: Interpreter::new(contract, gas_limit, false, 0, self.config),
			checkpoint,
			kind: FrameKind::Call,
		};
		self.run_root(Ok(Entered::Frame(root)), gas_limit)
	}

	fn run_root(
		&mut self,
		entered: Result<Entered<'config>, ExitError>,
		gas_limit: u64,
	) -> Result<ExecutionResult, ExitFatal> {
		let result = match entered {
			Ok(Entered::Frame(root)) => {
				let mut memory = Memory::new(self.config.memory_limit);
				self.execute_frames(root, &mut memory)?
			}
			Ok(Entered::Finished(result)) => result,
			Err(ExitError::Fatal(e)) => return Err(e),
			Err(e) => FrameResult::failed(e, 0),
		};

		let gas_used = gas_limit.saturating_sub(result.gas_left);
		let gas_refunded = if result.reason.is_ok() && result.refunded > 0 {
			let cap = gas_used
				.checked_div(self.config.max_refund_quotient)
				.unwrap_or(0);
			min(result.refunded as u64, cap)
		} else {
			0
		};

		log::debug!(
			target: "evm",
			"transaction finished: {:?}, gas used {}, refunded {}",
			result.reason,
			gas_used,
			gas_refunded,
		);

		Ok(ExecutionResult {
			exit_reason: result.reason,
			output: result.output,
			gas_used,
			gas_refunded,
			created_address: result.created,
		})
	}

	fn execute_frames(
		&mut self,
		root: Frame<'config>,
		memory: &mut Memory,
	) -> Result<FrameResult, ExitFatal> {
		let mut frames = alloc::vec![root];

		loop {
			let depth = frames.len();
			let action = match frames.last_mut() {
				Some(frame) => frame.interpreter.run(memory, &mut self.host),
				None => return Err(ExitFatal::NotSupported),
			};

			let entered = match action {
				Ok(Action::Call(call)) => self.enter_call(*call, depth),
				Ok(Action::Create(create)) => self.enter_create(*create, depth),
				Ok(Action::Return(ret)) => Ok(Entered::Finished(self.pop_frame(
					&mut frames,
					memory,
					ret.result.into(),
					ret.output,
				)?)),
				Ok(Action::None) => Err(ExitFatal::NotSupported.into()),
				Err(e) if !e.is_fatal() => Ok(Entered::Finished(self.pop_frame(
					&mut frames,
					memory,
					Err(e),
					Vec::new(),
				)?)),
				Err(e) => Err(e),
			};

			let result = match entered {
				Ok(Entered::Frame(child)) => {
					memory.new_context();
					frames.push(child);
					continue;
				}
				Ok(Entered::Finished(result)) => result,
				Err(ExitError::Fatal(e)) => return Err(self.abort(&mut frames, e)),
				Err(e) => FrameResult::failed(e, 0),
			};

			if let Some(result) = self.resume(&mut frames, memory, result)? {
				return Ok(result);
			}
		}
	}

	/// Feed a finished frame's result into its parent. A parent that cannot
	/// take it fails in turn. Returns the result once no parent is left.
	fn resume(
		&mut self,
		frames: &mut Vec<Frame<'config>>,
		memory: &mut Memory,
		mut result: FrameResult,
	) -> Result<Option<FrameResult>, ExitFatal> {
		loop {
			let parent = match frames.last_mut() {
				Some(parent) => parent,
				None => return Ok(Some(result)),
			};

			match parent.interpreter.feedback(result, memory) {
				Ok(()) => return Ok(None),
				Err(ExitError::Fatal(e)) => return Err(self.abort(frames, e)),
				Err(e) => result = self.pop_frame(frames, memory, Err(e), Vec::new())?,
			}
		}
	}

	fn pop_frame(
		&mut self,
		frames: &mut Vec<Frame<'config>>,
		memory: &mut Memory,
		reason: ExitResult,
		output: Vec<u8>,
	) -> Result<FrameResult, ExitFatal> {
		let frame = match frames.pop() {
			Some(frame) => frame,
			None => return Err(ExitFatal::NotSupported),
		};
		let result = match self.exit_frame(frame, reason, output) {
			Ok(result) => result,
			Err(e) => return Err(self.abort(frames, e)),
		};

		if !frames.is_empty() {
			memory.free_context();
		}
		Ok(result)
	}

	/// Revert every open frame and give up on the transaction.
	fn abort(&mut self, frames: &mut Vec<Frame<'config>>, error: ExitFatal) -> ExitFatal {
		log::debug!(
			target: "evm",
			"transaction aborted with {} open frames: {}",
			frames.len(),
			error,
		);
		while let Some(frame) = frames.pop() {
			if let Err(e) = self.host.revert_to_checkpoint(frame.checkpoint) {
				log::debug!(
					target: "evm",
					"revert to checkpoint at journal length {} failed while aborting: {}",
					frame.checkpoint.journal_len(),
					e,
				);
			}
		}
		error
	}

	fn enter_call(&mut self, call: CallAction, depth: usize) -> Result<Entered<'config>, ExitError> {
		log::debug!(
			target: "evm",
			"{:?} to {:?} at depth {}, gas {}",
			call.scheme,
			call.code_address,
			depth,
			call.gas,
		);

		if depth > self.config.call_stack_limit {
			return Ok(Entered::Finished(FrameResult::failed(
				ExitException::CallTooDeep.into(),
				call.gas,
			)));
		}
		if let Some(transfer) = &call.transfer {
			if self.host.get_account(transfer.source)?.balance < transfer.value {
				return Ok(Entered::Finished(FrameResult::failed(
					ExitException::OutOfFund.into(),
					call.gas,
				)));
			}
		}

		let checkpoint = self.host.checkpoint();
		match self.prepare_call(call, depth, checkpoint) {
			Ok(entered) => Ok(entered),
			Err(e) => {
				self.host.revert_to_checkpoint(checkpoint)?;
				Err(e)
			}
		}
	}

	fn prepare_call(
		&mut self,
		call: CallAction,
		depth: usize,
		checkpoint: JournalCheckpoint,
	) -> Result<Entered<'config>, ExitError> {
		if let Some(transfer) = call.transfer {
			self.transfer(transfer)?;
		}

		let account = self.host.get_account(call.code_address)?;
		if account.code.is_empty() {
			self.host.commit(checkpoint);
			return Ok(Entered::Finished(FrameResult {
				reason: Ok(ExitSucceed::Stopped),
				output: Vec::new(),
				gas_left: call.gas,
				refunded: 0,
				created: None,
			}));
		}

		let contract = self.contract(account.code, account.code_hash, call.input, call.context);
		Ok(Entered::Frame(Frame {
			interpreter: Interpreter::new(contract, call.gas, call.is_static, depth, self.config),
			checkpoint,
			kind: FrameKind::Call,
		}))
	}

	fn enter_create(
		&mut self,
		create: CreateAction,
		depth: usize,
	) -> Result<Entered<'config>, ExitError> {
		let caller = create.scheme.caller();
		if depth > self.config.call_stack_limit {
			return Ok(Entered::Finished(FrameResult::failed(
				ExitException::CallTooDeep.into(),
				create.gas,
			)));
		}

		let caller_info = self.host.get_account(caller)?;
		if caller_info.balance < create.value {
			return Ok(Entered::Finished(FrameResult::failed(
				ExitException::OutOfFund.into(),
				create.gas,
			)));
		}
		let nonce = match caller_info.nonce.checked_add(1) {
			Some(nonce) => nonce,
			None => {
				return Ok(Entered::Finished(FrameResult::failed(
					ExitException::MaxNonce.into(),
					create.gas,
				)))
			}
		};

		let address = create_address(create.scheme, caller_info.nonce);
		self.host.set_nonce(caller, nonce)?;

		log::debug!(
			target: "evm",
			"create {:?} from {:?} at depth {}, gas {}",
			address,
			caller,
			depth,
			create.gas,
		);

		let checkpoint = self.host.checkpoint();
		match self.prepare_create(create, address, depth, checkpoint) {
			Ok(frame) => Ok(Entered::Frame(frame)),
			Err(e) => {
				self.host.revert_to_checkpoint(checkpoint)?;
				Err(e)
			}
		}
	}

	fn prepare_create(
		&mut self,
		create: CreateAction,
		address: H160,
		depth: usize,
		checkpoint: JournalCheckpoint,
	) -> Result<Frame<'config>, ExitError> {
		let caller = create.scheme.caller();

		let existing = self.host.get_account(address)?;
		if !existing.code.is_empty() || existing.nonce > 0 {
			return Err(ExitException::CreateCollision.into());
		}
		self.host
			.create_account(address, AccountInfo::new(existing.balance, 1, Vec::new()))?;
		self.transfer(Transfer {
			source: caller,
			target: address,
			value: create.value,
		})?;

		let contract = Contract::new(
			Rc::new(create.init_code),
			Vec::new(),
			caller,
			address,
			create.value,
		);
		Ok(Frame {
			interpreter: Interpreter::new(contract, create.gas, false, depth, self.config),
			checkpoint,
			kind: FrameKind::Create(address),
		})
	}

	fn exit_frame(
		&mut self,
		frame: Frame<'config>,
		reason: ExitResult,
		output: Vec<u8>,
	) -> Result<FrameResult, ExitFatal> {
		let Frame {
			interpreter,
			checkpoint,
			kind,
		} = frame;
		let gas_left = interpreter.gasometer().gas();
		let refunded = interpreter.gasometer().refunded_gas();

		log::debug!(
			target: "evm",
			"frame {:?} at depth {} exited: {:?}",
			interpreter.address(),
			interpreter.depth(),
			reason,
		);

		match (reason, kind) {
			(Ok(succeed), FrameKind::Call) => {
				self.host.commit(checkpoint);
				Ok(FrameResult {
					reason: Ok(succeed),
					output,
					gas_left,
					refunded,
					created: None,
				})
			}
			(Ok(succeed), FrameKind::Create(address)) => {
				match self.deposit_code(address, output, gas_left) {
					Ok(gas_left) => {
						self.host.commit(checkpoint);
						Ok(FrameResult {
							reason: Ok(succeed),
							output: Vec::new(),
							gas_left,
							refunded,
							created: Some(address),
						})
					}
					Err(e) => {
						self.host
							.revert_to_checkpoint(checkpoint)
							.map_err(into_fatal)?;
						match e {
							ExitError::Fatal(e) => Err(e),
							e => Ok(FrameResult::failed(e, 0)),
						}
					}
				}
			}
			(Err(ExitError::Reverted), _) => {
				self.host
					.revert_to_checkpoint(checkpoint)
					.map_err(into_fatal)?;
				Ok(FrameResult {
					reason: Err(ExitError::Reverted),
					output,
					gas_left,
					refunded: 0,
					created: None,
				})
			}
			(Err(e), _) => {
				self.host
					.revert_to_checkpoint(checkpoint)
					.map_err(into_fatal)?;
				Ok(FrameResult::failed(e, 0))
			}
		}
	}

	/// Install the code returned by init code. Returns the gas left after
	/// paying for the deposit.
	fn deposit_code(&mut self, address: H160, code: Vec<u8>, gas_left: u64) -> Result<u64, ExitError> {
		if let Some(limit) = self.config.create_contract_limit {
			if code.len() > limit {
				return Err(ExitException::CreateContractLimit.into());
			}
		}

		let cost = code_deposit_cost(code.len(), &self.config.gasometer)?;
		let gas_left = gas_left
			.checked_sub(cost)
			.ok_or(ExitException::OutOfGas)?;
		self.host.set_code(address, code)?;
		Ok(gas_left)
	}

	fn increase_nonce(&mut self, address: H160) -> Result<(), ExitError> {
		let nonce = self.host.get_account(address)?.nonce;
		let nonce = nonce.checked_add(1).ok_or(ExitException::MaxNonce)?;
		self.host.set_nonce(address, nonce)
	}

	fn transfer(&mut self, transfer: Transfer) -> Result<(), ExitError> {
		if transfer.value.is_zero() {
			return Ok(());
		}

		let source = self.host.get_account(transfer.source)?.balance;
		let source = source
			.checked_sub(transfer.value)
			.ok_or(ExitException::OutOfFund)?;
		self.host.set_balance(transfer.source, source)?;

		let target = self.host.get_account(transfer.target)?.balance;
		let target = target
			.checked_add(transfer.value)
			.ok_or(ExitException::Other("balance overflow".into()))?;
		self.host.set_balance(transfer.target, target)
	}

	fn contract(
		&mut self,
		code: Vec<u8>,
		code_hash: H256,
		input: Vec<u8>,
		context: Context,
	) -> Contract {
		let jump_table = self
			.jump_tables
			.entry(code_hash)
			.or_insert_with(|| Rc::new(JumpTable::new(&code)))
			.clone();

		Contract::with_jump_table(
			Rc::new(code),
			code_hash,
			jump_table,
			input,
			context.caller,
			context.address,
			context.apparent_value,
		)
	}
}
