use crate::eval::{self, Control};
use crate::{Action, Contract, FrameResult, Host, ReturnAction, ReturnStatus, RuntimeConfig};
use alloc::vec::Vec;
use core::cmp::min;
use evm_core::{ExitError, ExitException, ExitFatal, Memory, Opcode, Stack};
use evm_gasometer::{static_cost, Gasometer};
use primitive_types::{H160, U256};

/// Lifecycle of an interpreter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InterpreterStatus {
	/// Executing opcodes.
	Running,
	/// Suspended on a nested call or create, waiting for `feedback`.
	CallOrCreate,
	/// Halted by `STOP`, `SELFDESTRUCT` or the end of code.
	Stopped,
	/// Halted by `RETURN`.
	Returned,
	/// Halted by `REVERT`.
	Reverted,
	/// Halted by an error. All gas is consumed for exceptions.
	Faulted(ExitError),
}

/// Result slot reserved by a suspended call or create.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Pending {
	Call { out_offset: usize, out_len: usize },
	Create,
}

/// Executes the code of a single frame. Nested frames are not run here:
/// the interpreter yields an [`Action`] and is resumed with [`feedback`].
///
/// [`feedback`]: Interpreter::feedback
pub struct Interpreter<'config> {
	pub(crate) contract: Contract,
	pub(crate) gasometer: Gasometer<'config>,
	pub(crate) stack: Stack,
	pub(crate) position: usize,
	pub(crate) return_data: Vec<u8>,
	pub(crate) is_static: bool,
	pub(crate) pending: Option<Pending>,
	pub(crate) config: &'config RuntimeConfig,
	depth: usize,
	status: InterpreterStatus,
}

impl<'config> Interpreter<'config> {
	pub fn new(
		contract: Contract,
		gas_limit: u64,
		is_static: bool,
		depth: usize,
		config: &'config RuntimeConfig,
	) -> Self {
		Self {
			contract,
			gasometer: Gasometer::new(gas_limit, &config.gasometer),
			stack: Stack::new(config.stack_limit),
			position: 0,
			return_data: Vec::new(),
			is_static,
			pending: None,
			config,
			depth,
			status: InterpreterStatus::Running,
		}
	}

	pub fn contract(&self) -> &Contract {
		&self.contract
	}

	pub fn gasometer(&self) -> &Gasometer<'config> {
		&self.gasometer
	}

	pub fn stack(&self) -> &Stack {
		&self.stack
	}

	/// Program counter.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Output of the last nested frame.
	pub fn return_data(&self) -> &[u8] {
		&self.return_data
	}

	pub fn is_static(&self) -> bool {
		self.is_static
	}

	/// Call depth, zero for the outermost frame.
	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn status(&self) -> &InterpreterStatus {
		&self.status
	}

	/// Address the frame runs as.
	pub fn address(&self) -> H160 {
		self.contract.address
	}

	/// Execute a single opcode. Returns `Action::None` while the frame keeps
	/// running.
	pub fn step<H: Host + ?Sized>(
		&mut self,
		memory: &mut Memory,
		host: &mut H,
	) -> Result<Action, ExitError> {
		match self.status {
			InterpreterStatus::Running => (),
			InterpreterStatus::CallOrCreate => return Err(ExitFatal::UnhandledInterrupt.into()),
			_ => return Err(ExitFatal::AlreadyExited.into()),
		}

		match self.step_inner(memory, host) {
			Ok(action) => Ok(action),
			Err(error) => {
				if let ExitError::Exception(_) = error {
					self.gasometer.fail();
				}
				log::debug!(
					target: "evm",
					"frame {:?} at depth {} faulted at pc {}: {}",
					self.contract.address,
					self.depth,
					self.position,
					error,
				);
				self.status = InterpreterStatus::Faulted(error.clone());
				Err(error)
			}
		}
	}

	fn step_inner<H: Host + ?Sized>(
		&mut self,
		memory: &mut Memory,
		host: &mut H,
	) -> Result<Action, ExitError> {
		let position = self.position;
		let opcode = match self.contract.code.get(position) {
			Some(v) => Opcode(*v),
			None => {
				return Ok(self.halt(ReturnAction {
					output: Vec::new(),
					result: ReturnStatus::Stopped,
				}))
			}
		};

		let info = opcode
			.info()
			.ok_or(ExitException::InvalidOpcode(opcode))?;
		self.stack
			.check_pop_push(info.inputs as usize, info.outputs as usize)?;
		let cost = static_cost(opcode, self.gasometer.config())
			.ok_or(ExitException::InvalidOpcode(opcode))?;
		self.gasometer.record_cost(cost)?;

		log::trace!(
			target: "evm",
			"{} pc={} gas={} stack={}",
			opcode,
			position,
			self.gasometer.gas(),
			self.stack.len(),
		);

		match eval::eval(self, opcode, memory, host)? {
			Control::Continue(n) => {
				self.position = position + n;
				Ok(Action::None)
			}
			Control::Jump(dest) => {
				if !self.contract.is_valid_jump(dest) {
					return Err(ExitException::InvalidJump.into());
				}
				self.position = dest;
				Ok(Action::None)
			}
			Control::Exit(ret) => Ok(self.halt(ret)),
			Control::Call(action) => {
				self.position = position + 1;
				self.status = InterpreterStatus::CallOrCreate;
				Ok(Action::Call(action))
			}
			Control::Create(action) => {
				self.position = position + 1;
				self.status = InterpreterStatus::CallOrCreate;
				Ok(Action::Create(action))
			}
		}
	}

	fn halt(&mut self, ret: ReturnAction) -> Action {
		self.status = match ret.result {
			ReturnStatus::Stopped => InterpreterStatus::Stopped,
			ReturnStatus::Returned => InterpreterStatus::Returned,
			ReturnStatus::Reverted => InterpreterStatus::Reverted,
		};
		Action::Return(ret)
	}

	/// Step until the frame halts or suspends.
	pub fn run<H: Host + ?Sized>(
		&mut self,
		memory: &mut Memory,
		host: &mut H,
	) -> Result<Action, ExitError> {
		loop {
			match self.step(memory, host)? {
				Action::None => (),
				action => return Ok(action),
			}
		}
	}

	/// Resume after a nested call or create. `memory` must be back in this
	/// frame's context.
	pub fn feedback(&mut self, result: FrameResult, memory: &mut Memory) -> Result<(), ExitError> {
		if self.status != InterpreterStatus::CallOrCreate {
			return Err(ExitFatal::NotSupported.into());
		}
		let pending = self.pending.take().ok_or(ExitFatal::NotSupported)?;
		self.status = InterpreterStatus::Running;

		self.gasometer.record_return(result.gas_left);
		if let Err(ExitError::Fatal(e)) = result.reason {
			return Err(e.into());
		}
		if result.reason.is_ok() {
			self.gasometer.record_refund(result.refunded);
		}
		let reverted = result.reason == Err(ExitError::Reverted);

		match pending {
			Pending::Call {
				out_offset,
				out_len,
			} => {
				let target_len = min(out_len, result.output.len());
				if result.reason.is_ok() || reverted {
					memory.set(out_offset, &result.output[..target_len], None)?;
				}
				let success = if result.reason.is_ok() {
					U256::one()
				} else {
					U256::zero()
				};
				self.return_data = result.output;
				self.stack.push(success)?;
			}
			Pending::Create => {
				let address = match (&result.reason, result.created) {
					(Ok(_), Some(address)) => U256::from_big_endian(&address[..]),
					_ => U256::zero(),
				};
				self.return_data = if reverted { result.output } else { Vec::new() };
				self.stack.push(address)?;
			}
		}

		Ok(())
	}
}
