use crate::{CallScheme, Context, CreateScheme, Transfer};
use alloc::boxed::Box;
use alloc::vec::Vec;
use evm_core::{ExitError, ExitResult, ExitSucceed};
use primitive_types::{H160, U256};

/// How a frame ended normally.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnStatus {
	/// `STOP`, `SELFDESTRUCT` or running off the end of the code.
	Stopped,
	/// `RETURN`.
	Returned,
	/// `REVERT`.
	Reverted,
}

impl From<ReturnStatus> for ExitResult {
	fn from(status: ReturnStatus) -> Self {
		match status {
			ReturnStatus::Stopped => Ok(ExitSucceed::Stopped),
			ReturnStatus::Returned => Ok(ExitSucceed::Returned),
			ReturnStatus::Reverted => Err(ExitError::Reverted),
		}
	}
}

/// Terminal output of a frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReturnAction {
	/// Output bytes. Empty for `Stopped`.
	pub output: Vec<u8>,
	/// Termination kind.
	pub result: ReturnStatus,
}

/// Request to run a message call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallAction {
	/// Call scheme.
	pub scheme: CallScheme,
	/// Address whose code runs.
	pub code_address: H160,
	/// Identity the code runs under.
	pub context: Context,
	/// Value moved before the call starts.
	pub transfer: Option<Transfer>,
	/// Call data.
	pub input: Vec<u8>,
	/// Gas given to the callee, stipend included.
	pub gas: u64,
	/// Whether the callee runs in static mode.
	pub is_static: bool,
}

/// Request to run init code and deploy its output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateAction {
	/// Create scheme.
	pub scheme: CreateScheme,
	/// Init code.
	pub init_code: Vec<u8>,
	/// Endowment.
	pub value: U256,
	/// Gas given to the init code.
	pub gas: u64,
}

/// What the interpreter asks of whoever drives it after a step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
	/// Keep stepping.
	None,
	/// The frame is done.
	Return(ReturnAction),
	/// Run a nested call, then `feedback` its result.
	Call(Box<CallAction>),
	/// Run a nested create, then `feedback` its result.
	Create(Box<CreateAction>),
}

/// Outcome of a nested frame, handed back to its parent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameResult {
	/// Exit reason of the child.
	pub reason: ExitResult,
	/// Output (return or revert data) of the child.
	pub output: Vec<u8>,
	/// Gas the child did not use.
	pub gas_left: u64,
	/// Refund counter of the child.
	pub refunded: i64,
	/// Address of the created contract, for successful creates.
	pub created: Option<H160>,
}

impl FrameResult {
	/// A frame that failed before running any code.
	pub fn failed(reason: ExitError, gas_left: u64) -> Self {
		Self {
			reason: Err(reason),
			output: Vec::new(),
			gas_left,
			refunded: 0,
			created: None,
		}
	}
}
