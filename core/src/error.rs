use crate::Opcode;
use alloc::borrow::Cow;

/// Exit result.
pub type ExitResult = Result<ExitSucceed, ExitError>;

/// Exit reason.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub enum ExitError {
	/// Machine returns a normal EVM error.
	Exception(ExitException),
	/// Machine encountered an explicit revert.
	Reverted,
	/// Machine encountered an error that is not supposed to be normal EVM
	/// errors, such as requiring too much memory to execute.
	Fatal(ExitFatal),
}

impl ExitError {
	/// Whether the error aborts the whole transaction rather than the
	/// current frame.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Fatal(_))
	}
}

impl From<ExitError> for ExitResult {
	fn from(s: ExitError) -> Self {
		Err(s)
	}
}

#[cfg(feature = "std")]
impl std::error::Error for ExitError {}

impl core::fmt::Display for ExitError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::Exception(e) => write!(f, "evm exception: {}", e),
			Self::Reverted => f.write_str("evm reverted"),
			Self::Fatal(e) => write!(f, "evm fatal: {}", e),
		}
	}
}

/// Exit succeed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub enum ExitSucceed {
	/// Machine encountered an explicit stop.
	Stopped,
	/// Machine encountered an explicit return.
	Returned,
}

impl From<ExitSucceed> for ExitResult {
	fn from(s: ExitSucceed) -> Self {
		Ok(s)
	}
}

/// Exit error reason. Fails the current frame; the caller keeps running.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub enum ExitException {
	/// Trying to pop from an empty stack.
	StackUnderflow,
	/// Trying to push into a stack over stack limit.
	StackOverflow,
	/// Jump destination is invalid.
	InvalidJump,
	/// An opcode accesses memory region, but the region is invalid.
	InvalidRange,
	/// Encountered the designated invalid opcode.
	DesignatedInvalid,
	/// Call stack is too deep (runtime).
	CallTooDeep,
	/// Create opcode encountered collision (runtime).
	CreateCollision,
	/// Create init code exceeds limit (runtime).
	CreateContractLimit,
	/// Invalid opcode during execution or starting byte is 0xef.
	InvalidOpcode(Opcode),
	/// An opcode accesses external information, but the request is off offset
	/// limit (runtime).
	OutOfOffset,
	/// Execution runs out of gas (runtime).
	OutOfGas,
	/// Not enough fund to start the execution (runtime).
	OutOfFund,
	/// State-modifying operation inside a static call.
	StaticModeViolation,
	/// Nonce reached maximum value of 2^64-1.
	MaxNonce,
	/// Other normal errors.
	Other(Cow<'static, str>),
}

impl From<ExitException> for ExitResult {
	fn from(s: ExitException) -> Self {
		Err(ExitError::Exception(s))
	}
}

impl From<ExitException> for ExitError {
	fn from(s: ExitException) -> Self {
		Self::Exception(s)
	}
}

impl core::fmt::Display for ExitException {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::StackUnderflow => f.write_str("stack underflow"),
			Self::StackOverflow => f.write_str("stack overflow"),
			Self::InvalidJump => f.write_str("invalid jump destination"),
			Self::InvalidRange => f.write_str("invalid memory range"),
			Self::DesignatedInvalid => f.write_str("designated invalid opcode"),
			Self::CallTooDeep => f.write_str("call stack too deep"),
			Self::CreateCollision => f.write_str("create collision"),
			Self::CreateContractLimit => f.write_str("contract size limit exceeded"),
			Self::InvalidOpcode(opcode) => write!(f, "invalid opcode {:?}", opcode),
			Self::OutOfOffset => f.write_str("out of offset"),
			Self::OutOfGas => f.write_str("out of gas"),
			Self::OutOfFund => f.write_str("out of fund"),
			Self::StaticModeViolation => f.write_str("state modification in static call"),
			Self::MaxNonce => f.write_str("nonce overflow"),
			Self::Other(s) => f.write_str(s),
		}
	}
}

/// Exit fatal reason. Aborts the whole transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub enum ExitFatal {
	/// The operation is not supported.
	NotSupported,
	/// The trap (interrupt) is unhandled.
	UnhandledInterrupt,
	/// The interpreter was stepped after it already exited.
	AlreadyExited,
	/// Memory limit reached or allocation failed.
	OutOfMemory,
	/// The state database failed.
	Database(Cow<'static, str>),
	/// Other fatal errors.
	Other(Cow<'static, str>),
}

impl From<ExitFatal> for ExitResult {
	fn from(s: ExitFatal) -> Self {
		Err(ExitError::Fatal(s))
	}
}

impl From<ExitFatal> for ExitError {
	fn from(s: ExitFatal) -> Self {
		Self::Fatal(s)
	}
}

impl core::fmt::Display for ExitFatal {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::NotSupported => f.write_str("not supported"),
			Self::UnhandledInterrupt => f.write_str("unhandled interrupt"),
			Self::AlreadyExited => f.write_str("interpreter already exited"),
			Self::OutOfMemory => f.write_str("out of memory"),
			Self::Database(s) => write!(f, "database: {}", s),
			Self::Other(s) => f.write_str(s),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for ExitFatal {}
