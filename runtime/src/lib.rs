//! Frame-level execution of EVM code: the interpreter, the contract it runs
//! and the host interface it talks to.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod action;
mod config;
mod context;
mod contract;
mod eval;
mod host;
mod interpreter;

pub use evm_core::*;
pub use evm_gasometer as gasometer;

pub use crate::action::{
	Action, CallAction, CreateAction, FrameResult, ReturnAction, ReturnStatus,
};
pub use crate::config::RuntimeConfig;
pub use crate::context::{CallScheme, Context, CreateScheme, Transfer};
pub use crate::contract::Contract;
pub use crate::host::{AccountInfo, Environment, Host, JournalCheckpoint, Log, KECCAK_EMPTY};
pub use crate::interpreter::{Interpreter, InterpreterStatus};

pub(crate) use crate::interpreter::Pending;
