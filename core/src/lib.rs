//! Core layer for EVM: checkpointed memory, jump analysis, stack, opcodes and
//! the exit taxonomy shared by every other crate.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod jumptable;
mod memory;
mod opcode;
mod stack;

pub mod eval;

pub use crate::error::{ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed};
pub use crate::jumptable::JumpTable;
pub use crate::memory::{available_words, Memory};
pub use crate::opcode::{info_table, Opcode, OpcodeInfo};
pub use crate::stack::Stack;
