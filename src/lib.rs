//! Ethereum Virtual Machine execution engine in Rust.
//!
//! Frames run in an [`Interpreter`] over one shared, checkpointed [`Memory`].
//! The [`executor::StackExecutor`] drives nested calls and creates against a
//! [`Host`], either a [`backend::PlainHost`] or a journaled one that can undo
//! a failed frame.

#![forbid(unsafe_code, unused_variables)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use evm_core::*;
pub use evm_gasometer as gasometer;
pub use evm_runtime::*;

pub mod backend;
pub mod executor;
