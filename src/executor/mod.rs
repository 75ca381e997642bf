//! Transaction-level execution of nested call and create frames.

mod stack;

pub use self::stack::{create_address, ExecutionResult, StackExecutor, FRAGMENT_ADDRESS};
