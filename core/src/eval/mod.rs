//! Pure word-level operations shared by the interpreter.

pub mod arithmetic;
pub mod bitwise;
