//! EVM gas accounting.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod consts;
mod costs;
mod memory;

pub use crate::config::Config;
pub use crate::costs::*;
pub use crate::memory::memory_gas;

use evm_core::ExitException;
use primitive_types::U256;

/// Gas that a CALL may forward: the requested amount, capped at all but one
/// 64th of what remains.
pub fn call_gas(requested: U256, available: u64) -> u64 {
	let cap = available - available / 64;
	if requested > U256::from(cap) {
		cap
	} else {
		requested.as_u64()
	}
}

/// Gas that a CREATE forwards: all but one 64th of what remains.
pub fn create_gas(available: u64) -> u64 {
	available - available / 64
}

/// Gas tracker of a single frame.
#[derive(Clone, Debug)]
pub struct Gasometer<'config> {
	gas_limit: u64,
	used_gas: u64,
	memory_words: usize,
	memory_gas: u64,
	refunded_gas: i64,
	config: &'config Config,
}

impl<'config> Gasometer<'config> {
	/// Create a new gasometer with given gas limit and config.
	pub fn new(gas_limit: u64, config: &'config Config) -> Self {
		Self {
			gas_limit,
			used_gas: 0,
			memory_words: 0,
			memory_gas: 0,
			refunded_gas: 0,
			config,
		}
	}

	/// Cost schedule in use.
	#[inline]
	pub fn config(&self) -> &'config Config {
		self.config
	}

	/// Gas limit of the frame.
	#[inline]
	pub fn gas_limit(&self) -> u64 {
		self.gas_limit
	}

	/// Remaining gas.
	#[inline]
	pub fn gas(&self) -> u64 {
		self.gas_limit - self.used_gas - self.memory_gas
	}

	/// Total used gas, memory expansion included.
	#[inline]
	pub fn used_gas(&self) -> u64 {
		self.used_gas + self.memory_gas
	}

	/// Refunded gas.
	#[inline]
	pub fn refunded_gas(&self) -> i64 {
		self.refunded_gas
	}

	/// Words of memory already paid for.
	#[inline]
	pub fn memory_words(&self) -> usize {
		self.memory_words
	}

	/// Explicitly fail the gasometer with out of gas. Consumes everything
	/// that remains.
	pub fn fail(&mut self) -> ExitException {
		self.used_gas = self.gas_limit - self.memory_gas;
		ExitException::OutOfGas
	}

	/// Record an explicit cost.
	#[inline]
	pub fn record_cost(&mut self, cost: u64) -> Result<(), ExitException> {
		let all_gas_cost = self
			.used_gas
			.checked_add(self.memory_gas)
			.and_then(|used| used.checked_add(cost))
			.ok_or(ExitException::OutOfGas)?;
		if self.gas_limit < all_gas_cost {
			log::trace!(target: "evm", "out of gas: cost {} remaining {}", cost, self.gas());
			return Err(ExitException::OutOfGas);
		}

		self.used_gas += cost;
		Ok(())
	}

	/// Record that the frame's memory now spans `words` words. Only growth
	/// past the previous high-water mark is charged.
	pub fn record_memory(&mut self, words: usize) -> Result<(), ExitException> {
		if words <= self.memory_words {
			return Ok(());
		}

		let memory_gas = memory_gas(words, self.config.gas_memory)?;
		let all_gas_cost = self
			.used_gas
			.checked_add(memory_gas)
			.ok_or(ExitException::OutOfGas)?;
		if self.gas_limit < all_gas_cost {
			log::trace!(target: "evm", "out of gas: memory of {} words", words);
			return Err(ExitException::OutOfGas);
		}

		self.memory_words = words;
		self.memory_gas = memory_gas;
		Ok(())
	}

	/// Record refund. May be negative.
	#[inline]
	pub fn record_refund(&mut self, refund: i64) {
		self.refunded_gas = self.refunded_gas.saturating_add(refund);
	}

	/// Give back gas that a child frame did not use.
	#[inline]
	pub fn record_return(&mut self, stipend: u64) {
		self.used_gas = self.used_gas.saturating_sub(stipend);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn failed_record_leaves_counters_unchanged() {
		let config = Config::istanbul();
		let mut gasometer = Gasometer::new(10, &config);

		gasometer.record_cost(7).unwrap();
		assert_eq!(gasometer.record_cost(4), Err(ExitException::OutOfGas));
		assert_eq!(gasometer.used_gas(), 7);
		assert_eq!(gasometer.gas(), 3);

		assert_eq!(gasometer.record_memory(2), Err(ExitException::OutOfGas));
		assert_eq!(gasometer.memory_words(), 0);
		assert_eq!(gasometer.gas(), 3);

		assert_eq!(gasometer.record_cost(u64::MAX), Err(ExitException::OutOfGas));
		gasometer.record_memory(1).unwrap();
		assert_eq!(gasometer.memory_words(), 1);
		assert_eq!(gasometer.gas(), 0);
	}

	#[test]
	fn memory_is_charged_for_growth_only() {
		let config = Config::istanbul();
		let mut gasometer = Gasometer::new(1_000_000, &config);

		gasometer.record_memory(2).unwrap();
		assert_eq!(gasometer.used_gas(), 6);
		gasometer.record_memory(1).unwrap();
		assert_eq!(gasometer.used_gas(), 6);
		gasometer.record_memory(32).unwrap();
		assert_eq!(gasometer.used_gas(), 98);
		assert_eq!(gasometer.memory_words(), 32);
	}

	#[test]
	fn fail_consumes_everything() {
		let config = Config::istanbul();
		let mut gasometer = Gasometer::new(100, &config);
		gasometer.record_memory(1).unwrap();
		gasometer.record_cost(10).unwrap();

		assert_eq!(gasometer.fail(), ExitException::OutOfGas);
		assert_eq!(gasometer.gas(), 0);
		assert_eq!(gasometer.used_gas(), 100);
	}

	#[test]
	fn forwarded_gas_is_returned() {
		let config = Config::istanbul();
		let mut gasometer = Gasometer::new(100_000, &config);

		let forwarded = call_gas(U256::MAX, gasometer.gas());
		assert_eq!(forwarded, 100_000 - 100_000 / 64);
		gasometer.record_cost(forwarded).unwrap();
		gasometer.record_return(forwarded - 500);
		assert_eq!(gasometer.used_gas(), 500);

		gasometer.record_refund(15000);
		gasometer.record_refund(-5000);
		assert_eq!(gasometer.refunded_gas(), 10000);
	}

	#[test]
	fn all_but_one_64th() {
		assert_eq!(call_gas(U256::from(100), 6400), 100);
		assert_eq!(call_gas(U256::from(10_000), 6400), 6300);
		assert_eq!(call_gas(U256::zero(), 6400), 0);
		assert_eq!(create_gas(64), 63);
		assert_eq!(create_gas(0), 0);
	}
}
