use evm_gasometer::Config;

/// Limits and cost schedule of an execution.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(default)
)]
pub struct RuntimeConfig {
	/// Stack limit.
	pub stack_limit: usize,
	/// Memory limit of the buffer shared by every frame of a transaction.
	pub memory_limit: usize,
	/// Call stack limit.
	pub call_stack_limit: usize,
	/// Create contract limit.
	pub create_contract_limit: Option<usize>,
	/// Maximum size of init code for CREATE and CREATE2.
	pub max_initcode_size: Option<usize>,
	/// Refunds are capped at `gas_used / max_refund_quotient`.
	pub max_refund_quotient: u64,
	/// Cost schedule.
	pub gasometer: Config,
}

impl RuntimeConfig {
	pub const fn new() -> Self {
		Self {
			stack_limit: 1024,
			memory_limit: 64 * 1024 * 1024,
			call_stack_limit: 1024,
			create_contract_limit: Some(0x6000),
			max_initcode_size: Some(0xc000),
			max_refund_quotient: 5,
			gasometer: Config::istanbul(),
		}
	}

	/// Frontier rules: no code size limits and halving refunds.
	pub const fn frontier() -> Self {
		Self {
			stack_limit: 1024,
			memory_limit: 64 * 1024 * 1024,
			call_stack_limit: 1024,
			create_contract_limit: None,
			max_initcode_size: None,
			max_refund_quotient: 2,
			gasometer: Config::frontier(),
		}
	}
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self::new()
	}
}
