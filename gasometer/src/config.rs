/// Cost schedule. Every price the interpreter charges that differs between
/// protocol upgrades lives here; fixed tier prices are in `consts`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
	feature = "with-serde",
	derive(serde::Serialize, serde::Deserialize)
)]
pub struct Config {
	/// Gas paid for EXTCODESIZE and EXTCODECOPY.
	pub gas_ext_code: u64,
	/// Gas paid for EXTCODEHASH.
	pub gas_ext_code_hash: u64,
	/// Gas paid for BALANCE opcode.
	pub gas_balance: u64,
	/// Gas paid for SLOAD opcode.
	pub gas_sload: u64,
	/// Gas paid for SSTORE setting a zero slot to non-zero.
	pub gas_sstore_set: u64,
	/// Gas paid for any other SSTORE.
	pub gas_sstore_reset: u64,
	/// Refund for clearing a storage slot.
	pub refund_sstore_clears: i64,
	/// Gas paid for SUICIDE opcode.
	pub gas_suicide: u64,
	/// Gas paid for SUICIDE opcode when it hits a new account.
	pub gas_suicide_new_account: u64,
	/// Refund for the first SUICIDE of an account.
	pub refund_suicide: i64,
	/// Gas paid for CALL opcode.
	pub gas_call: u64,
	/// Gas paid for a call transferring value.
	pub gas_call_value: u64,
	/// Gas paid for a call creating a new account.
	pub gas_new_account: u64,
	/// Gas given to the callee for free when value is transferred.
	pub call_stipend: u64,
	/// Gas paid for EXP opcode for every byte.
	pub gas_expbyte: u64,
	/// Gas paid for CREATE and CREATE2.
	pub gas_create: u64,
	/// Gas paid per byte of deployed code.
	pub gas_code_deposit: u64,
	/// Linear coefficient of the memory expansion formula.
	pub gas_memory: u64,
	/// Whether empty account is considered exists.
	pub empty_considered_exists: bool,
}

impl Config {
	/// Frontier hard fork configuration.
	pub const fn frontier() -> Config {
		Config {
			gas_ext_code: 20,
			gas_ext_code_hash: 20,
			gas_balance: 20,
			gas_sload: 50,
			gas_sstore_set: 20000,
			gas_sstore_reset: 5000,
			refund_sstore_clears: 15000,
			gas_suicide: 0,
			gas_suicide_new_account: 0,
			refund_suicide: 24000,
			gas_call: 40,
			gas_call_value: 9000,
			gas_new_account: 25000,
			call_stipend: 2300,
			gas_expbyte: 10,
			gas_create: 32000,
			gas_code_deposit: 200,
			gas_memory: 3,
			empty_considered_exists: true,
		}
	}

	/// Istanbul hard fork configuration.
	pub const fn istanbul() -> Config {
		Config {
			gas_ext_code: 700,
			gas_ext_code_hash: 700,
			gas_balance: 700,
			gas_sload: 800,
			gas_sstore_set: 20000,
			gas_sstore_reset: 5000,
			refund_sstore_clears: 15000,
			gas_suicide: 5000,
			gas_suicide_new_account: 25000,
			refund_suicide: 24000,
			gas_call: 700,
			gas_call_value: 9000,
			gas_new_account: 25000,
			call_stipend: 2300,
			gas_expbyte: 50,
			gas_create: 32000,
			gas_code_deposit: 200,
			gas_memory: 3,
			empty_considered_exists: false,
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self::istanbul()
	}
}
