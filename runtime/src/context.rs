use primitive_types::{H160, H256, U256};

/// How a created contract's address is derived.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CreateScheme {
	/// `CREATE`: address from the creator and its nonce.
	Legacy {
		caller: H160,
	},
	/// `CREATE2`: address from the creator, salt and init code hash.
	Create2 {
		caller: H160,
		/// Keccak-256 of the init code.
		code_hash: H256,
		salt: H256,
	},
}

impl CreateScheme {
	/// Account that pays for and owns the creation.
	pub fn caller(&self) -> H160 {
		match self {
			Self::Legacy { caller } => *caller,
			Self::Create2 { caller, .. } => *caller,
		}
	}
}

/// Flavour of a message call, deciding whose code runs in whose storage.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CallScheme {
	/// Target code in the target's storage.
	Call,
	/// Target code in the caller's storage.
	CallCode,
	/// Like `CallCode`, keeping the caller and value of the current frame.
	DelegateCall,
	/// Like `Call`, with every state change forbidden.
	StaticCall,
}

/// Identity a frame executes under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Context {
	/// Account whose storage and balance the frame uses.
	pub address: H160,
	/// Value returned by `CALLER`.
	pub caller: H160,
	/// Value returned by `CALLVALUE`. Nothing is moved by it.
	pub apparent_value: U256,
}

/// Balance movement made when a frame is entered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transfer {
	pub source: H160,
	pub target: H160,
	pub value: U256,
}
