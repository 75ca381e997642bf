pub const G_ZERO: u64 = 0;
pub const G_BASE: u64 = 2;
pub const G_VERYLOW: u64 = 3;
pub const G_LOW: u64 = 5;
pub const G_MID: u64 = 8;
pub const G_HIGH: u64 = 10;
pub const G_JUMPDEST: u64 = 1;
pub const G_EXP: u64 = 10;
pub const G_BLOCKHASH: u64 = 20;
pub const G_SHA3: u64 = 30;
pub const G_SHA3WORD: u64 = 6;
pub const G_COPY: u64 = 3;
pub const G_LOG: u64 = 375;
pub const G_LOGTOPIC: u64 = 375;
pub const G_LOGDATA: u64 = 8;
