pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

// Sepolia deployment of the BePAY sale
pub const DEFAULT_SALE_TOKEN: &str = "0x9De859E849a198D27DcA5F7Ba2f836d49BA4F676";
pub const DEFAULT_QUOTE_TOKEN: &str = "0xDd7639e3920426de6c59A1009C7ce2A9802d0920";
pub const DEFAULT_SALE: &str = "0xa1E0D64349c5b9e6Ed133F8288B2574Ec4FE3150";

pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";
pub const NATIVE_DECIMALS: u8 = 18;

pub const PLACEHOLDER: &str = "—";
pub const GENERIC_FAILURE: &str = "Transaction failed";

pub const CONFIRMATION_POLL_INTERVAL_MS: u64 = 2000;
