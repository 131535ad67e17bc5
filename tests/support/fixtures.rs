//! Test fixtures and constants.

/// Passphrase every CLI test derives its store key from.
pub const TEST_PASSPHRASE: &str = "correct horse battery staple";

/// Standard test secrets used across multiple tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("ETHERSCAN_API_KEY", "YOURAPIKEYTOKEN1234567890"),
    ("RPC_URL", "https://mainnet.infura.io/v3/abc"),
    ("DEPLOYER_KEY", "0x4c0883a69102937d6231471b5dbb6204fe512961708279f1d3b1a3d1f1a2b3c4"),
    ("SAFE_OWNER", "0x52908400098527886E0F7030069857D2E4169EE7"),
];

/// A checksummed Safe address.
pub const SAFE_ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
