//! Protocol and daemon constants.

/// Sompi per KAS. All amounts on the wire and in memory are in sompi.
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Number of DAA score units a coinbase output must age before it is spendable.
pub const DEFAULT_COINBASE_MATURITY: u64 = 100;

/// Flat fee charged per selected input, in sompi.
///
/// Placeholder until a market-based estimator replaces it; the daemon reads
/// the effective value from configuration.
pub const DEFAULT_FEE_PER_INPUT: u64 = 10_000;

/// Default port the wallet daemon's JSON-RPC server listens on.
pub const DEFAULT_WALLET_RPC_PORT: u16 = 8082;

/// Default JSON-RPC endpoint of the remote node.
pub const DEFAULT_NODE_RPC_ENDPOINT: &str = "http://127.0.0.1:16110";

/// Convert sompi to KAS for display only. Never use the result in arithmetic.
pub fn sompi_to_kaspa(sompi: u64) -> f64 {
    sompi as f64 / SOMPI_PER_KASPA as f64
}

/// Render a sompi amount as a KAS string with full precision.
pub fn display_kaspa(sompi: &u64) -> String {
    format!(
        "{}.{:08} KAS",
        sompi / SOMPI_PER_KASPA,
        sompi % SOMPI_PER_KASPA
    )
}
