//! # sompi-daemon: wallet daemon composition.
//!
//! - [`config::DaemonConfig`]: layered daemon configuration
//! - [`node_client`]: remote node access (DAG info, UTXOs, sync status)
//! - [`sync`]: wallet sync tracking and the background refresh loop
//! - [`server::WalletServer`]: serialized transaction assembly over the wallet state
//! - [`rpc`]: JSON-RPC server for external access

pub mod config;
pub mod error;
pub mod node_client;
pub mod rpc;
pub mod server;
pub mod sync;

pub use config::DaemonConfig;
pub use error::DaemonError;
pub use node_client::{NodeClient, RpcNodeClient};
pub use rpc::start_rpc_server;
pub use server::{AssemblyOptions, Balance, WalletServer};
pub use sync::{SyncState, spawn_sync_loop};
