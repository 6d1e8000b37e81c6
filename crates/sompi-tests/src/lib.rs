//! Property-based and end-to-end test suite for the Sompi wallet daemon.
//!
//! Property tests check coin-selection invariants under randomized UTXO
//! sets; end-to-end tests drive the daemon against a scripted node.

pub mod helpers;
