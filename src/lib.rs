//! Workspace façade crate.
//!
//! Host applications can depend on `smc-workspace` instead of wiring each
//! workspace crate individually. The `native-shims` feature (default) pulls in
//! the reqwest/keyring bridge adapters from `bridge-native`; mobile hosts that
//! supply their own platform adapters can disable default features and
//! implement the `bridge-traits` seams directly.

pub use bridge_traits;
pub use core_auth;
pub use core_catalog;
pub use core_player;
pub use core_runtime;
pub use core_service;

#[cfg(feature = "native-shims")]
pub use bridge_native;

pub use core_service::{ClientCore, ClientDependencies};
