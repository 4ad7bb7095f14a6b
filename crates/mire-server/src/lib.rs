//! The mire daemon: a swap-space backend serving one memory-manager client
//!
//! Startup builds the swap-file set from an immutable config, binds a
//! listener, and accepts exactly one connection. The first packet selects the
//! allocation policy; every packet after that is a swap request, served
//! strictly one at a time. The process is crash-only: the first transport
//! fault ends it, and there is no graceful shutdown path.

pub mod config;
pub mod dispatch;
pub mod handlers;

pub use config::{Config, ConfigError};
pub use dispatch::{serve, ServeError, ServerCtx};
