//! hookwatch core: metric families, the in-process metric backend, and the
//! provider that records every instrumented event of the service.
//!
//! This crate carries no runtime or transport dependencies so it can be used
//! from synchronous workers, async handlers and tests alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Schema and label mismatches surface as `HookwatchError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod provider;

/// Shared result type.
pub use error::{ErrorKind, HookwatchError, Result};
pub use metrics::{Format, Registry};
pub use provider::{Provider, METRICS_PATH, NAMESPACE};
