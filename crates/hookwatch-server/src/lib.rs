//! hookwatch server library entry.
//!
//! Wires the metrics provider into an HTTP exposition server, an
//! instrumented outbound transport, and helpers for instrumenting served
//! requests and cron tasks. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod config;
pub mod cron;
pub mod instrument;
pub mod ops;
pub mod router;
pub mod server;
pub mod transport;

pub use server::{Handler, Server};
