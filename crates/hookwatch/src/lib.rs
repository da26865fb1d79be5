//! Top-level facade crate for hookwatch.
//!
//! Re-exports the metrics core and the server library so users can depend on a single crate.

pub mod core {
    pub use hookwatch_core::*;
}

pub mod server {
    pub use hookwatch_server::*;
}
