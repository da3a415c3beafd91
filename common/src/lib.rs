//! # Tagscan Common
//!
//! Domain types shared by the engine and the command line: the [`Endpoint`]
//! model and its normalizer, probe outcomes, run configuration and the error
//! taxonomy.
//!
//! [`Endpoint`]: network::endpoint::Endpoint

pub mod config;
pub mod error;
pub mod network;
pub mod scanning;

#[doc(hidden)]
pub use tracing;

/// Log target used for status lines that should be rendered as a success.
pub const SUCCESS_TARGET: &str = "tagscan::success";

/// Log target used for raw terminal output (no glyph prefix).
pub const PRINT_TARGET: &str = "tagscan::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "tagscan::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
