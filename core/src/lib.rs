//! # Tagscan Core
//!
//! The probing engine: HTTP probe client, confirmation policies, the bounded
//! worker pool, result aggregation and output files.
//!
//! * **[`discovery`]**: the run-level use case tying everything together.
//! * **[`scanner`]**: scheduler and confirmation policies.
//! * **[`probe`]**: the `reqwest`-backed [`Prober`](tagscan_common::scanning::Prober).
//! * **[`aggregator`]** / **[`output`]**: fan-in and persistence.

pub mod aggregator;
pub mod discovery;
pub mod input;
pub mod output;
pub mod probe;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_support;
