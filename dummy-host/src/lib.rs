//! dummy-host: plays the foreign caller against `dummy-core`.
//!
//! Creates an object through the exported factory, checks the
//! reference-count contract, then times acquire/release pairs through each
//! dispatch strategy and records what `QueryInterface` answers.

pub mod bench;
pub mod config;
pub mod error;
pub mod report;
