//! Contract violations detected by the host.

use dummy_core::InteropError;

use crate::config::Strategy;

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("{op} returned {actual}, expected {expected}")]
    CountMismatch {
        op: &'static str,
        expected: u32,
        actual: u32,
    },
    #[error("count drifted to {actual} after {strategy} run, expected {expected}")]
    Drift {
        strategy: Strategy,
        expected: u32,
        actual: u32,
    },
    #[error("iteration count must be at least 1")]
    NoIterations,
    #[error(transparent)]
    Interop(#[from] InteropError),
}
