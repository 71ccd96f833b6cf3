//! Command-line configuration.

use std::fmt;

use clap::{Parser, ValueEnum};
use dummy_core::{Guid, IID_IDUMMY, IID_IUNKNOWN};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Default pairs per strategy: 20 million.
pub const DEFAULT_ITERATIONS: u64 = 20_000_000;

/// Log filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "dummy_host=info";

/// Build the log filter from the value of `RUST_LOG`.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// How the host reaches the acquire/release slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Load the slot out of the table on every call.
    Slot,
    /// Copy both function pointers once, then call them directly.
    Cached,
    /// Clone and drop an owning `UnknownRef`.
    Handle,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Slot, Strategy::Cached, Strategy::Handle];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slot => "slot",
            Self::Cached => "cached",
            Self::Handle => "handle",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dummy-host",
    about = "Validate and time calls through the dummy object's function table"
)]
pub struct HostConfig {
    /// Acquire/release pairs per strategy
    #[arg(long, env = "DUMMY_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u64,

    /// Dispatch strategy to time (repeatable; default: all)
    #[arg(long = "strategy", value_enum)]
    pub strategies: Vec<Strategy>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Interface identifier to query (repeatable; default: IUnknown and the object's own)
    #[arg(long = "query")]
    pub queries: Vec<Guid>,
}

impl HostConfig {
    pub fn strategies(&self) -> Vec<Strategy> {
        if self.strategies.is_empty() {
            Strategy::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }

    pub fn queries(&self) -> Vec<Guid> {
        if self.queries.is_empty() {
            vec![IID_IUNKNOWN, IID_IDUMMY]
        } else {
            self.queries.clone()
        }
    }
}
