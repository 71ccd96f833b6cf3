//! Versioned summary of one host run.

use std::fmt::Write as _;

use serde::Serialize;

use crate::bench::{Measurement, QueryOutcome};
use crate::config::OutputFormat;

/// Fields:
/// - `version`: Schema version (always 1 for now).
/// - `timestamp_ms`: UTC milliseconds when the report was created.
/// - `initial_count`: Count a fresh object starts with in this process.
/// - `count_before` / `count_after`: Observed around the timing runs; must match.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub version: u32,
    pub timestamp_ms: i64,
    pub initial_count: u32,
    pub count_before: u32,
    pub count_after: u32,
    pub measurements: Vec<Measurement>,
    pub queries: Vec<QueryOutcome>,
}

impl Report {
    pub fn new(
        initial_count: u32,
        count_before: u32,
        count_after: u32,
        measurements: Vec<Measurement>,
        queries: Vec<QueryOutcome>,
    ) -> Self {
        Self {
            version: 1,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            initial_count,
            count_before,
            count_after,
            measurements,
            queries,
        }
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "initial count: {}", self.initial_count);
        for m in &self.measurements {
            let _ = writeln!(
                out,
                "{:<8} {:>12} pairs {:>8} ms {:>8.2} ns/pair",
                m.strategy.as_str(),
                m.iterations,
                m.elapsed_ms,
                m.ns_per_pair
            );
        }
        for q in &self.queries {
            let _ = writeln!(out, "QueryInterface({}): {}", q.iid, q.status);
        }
        let _ = write!(out, "count: {} -> {}", self.count_before, self.count_after);
        out
    }
}
