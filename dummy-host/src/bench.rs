//! Contract checks and timing loops.

use std::ffi::c_void;
use std::hint::black_box;
use std::time::Instant;

use dummy_core::{config as module_config, Guid, IDummyVtbl, InteropError, UnknownRef};
use serde::Serialize;

use crate::config::{HostConfig, Strategy};
use crate::error::BenchError;
use crate::report::Report;

/// Timing for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub strategy: Strategy,
    pub iterations: u64,
    pub elapsed_ms: u64,
    pub ns_per_pair: f64,
}

/// What `QueryInterface` said about one identifier.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub iid: String,
    pub supported: bool,
    pub status: String,
}

/// Validate the object, then time every configured strategy.
pub fn run(config: &HostConfig) -> Result<Report, BenchError> {
    if config.iterations == 0 {
        return Err(BenchError::NoIterations);
    }

    let handle = UnknownRef::create()?;
    tracing::debug!("created {handle:?}");

    sanity_check(&handle)?;
    let count_before = handle.peek_count();

    let mut measurements = Vec::new();
    for strategy in config.strategies() {
        let m = measure(&handle, strategy, config.iterations)?;
        tracing::info!(
            "{strategy}: {} pairs in {} ms ({:.2} ns/pair)",
            m.iterations,
            m.elapsed_ms,
            m.ns_per_pair
        );
        measurements.push(m);
    }

    let queries = config
        .queries()
        .iter()
        .map(|iid| query_outcome(&handle, iid))
        .collect();

    let count_after = handle.peek_count();
    Ok(Report::new(
        module_config::get().initial_count.value(),
        count_before,
        count_after,
        measurements,
        queries,
    ))
}

/// One acquire must return previous+1 and the matching release previous.
pub fn sanity_check(handle: &UnknownRef) -> Result<(), BenchError> {
    let before = handle.peek_count();

    let expected = before.wrapping_add(1);
    let actual = handle.add_ref();
    if actual != expected {
        return Err(BenchError::CountMismatch {
            op: "AddRef",
            expected,
            actual,
        });
    }

    let actual = handle.release_ref();
    if actual != before {
        return Err(BenchError::CountMismatch {
            op: "Release",
            expected: before,
            actual,
        });
    }
    Ok(())
}

/// Run `iterations` acquire/release pairs and check the count came back.
pub fn measure(
    handle: &UnknownRef,
    strategy: Strategy,
    iterations: u64,
) -> Result<Measurement, BenchError> {
    let expected = handle.peek_count();

    let start = Instant::now();
    match strategy {
        Strategy::Slot => run_slot(handle.as_raw(), iterations),
        Strategy::Cached => run_cached(handle, iterations),
        Strategy::Handle => run_handle(handle, iterations),
    }
    let elapsed = start.elapsed();

    let actual = handle.peek_count();
    if actual != expected {
        return Err(BenchError::Drift {
            strategy,
            expected,
            actual,
        });
    }

    Ok(Measurement {
        strategy,
        iterations,
        elapsed_ms: elapsed.as_millis() as u64,
        ns_per_pair: elapsed.as_nanos() as f64 / iterations as f64,
    })
}

fn run_slot(object: *mut c_void, iterations: u64) {
    for _ in 0..iterations {
        let object = black_box(object);
        // SAFETY: `object` comes from a live `UnknownRef`.
        unsafe {
            let vtbl = *object.cast::<*const IDummyVtbl>();
            black_box(((*vtbl).add_ref)(object));
            let vtbl = *object.cast::<*const IDummyVtbl>();
            black_box(((*vtbl).release)(object));
        }
    }
}

fn run_cached(handle: &UnknownRef, iterations: u64) {
    let object = handle.as_raw();
    let add_ref = handle.slots().add_ref;
    let release = handle.slots().release;
    for _ in 0..iterations {
        unsafe {
            black_box(add_ref(black_box(object)));
            black_box(release(black_box(object)));
        }
    }
}

fn run_handle(handle: &UnknownRef, iterations: u64) {
    for _ in 0..iterations {
        drop(black_box(handle.clone()));
    }
}

fn query_outcome(handle: &UnknownRef, iid: &Guid) -> QueryOutcome {
    let (supported, status) = match handle.query(iid) {
        Ok(ptr) => {
            // The returned pointer carries its own reference; hand it back.
            // SAFETY: a successful query yields a live interface pointer.
            drop(unsafe { UnknownRef::attach(ptr.as_ptr()) });
            (true, "S_OK".to_string())
        }
        Err(InteropError::NoInterface(_)) => (false, "E_NOINTERFACE".to_string()),
        Err(e) => (false, e.to_string()),
    };
    tracing::debug!("QueryInterface({iid}) -> {status}");
    QueryOutcome {
        iid: iid.to_string(),
        supported,
        status,
    }
}
