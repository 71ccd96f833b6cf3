//! The counter behind every dummy object.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Starting value of a freshly created object's reference count.
///
/// The object historically shipped in two builds that disagreed here. `One`
/// is canonical: the factory hands its caller an owned reference, so the
/// first `AddRef` returns 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialCount {
    Zero,
    #[default]
    One,
}

impl InitialCount {
    pub fn value(self) -> u32 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl fmt::Display for InitialCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("initial reference count must be 0 or 1, got {0:?}")]
pub struct InitialCountError(pub String);

impl FromStr for InitialCount {
    type Err = InitialCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "zero" => Ok(Self::Zero),
            "1" | "one" => Ok(Self::One),
            _ => Err(InitialCountError(s.to_string())),
        }
    }
}

/// Unsynchronised reference counter.
///
/// Plain `Cell`, no atomics: the object is single-threaded and `!Sync`.
/// Arithmetic wraps; releasing at zero yields `u32::MAX`.
#[derive(Debug)]
pub struct RefCounter {
    count: Cell<u32>,
}

impl RefCounter {
    pub fn new(initial: InitialCount) -> Self {
        Self {
            count: Cell::new(initial.value()),
        }
    }

    /// Increment and return the new value.
    #[inline]
    pub fn acquire(&self) -> u32 {
        self.modify(1)
    }

    /// Decrement and return the new value. Never frees anything.
    #[inline]
    pub fn release(&self) -> u32 {
        self.modify(-1)
    }

    pub fn get(&self) -> u32 {
        self.count.get()
    }

    #[inline]
    fn modify(&self, by: i32) -> u32 {
        let next = self.count.get().wrapping_add_signed(by);
        self.count.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_initial_count_is_one() {
        assert_eq!(InitialCount::default(), InitialCount::One);
        assert_eq!(RefCounter::new(InitialCount::default()).get(), 1);
    }

    #[test]
    fn test_acquire_release_pair_restores_value() {
        let counter = RefCounter::new(InitialCount::One);
        assert_eq!(counter.acquire(), 2);
        assert_eq!(counter.release(), 1);
    }

    #[test]
    fn test_n_acquires_then_n_releases_restore_value() {
        let counter = RefCounter::new(InitialCount::Zero);
        for i in 1..=100 {
            assert_eq!(counter.acquire(), i);
        }
        for i in (0..100).rev() {
            assert_eq!(counter.release(), i);
        }
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_release_at_zero_wraps() {
        let counter = RefCounter::new(InitialCount::Zero);
        assert_eq!(counter.release(), u32::MAX);
        assert_eq!(counter.acquire(), 0);
    }

    #[test]
    fn test_parse_initial_count() {
        assert_eq!("0".parse::<InitialCount>().unwrap(), InitialCount::Zero);
        assert_eq!(" One ".parse::<InitialCount>().unwrap(), InitialCount::One);
        assert!("2".parse::<InitialCount>().is_err());
    }
}
