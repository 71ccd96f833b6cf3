//! Module configuration, read once from the environment.

use once_cell::sync::Lazy;

use crate::core::InitialCount;

/// Environment variable selecting the initial reference count (`0` or `1`).
pub const INITIAL_REFCOUNT_ENV: &str = "DUMMY_INITIAL_REFCOUNT";

static CONFIG: Lazy<ModuleConfig> = Lazy::new(ModuleConfig::from_env);

/// Settings consulted by the exported factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleConfig {
    pub initial_count: InitialCount,
}

impl ModuleConfig {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(INITIAL_REFCOUNT_ENV).ok().as_deref())
    }

    /// Unset or unparsable values fall back to the default.
    pub fn from_value(value: Option<&str>) -> Self {
        let initial_count = match value.map(str::parse::<InitialCount>) {
            None => InitialCount::default(),
            Some(Ok(count)) => count,
            Some(Err(e)) => {
                tracing::warn!("{INITIAL_REFCOUNT_ENV}: {e}, using default");
                InitialCount::default()
            }
        };
        Self { initial_count }
    }
}

/// Process-wide configuration snapshot.
pub fn get() -> &'static ModuleConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_uses_default() {
        assert_eq!(ModuleConfig::from_value(None).initial_count, InitialCount::One);
    }

    #[test]
    fn test_explicit_zero() {
        assert_eq!(ModuleConfig::from_value(Some("0")).initial_count, InitialCount::Zero);
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(ModuleConfig::from_value(Some("many")).initial_count, InitialCount::One);
    }
}
