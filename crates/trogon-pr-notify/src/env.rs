//! Environment access behind a trait so configuration can be tested without
//! touching the process environment.

use std::env::VarError;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }
}

/// Map-backed environment for tests. `Send + Sync`, usable from any runtime flavor.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryEnv {
    vars: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.lock().unwrap().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.vars
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(VarError::NotPresent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_set_get_remove() {
        let env = InMemoryEnv::new();
        env.set("KEY", "value");
        assert_eq!(env.var("KEY").unwrap(), "value");

        env.remove("KEY");
        assert!(matches!(env.var("KEY"), Err(VarError::NotPresent)));
    }

    #[test]
    fn system_env_reports_missing_vars() {
        assert!(SystemEnv.var("TROGON_PR_NOTIFY_SURELY_UNSET_12345").is_err());
    }
}
