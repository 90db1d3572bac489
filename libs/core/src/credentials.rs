use std::collections::HashMap;

/// Source of named carrier secrets. Lookups happen at call time, never cached
/// across dispatches, so rotated credentials take effect on the next send
/// without a restart.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Present and non-empty. Whitespace-only values count as absent.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }
}

/// Production store: reads the process environment on every lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialStore for EnvCredentials {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed in-memory store for tests and embedders that source secrets
/// themselves.
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl CredentialStore for StaticCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
