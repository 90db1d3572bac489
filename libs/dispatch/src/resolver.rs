use std::sync::Arc;

use sms_core::{CredentialStore, SmsSender};

/// Pre-flight availability check: a provider is eligible only when every
/// secret it names is present and non-empty. Pure lookup, no network I/O, so
/// the dispatcher can skip dead providers without spending a round trip.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn is_available(&self, sender: &dyn SmsSender) -> bool {
        sender
            .required_credentials()
            .iter()
            .all(|key| self.store.has(key))
    }
}
