//! Credential sources for the `X-API-Key` header

use std::sync::{Arc, RwLock};

/// Supplies the opaque API credential. Read on every authenticated call.
pub trait CredentialSource: Send + Sync {
    fn credential(&self) -> Option<String>;
}

/// A credential that can be swapped while the session runs.
#[derive(Clone, Default)]
pub struct SharedCredential {
    key: Arc<RwLock<Option<String>>>,
}

impl SharedCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Arc::new(RwLock::new(Some(key.into()))),
        }
    }

    pub fn replace(&self, key: Option<String>) {
        match self.key.write() {
            Ok(mut guard) => *guard = key,
            Err(poisoned) => *poisoned.into_inner() = key,
        }
    }
}

impl CredentialSource for SharedCredential {
    fn credential(&self) -> Option<String> {
        match self.key.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
