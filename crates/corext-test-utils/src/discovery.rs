//! Discoverers for tests.

use std::fmt;
use std::sync::Mutex;

use corext_core::{Error, Extension, ExtensionDiscoverer, ExtensionError, Result};

/// Hands out a fixed list of extensions on the first `discover` call.
///
/// Later calls return an empty list; the manager only discovers once.
pub struct VecDiscoverer {
    extensions: Mutex<Option<Vec<Box<dyn Extension>>>>,
}

impl VecDiscoverer {
    pub fn new(extensions: Vec<Box<dyn Extension>>) -> Self {
        Self {
            extensions: Mutex::new(Some(extensions)),
        }
    }
}

impl fmt::Debug for VecDiscoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecDiscoverer").finish_non_exhaustive()
    }
}

impl ExtensionDiscoverer for VecDiscoverer {
    fn discover(&self) -> Result<Vec<Box<dyn Extension>>> {
        let mut slot = self
            .extensions
            .lock()
            .unwrap_or_else(|e| panic!("VecDiscoverer: lock poisoned: {e}"));
        Ok(slot.take().unwrap_or_default())
    }
}

/// Always fails with the given message.
#[derive(Debug)]
pub struct FailingDiscoverer {
    message: String,
}

impl FailingDiscoverer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ExtensionDiscoverer for FailingDiscoverer {
    fn discover(&self) -> Result<Vec<Box<dyn Extension>>> {
        Err(Error::Discovery(ExtensionError::new(self.message.clone())))
    }
}
