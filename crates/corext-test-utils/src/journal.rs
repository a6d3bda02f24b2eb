//! Ordered log of lifecycle calls shared by several test extensions.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use corext_core::Capability;

/// What was called on an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A capability setter ran during wiring.
    Wire(Capability),
    Initialise,
    Start,
    Stop,
    Dispose,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(capability) => write!(f, "wire({capability})"),
            Self::Initialise => write!(f, "initialise"),
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::Dispose => write!(f, "dispose"),
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub extension: String,
    pub phase: Phase,
}

/// Cheaply cloneable handle to a shared call log.
///
/// # Example
///
/// ```rust
/// use corext_test_utils::{CallJournal, Phase};
///
/// let journal = CallJournal::new();
/// journal.record("a", Phase::Start);
/// journal.record("b", Phase::Start);
/// assert_eq!(journal.names_for(Phase::Start), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn record(&self, extension: &str, phase: Phase) {
        self.lock().push(Call {
            extension: extension.to_string(),
            phase,
        });
    }

    /// Snapshot of every call, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Extension names that received `phase`, in call order.
    pub fn names_for(&self, phase: Phase) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|call| call.phase == phase)
            .map(|call| call.extension.clone())
            .collect()
    }

    /// Phases received by `extension`, in call order.
    pub fn phases_of(&self, extension: &str) -> Vec<Phase> {
        self.lock()
            .iter()
            .filter(|call| call.extension == extension)
            .map(|call| call.phase)
            .collect()
    }

    /// Number of times `extension` received `phase`.
    pub fn count(&self, extension: &str, phase: Phase) -> usize {
        self.lock()
            .iter()
            .filter(|call| call.extension == extension && call.phase == phase)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// # Panics
    /// Panics if a previous holder of the lock panicked.
    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| panic!("CallJournal: lock poisoned: {e}"))
    }
}
