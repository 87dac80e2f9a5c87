//! Multi-subscriber notification with one-shot and persistent policies.

use crate::documents::ValidatedDocuments;
use crate::error::LcpError;
use std::sync::Arc;

/// How long a subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Removed after the next notification.
    Once,
    /// Kept for the lifetime of the machine.
    Always,
}

/// Callback invoked with the validation outcome.
///
/// Exactly one side is `Some` at a terminal notification; both are `None`
/// when a passphrase cancellation returns the machine to its start state.
pub type Observer = Box<dyn FnMut(Option<Arc<ValidatedDocuments>>, Option<LcpError>) + Send>;

/// Observer list of a single validation machine.
///
/// Instance-scoped on purpose: two machines validating different licenses
/// must never share subscribers.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    entries: Vec<(Observer, Policy)>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enrolls an observer.
    pub(crate) fn add(&mut self, observer: Observer, policy: Policy) {
        self.entries.push((observer, policy));
    }

    /// Invokes every observer in insertion order, then removes all `Once`
    /// entries.
    pub(crate) fn notify(
        &mut self,
        documents: Option<Arc<ValidatedDocuments>>,
        error: Option<LcpError>,
    ) {
        for (observer, _) in &mut self.entries {
            observer(documents.clone(), error.clone());
        }
        self.entries.retain(|(_, policy)| *policy == Policy::Always);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
