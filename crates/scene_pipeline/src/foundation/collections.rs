//! Specialized collection types

pub use slotmap::{new_key_type, SlotMap};

/// Ticket returned when subscribing to an [`ObserverTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

/// Subscription list that hands out tokens instead of weak references
///
/// Observers stay registered until explicitly unsubscribed with the token
/// they were given. Tokens are never reused, so a stale token is a no-op.
pub struct ObserverTable<T: ?Sized> {
    next_token: u64,
    entries: Vec<(ObserverToken, Box<T>)>,
}

impl<T: ?Sized> Default for ObserverTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ObserverTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            next_token: 0,
            entries: Vec::new(),
        }
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: Box<T>) -> ObserverToken {
        let token = ObserverToken(self.next_token);
        self.next_token += 1;
        self.entries.push((token, observer));
        token
    }

    /// Remove an observer, handing it back to the caller
    pub fn unsubscribe(&mut self, token: ObserverToken) -> Option<Box<T>> {
        let index = self.entries.iter().position(|(t, _)| *t == token)?;
        Some(self.entries.remove(index).1)
    }

    /// Invoke `f` on every observer in subscription order
    pub fn for_each(&mut self, mut f: impl FnMut(&mut T)) {
        for (_, observer) in &mut self.entries {
            f(observer.as_mut());
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for ObserverTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverTable")
            .field("observers", &self.entries.len())
            .finish()
    }
}
